//! Contact form validation and payload construction.
//!
//! Validation mirrors the browser's constraint-validation model: each field
//! block (`.field` inside `#contactForm`) holds one control whose declared
//! constraints (`required`, `type=email`, `minlength`, `maxlength`, `pattern`)
//! plus an optional custom validity message decide whether it is valid. The
//! phone field adds one custom rule: at least seven digits once everything
//! that is not a digit is stripped.

use crate::i18n::{Dictionary, Language};
use crate::page::{ids, Document, Element};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use thiserror::Error;

pub const MIN_PHONE_DIGITS: usize = 7;

/// Class set on a field block while its control is invalid.
pub const ERROR_CLASS: &str = "invalid";

pub const PHONE_FIELD: &str = "phone";

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// What the delivery channel receives. Built once per successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactPayload {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub message: String,
    /// RFC 3339, UTC
    pub submitted_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("contact form has invalid field(s): {}", fields.join(", "))]
pub struct ValidationFailed {
    /// `name` attributes of the invalid controls, in form order
    pub fields: Vec<String>,
}

/// Number of digits in a phone number, ignoring spaces, dashes, `+`, etc.
pub fn phone_digits(raw: &str) -> usize {
    raw.chars().filter(|c| c.is_ascii_digit()).count()
}

pub fn phone_is_valid(raw: &str) -> bool {
    phone_digits(raw) >= MIN_PHONE_DIGITS
}

fn phone_message(dictionary: Option<&Dictionary>, language: Language) -> String {
    dictionary
        .and_then(|d| d.get_str("contact.phone_invalid"))
        .unwrap_or(language.strings().phone_invalid)
        .to_string()
}

/// Built-in validity of a single control.
pub fn check_validity(control: &Element) -> bool {
    if !control.custom_validity.is_empty() {
        return false;
    }

    let value = control.value.trim();
    if value.is_empty() {
        return !control.has_attr("required");
    }

    if control.attr("type") == Some("email") {
        let regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[^\s@]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$")
                .unwrap()
        });
        if !regex.is_match(value) {
            return false;
        }
    }

    let length = value.chars().count();
    if let Some(min) = control.attr("minlength").and_then(|v| v.parse::<usize>().ok()) {
        if length < min {
            return false;
        }
    }
    if let Some(max) = control.attr("maxlength").and_then(|v| v.parse::<usize>().ok()) {
        if length > max {
            return false;
        }
    }

    // An unparsable pattern is ignored, as browsers do
    if let Some(pattern) = control.attr("pattern") {
        if let Ok(regex) = Regex::new(&format!("^(?:{})$", pattern)) {
            if !regex.is_match(value) {
                return false;
            }
        }
    }

    true
}

fn first_control_mut(el: &mut Element) -> Option<&mut Element> {
    if el.is_control() {
        return Some(el);
    }
    el.children.iter_mut().find_map(first_control_mut)
}

fn error_slot_mut(el: &mut Element) -> Option<&mut Element> {
    if el.tag == "small" && el.has_class("error") {
        return Some(el);
    }
    el.children.iter_mut().find_map(error_slot_mut)
}

/// Validate one field block in place. Returns the control's name when invalid.
fn validate_block(block: &mut Element, phone_message: &str) -> Option<String> {
    let control = first_control_mut(block)?;

    control.custom_validity.clear();
    if control.attr("name") == Some(PHONE_FIELD) && !phone_is_valid(&control.value) {
        control.custom_validity = phone_message.to_string();
    }

    let valid = check_validity(control);
    control.set_attr("aria-invalid", if valid { "false" } else { "true" });
    let name = control.attr("name").unwrap_or_default().to_string();
    let message = control.custom_validity.clone();

    block.toggle_class(ERROR_CLASS, !valid);
    if let Some(slot) = error_slot_mut(block) {
        slot.text = if valid { String::new() } else { message };
    }

    (!valid).then_some(name)
}

/// Run every field block of the contact form through validation, updating
/// error markers as it goes. Every block is evaluated even after the first
/// failure so all errors show at once.
pub fn validate(
    document: &mut Document,
    dictionary: Option<&Dictionary>,
    language: Language,
) -> Result<(), ValidationFailed> {
    let phone_message = phone_message(dictionary, language);
    let mut invalid = Vec::new();

    if let Some(form) = document.get_mut(ids::CONTACT_FORM) {
        form.walk_mut(&mut |el| {
            if el.has_class("field") {
                if let Some(name) = validate_block(el, &phone_message) {
                    invalid.push(name);
                }
            }
        });
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ValidationFailed { fields: invalid })
    }
}

/// Collect trimmed control values into a payload stamped with the current time.
pub fn build_payload(document: &Document) -> ContactPayload {
    let value = |name: &str| -> String {
        document
            .get(ids::CONTACT_FORM)
            .and_then(|form| {
                form.controls()
                    .into_iter()
                    .find(|c| c.attr("name") == Some(name))
                    .map(|c| c.value.trim().to_string())
            })
            .unwrap_or_default()
    };

    ContactPayload {
        name: value("name"),
        phone: value("phone"),
        email: value("email"),
        message: value("message"),
        submitted_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Clear every control and every error marker in the form.
pub fn reset(document: &mut Document) {
    if let Some(form) = document.get_mut(ids::CONTACT_FORM) {
        form.walk_mut(&mut |el| {
            if el.is_control() {
                el.value.clear();
                el.custom_validity.clear();
                el.remove_attr("aria-invalid");
            }
            if el.has_class("field") {
                el.remove_class(ERROR_CLASS);
            }
            if el.tag == "small" && el.has_class("error") {
                el.text.clear();
            }
        });
    }
}

/// Number of field blocks currently showing an error.
pub fn error_markers(document: &Document) -> usize {
    let mut count = 0;
    if let Some(form) = document.get(ids::CONTACT_FORM) {
        form.walk(&mut |el| {
            if el.has_class(ERROR_CLASS) {
                count += 1;
            }
        });
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::ENGLISH_STRINGS;
    use crate::page::skeleton;
    use proptest::prelude::*;
    use tokio_test::{assert_err, assert_ok};

    fn fill(doc: &mut Document, name: &str, phone: &str, email: &str, message: &str) {
        for (id, value) in [
            ("name", name),
            ("phone", phone),
            ("email", email),
            ("message", message),
        ] {
            doc.get_mut(id).unwrap().value = value.to_string();
        }
    }

    // ==================== Phone Rule ====================

    #[test]
    fn test_phone_digits_strips_formatting() {
        assert_eq!(phone_digits("+972 (3) 555-12-34"), 11);
        assert_eq!(phone_digits("abc"), 0);
    }

    #[test]
    fn test_phone_boundary() {
        assert!(!phone_is_valid("123-456"));
        assert!(phone_is_valid("123-4567"));
        assert!(phone_is_valid("1234567"));
    }

    proptest! {
        #[test]
        fn prop_short_phone_always_blocks(digits in "[0-9]{0,6}", noise in "[ ()+.-]{0,6}") {
            let phone = format!("{}{}", noise, digits);
            let mut doc = skeleton();
            fill(&mut doc, "Dana", &phone, "dana@example.com", "Hi");

            let err = validate(&mut doc, None, Language::ENGLISH).unwrap_err();
            prop_assert!(err.fields.contains(&"phone".to_string()));
        }

        #[test]
        fn prop_seven_digits_pass_phone_rule(digits in "[0-9]{7}", noise in "[ ()+.-]{0,6}") {
            let phone = format!("{}{}", noise, digits);
            let mut doc = skeleton();
            fill(&mut doc, "Dana", &phone, "dana@example.com", "Hi");

            prop_assert!(validate(&mut doc, None, Language::ENGLISH).is_ok());
        }
    }

    // ==================== Built-in Validity ====================

    #[test]
    fn test_required() {
        let control = Element::new("input").with_attr("required", "");
        assert!(!check_validity(&control));

        let optional = Element::new("input");
        assert!(check_validity(&optional));
    }

    #[test]
    fn test_email_format() {
        let mut control = Element::new("input").with_attr("type", "email");
        for (value, ok) in [
            ("dana@example.com", true),
            ("dana@localhost", true),
            ("dana.example.com", false),
            ("dana@", false),
            ("da na@example.com", false),
        ] {
            control.value = value.to_string();
            assert_eq!(check_validity(&control), ok, "{}", value);
        }
    }

    #[test]
    fn test_length_and_pattern() {
        let mut control = Element::new("input")
            .with_attr("minlength", "2")
            .with_attr("maxlength", "4")
            .with_attr("pattern", "[a-z]+");

        control.value = "a".to_string();
        assert!(!check_validity(&control));
        control.value = "abcde".to_string();
        assert!(!check_validity(&control));
        control.value = "ab1".to_string();
        assert!(!check_validity(&control));
        control.value = "abc".to_string();
        assert!(check_validity(&control));
    }

    #[test]
    fn test_custom_validity_makes_invalid() {
        let mut control = Element::new("input");
        control.value = "x".to_string();
        control.custom_validity = "nope".to_string();
        assert!(!check_validity(&control));
    }

    // ==================== Form Validation ====================

    #[test]
    fn test_empty_form_marks_every_field() {
        let mut doc = skeleton();

        let err = validate(&mut doc, None, Language::ENGLISH).unwrap_err();
        assert_eq!(err.fields, vec!["name", "phone", "email", "message"]);
        assert_eq!(error_markers(&doc), 4);
        assert_eq!(
            doc.get("email").unwrap().attr("aria-invalid"),
            Some("true")
        );
    }

    #[test]
    fn test_short_phone_sets_localized_message() {
        let mut doc = skeleton();
        fill(&mut doc, "Dana", "555-12", "dana@example.com", "Hi");

        let err = validate(&mut doc, None, Language::ENGLISH).unwrap_err();
        assert_eq!(err.fields, vec!["phone"]);
        assert_eq!(
            doc.get("phone").unwrap().custom_validity,
            ENGLISH_STRINGS.phone_invalid
        );
        assert_eq!(error_markers(&doc), 1);
    }

    #[test]
    fn test_fixing_a_field_clears_its_marker() {
        let mut doc = skeleton();
        fill(&mut doc, "Dana", "555", "dana@example.com", "Hi");
        assert_err!(validate(&mut doc, None, Language::ENGLISH));

        doc.get_mut("phone").unwrap().value = "555 1234".to_string();
        assert_ok!(validate(&mut doc, None, Language::ENGLISH));
        assert_eq!(error_markers(&doc), 0);
        assert!(doc.get("phone").unwrap().custom_validity.is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = ValidationFailed {
            fields: vec!["phone".to_string(), "email".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "contact form has invalid field(s): phone, email"
        );
    }

    // ==================== Payload / Reset ====================

    #[test]
    fn test_build_payload_trims() {
        let mut doc = skeleton();
        fill(&mut doc, "  Dana ", " 050-1234567 ", "dana@example.com ", " Hello\n");

        let payload = build_payload(&doc);
        assert_eq!(payload.name, "Dana");
        assert_eq!(payload.phone, "050-1234567");
        assert_eq!(payload.email, "dana@example.com");
        assert_eq!(payload.message, "Hello");
        assert!(chrono::DateTime::parse_from_rfc3339(&payload.submitted_at).is_ok());
    }

    #[test]
    fn test_reset_clears_values_and_markers() {
        let mut doc = skeleton();
        fill(&mut doc, "Dana", "1", "bad", "Hi");
        assert_err!(validate(&mut doc, None, Language::ENGLISH));

        reset(&mut doc);

        assert_eq!(error_markers(&doc), 0);
        for id in ["name", "phone", "email", "message"] {
            let control = doc.get(id).unwrap();
            assert!(control.value.is_empty());
            assert!(control.custom_validity.is_empty());
            assert!(!control.has_attr("aria-invalid"));
        }
    }
}
