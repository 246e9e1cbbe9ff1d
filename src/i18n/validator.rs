//! Locale dictionary validation.
//!
//! Dictionaries are authored by hand outside this crate, so they drift. The
//! validator compares a candidate dictionary against the canonical (English)
//! one and reports keys the page would fail to translate.

use crate::i18n::Dictionary;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Keys the page relies on that are missing or not strings
    pub errors: Vec<String>,

    /// Suspicious but harmless differences (extra keys, empty strings, placeholders)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for locale dictionary key parity.
pub struct DictionaryValidator;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl DictionaryValidator {
    /// Compare `candidate` against `canonical`.
    ///
    /// Errors:
    /// - a string key of the canonical dictionary is absent from the candidate
    /// - a string key of the canonical dictionary is not a string in the candidate
    ///
    /// Warnings:
    /// - a key exists only in the candidate
    /// - a candidate string is empty or whitespace
    /// - `{placeholder}` sets differ between the two strings
    pub fn validate(canonical: &Dictionary, candidate: &Dictionary) -> ValidationReport {
        let mut report = ValidationReport::new();

        let canonical_leaves: BTreeMap<String, _> = canonical.leaves().into_iter().collect();
        let candidate_leaves: BTreeMap<String, _> = candidate.leaves().into_iter().collect();

        for (path, value) in &canonical_leaves {
            let Some(expected) = value.as_str() else {
                continue;
            };

            match candidate.resolve(path).map(|v| v.as_str()) {
                None => report.errors.push(format!("Missing key: {}", path)),
                Some(None) => report
                    .errors
                    .push(format!("Key {} is not a string in the translation", path)),
                Some(Some(actual)) => {
                    if actual.trim().is_empty() {
                        report.warnings.push(format!("Empty translation: {}", path));
                    }

                    let expected_placeholders = Self::extract_placeholders(expected);
                    let actual_placeholders = Self::extract_placeholders(actual);
                    if expected_placeholders != actual_placeholders {
                        report.warnings.push(format!(
                            "Placeholder mismatch at {}: original has {:?}, translation has {:?}",
                            path, expected_placeholders, actual_placeholders
                        ));
                    }
                }
            }
        }

        for path in candidate_leaves.keys() {
            if !canonical_leaves.contains_key(path) {
                report.warnings.push(format!("Extra key: {}", path));
            }
        }

        report
    }

    /// Report each of `keys` that does not resolve to a string in `dictionary`.
    pub fn check_required(dictionary: &Dictionary, keys: &[&str]) -> ValidationReport {
        let mut report = ValidationReport::new();
        for key in keys {
            if dictionary.get_str(key).is_none() {
                report.errors.push(format!("Missing key: {}", key));
            }
        }
        report
    }

    /// Extract the set of `{name}` placeholders from a string
    fn extract_placeholders(text: &str) -> BTreeSet<String> {
        let regex =
            PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{([a-zA-Z0-9_]+)\}").unwrap());

        regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}
