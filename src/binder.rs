//! Translation binder: writes a locale dictionary into the marked page.
//!
//! Each call is a full pass over the tree, O(marked elements). Only string
//! values are written; a missing key or a non-string value leaves whatever the
//! element currently shows, so the pass is idempotent and never blanks text.

use crate::i18n::{Dictionary, Language};
use crate::page::{ids, Document, Element};
use tracing::debug;

/// Where a marker's resolved string is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Text,
    Attribute(&'static str),
}

/// Marker attribute → destination on the same element.
const MARKERS: &[(&str, Target)] = &[
    ("data-i18n", Target::Text),
    ("data-i18n-placeholder", Target::Attribute("placeholder")),
    ("data-i18n-aria-label", Target::Attribute("aria-label")),
    ("data-i18n-aria-description", Target::Attribute("aria-description")),
];

pub const META_TITLE_KEY: &str = "meta.title";
pub const META_DESCRIPTION_KEY: &str = "meta.description";

/// Outcome of one binding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Number of element properties written
    pub bound: usize,
    /// Marker keys with no string value in the dictionary, in tree order
    pub missing: Vec<String>,
}

/// Apply `dictionary` to every binding target in `document`.
pub fn apply(document: &mut Document, dictionary: &Dictionary, language: Language) -> BindReport {
    let mut report = BindReport::default();

    document.root.walk_mut(&mut |el| bind_element(el, dictionary, &mut report));

    if let Some(title) = dictionary.get_str(META_TITLE_KEY) {
        document.title = title.to_string();
    }
    if let Some(description) = dictionary.get_str(META_DESCRIPTION_KEY) {
        document.set_meta_description(description);
    }

    if let Some(toggle) = document.get_mut(ids::LANG_TOGGLE) {
        toggle.text = language.code().to_uppercase();
    }

    if !report.missing.is_empty() {
        debug!(
            "Locale '{}' left {} marker(s) untranslated: {:?}",
            language, report.missing.len(), report.missing
        );
    }

    report
}

fn bind_element(el: &mut Element, dictionary: &Dictionary, report: &mut BindReport) {
    for (marker, target) in MARKERS {
        let Some(key) = el.attr(marker) else {
            continue;
        };

        let Some(value) = dictionary.get_str(key) else {
            report.missing.push(key.to_string());
            continue;
        };
        let value = value.to_string();

        match target {
            Target::Text => el.text = value,
            Target::Attribute(name) => el.set_attr(name, &value),
        }
        report.bound += 1;
    }
}
