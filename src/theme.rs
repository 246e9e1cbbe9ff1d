//! Theme controller: light/dark rendering of the page chrome.

use crate::i18n::{Dictionary, Language};
use crate::page::{ids, Document};
use std::fmt;

pub const DARK_CLASS: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Theme> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Glyph shown on the toggle for the active theme.
    pub fn icon(&self) -> &'static str {
        match self {
            Theme::Light => "☀️",
            Theme::Dark => "🌙",
        }
    }

    /// Dictionary key for the toggle's label, which names the next action.
    fn label_key(&self) -> &'static str {
        match self {
            Theme::Light => "theme.to_dark",
            Theme::Dark => "theme.to_light",
        }
    }

    /// Accessible label for the toggle while this theme is active.
    pub fn label(&self, dictionary: Option<&Dictionary>, language: Language) -> String {
        if let Some(label) = dictionary.and_then(|d| d.get_str(self.label_key())) {
            return label.to_string();
        }

        let strings = language.strings();
        let label = match self {
            Theme::Light => strings.theme_to_dark,
            Theme::Dark => strings.theme_to_light,
        };
        label.to_string()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render `theme` onto the page: root marker class, toggle glyph and label.
pub fn render(
    document: &mut Document,
    theme: Theme,
    dictionary: Option<&Dictionary>,
    language: Language,
) {
    document.root.toggle_class(DARK_CLASS, theme == Theme::Dark);

    if let Some(toggle) = document.get_mut(ids::THEME_TOGGLE) {
        toggle.text = theme.icon().to_string();
        toggle.set_attr("aria-label", &theme.label(dictionary, language));
        toggle.set_attr("aria-pressed", if theme == Theme::Dark { "true" } else { "false" });
    }
}
