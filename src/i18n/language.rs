//! Language type: validated language tag backed by the registry.

use crate::i18n::registry::TextDirection;
use crate::i18n::strings::{LanguageStrings, ENGLISH_STRINGS, HEBREW_STRINGS};
use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// A validated language.
///
/// Only supported, enabled languages can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "he")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };

    pub const HEBREW: Language = Language { code: "he" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The language first-time visitors see.
    pub fn default_language() -> Language {
        let config = LanguageRegistry::get().default_language();
        Language { code: config.code }
    }

    /// Get the ISO 639-1 language code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This cannot
    /// happen for values built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Value for the document's `dir` attribute.
    pub fn direction(&self) -> TextDirection {
        self.config().direction
    }

    /// The language the header toggle switches to (en ↔ he).
    pub fn toggled(&self) -> Language {
        if *self == Language::HEBREW {
            Language::ENGLISH
        } else {
            Language::HEBREW
        }
    }

    /// Built-in copy used when the active dictionary lacks a key.
    pub fn strings(&self) -> &'static LanguageStrings {
        match self.code {
            "he" => &HEBREW_STRINGS,
            _ => &ENGLISH_STRINGS,
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::default_language()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_hebrew() {
        let language = Language::from_code("he").expect("Should succeed");
        assert_eq!(language, Language::HEBREW);
        assert_eq!(language.name(), "Hebrew");
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("fr");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_from_code_is_case_sensitive() {
        assert!(Language::from_code("EN").is_err());
    }

    // ==================== Direction Tests ====================

    #[test]
    fn test_direction_per_language() {
        assert_eq!(Language::ENGLISH.direction(), TextDirection::Ltr);
        assert_eq!(Language::HEBREW.direction(), TextDirection::Rtl);
    }

    // ==================== Toggle Tests ====================

    #[test]
    fn test_toggled_flips_between_site_languages() {
        assert_eq!(Language::ENGLISH.toggled(), Language::HEBREW);
        assert_eq!(Language::HEBREW.toggled(), Language::ENGLISH);
        assert_eq!(Language::ENGLISH.toggled().toggled(), Language::ENGLISH);
    }

    // ==================== Misc ====================

    #[test]
    fn test_default_is_english() {
        assert_eq!(Language::default(), Language::ENGLISH);
    }

    #[test]
    fn test_display_writes_code() {
        assert_eq!(Language::HEBREW.to_string(), "he");
    }

    #[test]
    fn test_strings_follow_language() {
        assert_eq!(
            Language::HEBREW.strings().theme_to_dark,
            HEBREW_STRINGS.theme_to_dark
        );
        assert_eq!(
            Language::ENGLISH.strings().theme_to_dark,
            ENGLISH_STRINGS.theme_to_dark
        );
    }
}
