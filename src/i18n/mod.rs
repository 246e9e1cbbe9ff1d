//! Internationalization (i18n) module.
//!
//! Everything language-related that does not touch the page lives here.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported languages and their text direction
//! - `language`: Validated `Language` type
//! - `dictionary`: Locale dictionaries and dot-path key resolution
//! - `strings`: Built-in fallback copy for engine-authored strings
//! - `validator`: Key-parity checks between locale dictionaries
//! - `metrics`: Locale request counters
//!
//! # Example
//!
//! ```rust,ignore
//! use site_engine::i18n::{Dictionary, Language};
//!
//! let hebrew = Language::from_code("he")?;
//! assert_eq!(hebrew.direction().as_str(), "rtl");
//!
//! let dict = Dictionary::parse(br#"{"header": {"brand": "Acme"}}"#)?;
//! assert_eq!(dict.get_str("header.brand"), Some("Acme"));
//! ```

mod dictionary;
mod language;
mod metrics;
mod registry;
mod strings;
mod validator;

pub use dictionary::{Dictionary, DictionaryError};
pub use language::Language;
pub use metrics::{LocaleMetrics, MetricsReport};
pub use registry::{LanguageConfig, LanguageRegistry, TextDirection};
pub use strings::{LanguageStrings, ENGLISH_STRINGS, HEBREW_STRINGS};
pub use validator::{DictionaryValidator, ValidationReport};
