//! Client-side behaviour of a bilingual (English/Hebrew) marketing site:
//! locale loading and binding, theme, navigation disclosure, chat widget and
//! contact form, driven against an in-memory page model, plus the small
//! static host that serves the pages and locale dictionaries.

pub mod binder;
pub mod chat;
pub mod config;
pub mod contact;
pub mod delivery;
pub mod escape;
pub mod events;
pub mod i18n;
pub mod locale;
pub mod nav;
pub mod page;
pub mod prefs;
pub mod reveal;
pub mod server;
pub mod session;
pub mod theme;
pub mod timers;
