use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Locale resource
    /// Origin the locale loader fetches `/static/locales/{lang}.json` from
    pub site_base_url: String,

    // Host
    pub port: u16,
    pub locales_dir: String,
    pub pages_dir: String,

    // Preferences
    pub prefs_path: String,

    // Chat
    pub chat_backend_ready: bool,
    pub chat_reply_delay: Duration,
    pub chat_focus_delay: Duration,

    // Contact delivery (presence is checked, nothing is sent)
    pub contact_endpoint: Option<String>,
    pub contact_api_key: Option<String>,
    pub contact_table: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            site_base_url: std::env::var("SITE_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string())
                .trim_end_matches('/')
                .to_string(),

            port: match std::env::var("PORT") {
                Ok(v) => v.parse().context("PORT must be a valid port number")?,
                Err(_) => 8000,
            },
            locales_dir: std::env::var("LOCALES_DIR")
                .unwrap_or_else(|_| "static/locales".to_string()),
            pages_dir: std::env::var("PAGES_DIR").unwrap_or_else(|_| "templates".to_string()),

            prefs_path: std::env::var("PREFS_PATH")
                .unwrap_or_else(|_| ".site-prefs.json".to_string()),

            chat_backend_ready: std::env::var("CHAT_BACKEND_READY")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            chat_reply_delay: Duration::from_millis(
                std::env::var("CHAT_REPLY_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(700),
            ),
            chat_focus_delay: Duration::from_millis(
                std::env::var("CHAT_FOCUS_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(120),
            ),

            contact_endpoint: non_empty_var("CONTACT_ENDPOINT"),
            contact_api_key: non_empty_var("CONTACT_API_KEY"),
            contact_table: non_empty_var("CONTACT_TABLE")
                .unwrap_or_else(|| "contact_messages".to_string()),
        })
    }

    /// Defaults for everything, pointing the loader at `site_base_url`.
    /// Used by the preview binary and tests.
    pub fn for_site(site_base_url: &str) -> Self {
        Self {
            site_base_url: site_base_url.trim_end_matches('/').to_string(),
            port: 8000,
            locales_dir: "static/locales".to_string(),
            pages_dir: "templates".to_string(),
            prefs_path: ".site-prefs.json".to_string(),
            chat_backend_ready: false,
            chat_reply_delay: Duration::from_millis(700),
            chat_focus_delay: Duration::from_millis(120),
            contact_endpoint: None,
            contact_api_key: None,
            contact_table: "contact_messages".to_string(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
