use crate::config::Config;
use crate::contact::ContactPayload;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Contact delivery is not configured (missing {0})")]
    NotConfigured(&'static str),
}

/// Result of handing a payload to the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub queued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

/// Contact submission sink. Only checks that credentials are present and logs
/// the request it would make; nothing leaves the process.
#[derive(Debug, Clone)]
pub struct ContactChannel {
    endpoint: Option<String>,
    api_key: Option<String>,
    table: String,
}

impl ContactChannel {
    pub fn new(endpoint: Option<String>, api_key: Option<String>, table: &str) -> Self {
        Self {
            endpoint,
            api_key,
            table: table.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.contact_endpoint.clone(),
            config.contact_api_key.clone(),
            &config.contact_table,
        )
    }

    fn endpoint(&self) -> Result<&str, DeliveryError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(DeliveryError::NotConfigured("CONTACT_ENDPOINT"))?;
        self.api_key
            .as_deref()
            .ok_or(DeliveryError::NotConfigured("CONTACT_API_KEY"))?;
        Ok(endpoint)
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint().is_ok()
    }

    /// Hand `payload` off. Missing credentials are an operator concern: they
    /// are logged and reported in the outcome, never returned as an error.
    pub fn submit(&self, payload: &ContactPayload) -> DeliveryOutcome {
        let endpoint = match self.endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => {
                warn!("{}; contact submission from {} was not queued", e, payload.email);
                return DeliveryOutcome {
                    queued: false,
                    reason: Some("not_configured".to_string()),
                    table: None,
                };
            }
        };

        let url = format!("{}/rest/v1/{}", endpoint.trim_end_matches('/'), self.table);
        let body = serde_json::to_string(payload).unwrap_or_default();
        info!(
            "Queued contact submission: POST {} ({} bytes, submitted_at {})",
            url,
            body.len(),
            payload.submitted_at
        );

        DeliveryOutcome {
            queued: true,
            reason: None,
            table: Some(self.table.clone()),
        }
    }
}
