//! Locale dictionary loader.
//!
//! Every request takes a ticket from a shared monotonically increasing
//! counter before it touches the network. A result may only be applied while
//! its ticket is still the newest one issued; anything older is dropped, so
//! the page always ends up in the last *requested* language no matter in
//! which order responses arrive.

use crate::i18n::{Dictionary, DictionaryError, Language, LocaleMetrics};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("Locale '{lang}' is unavailable: {reason}")]
    Unavailable { lang: String, reason: String },

    #[error("Locale '{lang}' is malformed: {source}")]
    Malformed {
        lang: String,
        #[source]
        source: DictionaryError,
    },
}

/// Sequence number of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct LocaleLoader {
    client: reqwest::Client,
    base_url: String,
    counter: Arc<AtomicU64>,
    metrics: Arc<LocaleMetrics>,
}

impl LocaleLoader {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            counter: Arc::new(AtomicU64::new(0)),
            metrics: Arc::new(LocaleMetrics::new()),
        }
    }

    pub fn metrics(&self) -> &Arc<LocaleMetrics> {
        &self.metrics
    }

    pub fn url_for(&self, language: Language) -> String {
        format!("{}/static/locales/{}.json", self.base_url, language.code())
    }

    /// Whether `ticket` is still the newest request issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.counter.load(Ordering::SeqCst) == ticket.0
    }

    /// Take the next ticket. Callers that update other state alongside a
    /// request must issue the ticket in the same critical section.
    pub(crate) fn issue(&self) -> Ticket {
        self.metrics.record_request();
        Ticket(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Fetch and parse the dictionary for `language`, bypassing caches.
    /// The ticket is taken before the request is sent.
    pub async fn fetch(&self, language: Language) -> Result<(Ticket, Dictionary), LocaleError> {
        let ticket = self.issue();
        self.fetch_with_ticket(ticket, language).await
    }

    /// Fetch `language` under a ticket the caller already issued.
    pub(crate) async fn fetch_with_ticket(
        &self,
        ticket: Ticket,
        language: Language,
    ) -> Result<(Ticket, Dictionary), LocaleError> {
        let url = self.url_for(language);
        debug!("Fetching locale {} (ticket {})", url, ticket.0);

        let result = self.fetch_dictionary(language, &url).await;
        if result.is_err() {
            self.metrics.record_failure();
        }
        result.map(|dictionary| (ticket, dictionary))
    }

    async fn fetch_dictionary(&self, language: Language, url: &str) -> Result<Dictionary, LocaleError> {
        let unavailable = |reason: String| LocaleError::Unavailable {
            lang: language.code().to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        Dictionary::parse(&body).map_err(|source| LocaleError::Malformed {
            lang: language.code().to_string(),
            source,
        })
    }

    /// Fetch `language` and return its dictionary only if no newer request
    /// was issued meanwhile. `Ok(None)` means the result went stale.
    pub async fn load(&self, language: Language) -> Result<Option<Dictionary>, LocaleError> {
        let (ticket, dictionary) = self.fetch(language).await?;
        if !self.is_current(ticket) {
            self.metrics.record_stale();
            debug!("Dropping stale '{}' dictionary (ticket {})", language, ticket.0);
            return Ok(None);
        }
        Ok(Some(dictionary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ==================== Fetch ====================

    #[tokio::test]
    async fn test_fetch_sends_no_cache_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/static/locales/en.json"))
            .and(header("cache-control", "no-cache"))
            .and(header("pragma", "no-cache"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"hero": {"title": "Hi"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let loader = LocaleLoader::new(&server.uri());
        let dict = loader.load(Language::ENGLISH).await.unwrap().unwrap();

        assert_eq!(dict.get_str("hero.title"), Some("Hi"));
        assert_eq!(loader.metrics().requests(), 1);
    }

    #[tokio::test]
    async fn test_non_success_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let loader = LocaleLoader::new(&server.uri());
        let err = loader.load(Language::HEBREW).await.unwrap_err();

        assert!(matches!(err, LocaleError::Unavailable { ref lang, .. } if lang == "he"));
        assert!(err.to_string().contains("404"));
        assert_eq!(loader.metrics().failures(), 1);
    }

    #[tokio::test]
    async fn test_unparsable_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let loader = LocaleLoader::new(&server.uri());
        let err = loader.load(Language::ENGLISH).await.unwrap_err();

        assert!(matches!(err, LocaleError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let loader = LocaleLoader::new("http://127.0.0.1:1");
        let err = loader.load(Language::ENGLISH).await.unwrap_err();
        assert!(matches!(err, LocaleError::Unavailable { .. }));
    }

    // ==================== Tickets ====================

    #[test]
    fn test_tickets_are_monotonic() {
        let loader = LocaleLoader::new("http://localhost");
        let first = loader.issue();
        let second = loader.issue();

        assert!(second > first);
        assert!(!loader.is_current(first));
        assert!(loader.is_current(second));
    }

    #[test]
    fn test_clones_share_the_counter() {
        let loader = LocaleLoader::new("http://localhost/");
        let clone = loader.clone();
        let ticket = loader.issue();
        clone.issue();

        assert!(!loader.is_current(ticket));
        assert_eq!(loader.url_for(Language::HEBREW), "http://localhost/static/locales/he.json");
    }

    #[tokio::test]
    async fn test_slow_older_request_is_dropped() {
        let server = MockServer::start().await;
        Mock::given(path("/static/locales/en.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"hero": {"title": "Hello"}}))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(path("/static/locales/he.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hero": {"title": "שלום"}})))
            .mount(&server)
            .await;

        let loader = LocaleLoader::new(&server.uri());
        let (en, he) = tokio::join!(loader.load(Language::ENGLISH), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            loader.load(Language::HEBREW).await
        });

        assert!(en.unwrap().is_none());
        assert_eq!(he.unwrap().unwrap().get_str("hero.title"), Some("שלום"));
        assert_eq!(loader.metrics().stale_dropped(), 1);
    }
}
