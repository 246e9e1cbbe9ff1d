//! Static site host.
//!
//! Serves the three page skeletons and the per-language locale dictionaries
//! the engine loads. Dictionaries are always sent with `no-cache` since they
//! are edited in place.

use crate::config::Config;
use crate::i18n::Language;
use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Debug)]
struct SiteState {
    locales_dir: PathBuf,
    pages_dir: PathBuf,
}

type SharedState = Arc<SiteState>;

pub fn router(config: &Config) -> Router {
    let state = Arc::new(SiteState {
        locales_dir: PathBuf::from(&config.locales_dir),
        pages_dir: PathBuf::from(&config.pages_dir),
    });

    Router::new()
        .route("/", get(index))
        .route("/products", get(products))
        .route("/contact", get(contact))
        .route("/static/locales/:file", get(locale))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(config: &Config) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Serving site on {} (pages: {}, locales: {})", addr, config.pages_dir, config.locales_dir);
    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn index(State(state): State<SharedState>) -> Response {
    page(&state, "index.html").await
}

async fn products(State(state): State<SharedState>) -> Response {
    page(&state, "products.html").await
}

async fn contact(State(state): State<SharedState>) -> Response {
    page(&state, "contact.html").await
}

async fn page(state: &SiteState, name: &str) -> Response {
    let path = state.pages_dir.join(name);
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            warn!("Could not read page {}: {}", path.display(), e);
            (StatusCode::NOT_FOUND, "Page not found").into_response()
        }
    }
}

/// `GET /static/locales/{lang}.json` for supported languages only.
async fn locale(State(state): State<SharedState>, Path(file): Path<String>) -> Response {
    let Some(code) = file.strip_suffix(".json") else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Ok(language) = Language::from_code(code) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let path = state.locales_dir.join(format!("{}.json", language.code()));
    match tokio::fs::read(&path).await {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "application/json; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!("Could not read locale {}: {}", path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "site-engine" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn spawn(config: &Config) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(config);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn site() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let locales = dir.path().join("locales");
        let pages = dir.path().join("pages");
        std::fs::create_dir_all(&locales).unwrap();
        std::fs::create_dir_all(&pages).unwrap();
        std::fs::write(locales.join("en.json"), r#"{"hero":{"title":"Hi"}}"#).unwrap();
        std::fs::write(pages.join("index.html"), "<h1 id=\"title\">Hi</h1>").unwrap();

        let mut config = Config::for_site("http://127.0.0.1");
        config.locales_dir = locales.to_string_lossy().to_string();
        config.pages_dir = pages.to_string_lossy().to_string();
        (dir, config)
    }

    #[tokio::test]
    async fn test_locale_served_without_cache() {
        let (_dir, config) = site();
        let base = spawn(&config).await;

        let response = reqwest::get(format!("{}/static/locales/en.json", base)).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers().get("cache-control").unwrap(),
            "no-cache"
        );
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["hero"]["title"], "Hi");
    }

    #[tokio::test]
    async fn test_unknown_or_missing_locale_is_404() {
        let (_dir, config) = site();
        let base = spawn(&config).await;

        for file in ["fr.json", "en.txt", "he.json", "..%2Fpages%2Findex.html"] {
            let response = reqwest::get(format!("{}/static/locales/{}", base, file))
                .await
                .unwrap();
            assert_eq!(response.status(), 404, "{}", file);
        }
    }

    #[tokio::test]
    async fn test_pages_and_health() {
        let (_dir, config) = site();
        let base = spawn(&config).await;

        let index = reqwest::get(format!("{}/", base)).await.unwrap();
        assert_eq!(index.status(), 200);
        assert!(index.text().await.unwrap().contains("id=\"title\""));

        let missing = reqwest::get(format!("{}/products", base)).await.unwrap();
        assert_eq!(missing.status(), 404);

        let health: serde_json::Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
    }
}
