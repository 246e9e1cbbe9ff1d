//! Preview binary - renders the standard page against a running site host
//! and prints what a visitor would see.
//!
//! Usage:
//!   cargo run --bin preview                 # Last used language (English at first)
//!   cargo run --bin preview -- he           # Hebrew, remembered for next time
//!   cargo run --bin preview -- --validate   # Check every locale against English
//!
//! Optional:
//! - SITE_BASE_URL (defaults to http://127.0.0.1:8000)
//! - PREFS_PATH (defaults to .site-prefs.json); the language and theme
//!   chosen in one run are what the next run starts with

use anyhow::{Context, Result};
use futures::future::join_all;
use site_engine::config::Config;
use site_engine::binder::{META_DESCRIPTION_KEY, META_TITLE_KEY};
use site_engine::i18n::{DictionaryValidator, Language, LanguageRegistry};
use site_engine::locale::LocaleLoader;
use site_engine::page::{ids, skeleton};
use site_engine::session::{LanguageOutcome, Session};
use tracing::info;

const PREVIEW_IDS: &[&str] = &[
    "brand",
    ids::LANG_TOGGLE,
    "eyebrow",
    "title",
    "subtitle",
    ids::PRIMARY_BUTTON,
    ids::SECONDARY_BUTTON,
    "productsTitle",
    "contactTitle",
    "sendBtn",
    "chatTitle",
];

/// Fetch every enabled locale concurrently and report key drift against the default.
async fn validate_locales(config: &Config) -> Result<bool> {
    let loader = LocaleLoader::new(&config.site_base_url);
    let languages: Vec<Language> = LanguageRegistry::get()
        .list_enabled()
        .iter()
        .filter_map(|lang| Language::from_code(lang.code).ok())
        .collect();

    let results = join_all(languages.iter().map(|lang| loader.fetch(*lang))).await;

    let mut dictionaries = Vec::new();
    for (language, result) in languages.iter().zip(results) {
        let (_, dictionary) =
            result.with_context(|| format!("Failed to load locale '{}'", language))?;
        dictionaries.push((*language, dictionary));
    }

    let default = Language::default_language();
    let canonical = dictionaries
        .iter()
        .find(|(lang, _)| *lang == default)
        .map(|(_, dict)| dict)
        .context("Default locale was not loaded")?;

    let mut clean = true;
    for (language, dictionary) in &dictionaries {
        let mut report =
            DictionaryValidator::check_required(dictionary, &[META_TITLE_KEY, META_DESCRIPTION_KEY]);
        if *language != default {
            let parity = DictionaryValidator::validate(canonical, dictionary);
            report.errors.extend(parity.errors);
            report.warnings.extend(parity.warnings);
        }

        println!("\n========== {} ({}) ==========", language.name(), language);
        for error in &report.errors {
            println!("ERROR   {}", error);
        }
        for warning in &report.warnings {
            println!("WARNING {}", warning);
        }
        if report.is_clean() {
            println!("OK");
        }
        clean &= !report.has_errors();
    }

    Ok(clean)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_engine=info".parse()?),
        )
        .init();

    // Load environment from .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|arg| arg == "--validate") {
        if !validate_locales(&config).await? {
            anyhow::bail!("Locale validation failed");
        }
        return Ok(());
    }

    let requested = args.first().map(|code| Language::from_code(code)).transpose()?;

    info!(
        "Rendering preview from {} (prefs: {})",
        config.site_base_url, config.prefs_path
    );
    let session = Session::with_file_prefs(config, skeleton());

    let mut outcome = session.start().await;
    if let Some(language) = requested.filter(|lang| *lang != session.language()) {
        outcome = session.set_language(language).await;
    }
    if outcome != LanguageOutcome::Applied {
        anyhow::bail!("Could not load locale '{}'", session.language());
    }

    session.with_document(|doc| {
        println!("\n========== PAGE PREVIEW ==========");
        println!("title: {}", doc.title);
        println!("lang:  {}  dir: {}", doc.lang().unwrap_or("-"), doc.dir().unwrap_or("-"));
        for id in PREVIEW_IDS {
            println!("#{:<14} {}", id, doc.text_of(id).unwrap_or("(missing)"));
        }
        println!("==================================\n");
    });

    println!("{}", session.metrics().report().format_log());
    Ok(())
}
