use anyhow::Result;
use site_engine::{config::Config, delivery::ContactChannel, server};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("site_engine=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting site host on port {}", config.port);
    if !ContactChannel::from_config(&config).is_configured() {
        warn!("CONTACT_ENDPOINT/CONTACT_API_KEY not set; contact submissions will not be queued");
    }

    server::serve(&config).await
}
