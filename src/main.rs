use std::error::Error;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file when present.
    // Deployed environments set variables directly, so a missing file is fine.
    dotenvy::dotenv().ok();

    // INFO globally, DEBUG for the Cohere client crate unless RUST_LOG overrides.
    let filter = cohere_service::telemetry::env_filter_with_level("info", Level::DEBUG);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    api::start().await?;

    Ok(())
}
