//! batchtrack server entry point
//!
//! Loads configuration, builds the pool, probes the store (non-fatal),
//! ensures the schema, then serves HTTP.

use tracing::error;
use tracing_subscriber::EnvFilter;

use batchtrack::config::AppConfig;
use batchtrack::{api, db};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("batchtrack=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();

    let pool = db::connect(&config.db);
    db::ping(&pool).await;
    db::schema::init_schema(&pool).await;

    if let Err(e) = api::serve(&config, pool).await {
        error!(error = %e, "server exited");
        std::process::exit(1);
    }
}
