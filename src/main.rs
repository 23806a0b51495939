//! Tứ Trụ analysis server
//!
//! Serves chart analysis over HTTP. Configuration comes from `TU_TRU_*`
//! environment variables, optionally loaded from a `.env` file.

use anyhow::Result;
use tracing::info;

use tu_tru::config::ServiceConfig;
use tu_tru::server::run_server;
use tu_tru::utils::telemetry::{init_logging, DEFAULT_FILTER};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    init_logging(DEFAULT_FILTER)?;

    let config = ServiceConfig::from_env()?;
    info!(
        "Configuration: addr={} rate_limit={}/{:?} cache={} delegate={}",
        config.addr,
        config.rate_limit,
        config.rate_window,
        config.cache_capacity,
        config.delegate.as_ref().map(|d| d.url.as_str()).unwrap_or("none")
    );

    run_server(config).await
}
