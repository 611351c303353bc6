//! Process wiring for the two pharmabot entry points.
//!
//! - `pharmabot-webhook` serves `POST /` for platform updates plus `GET /health`
//! - `pharmabot-polling` long-polls `getUpdates` after preloading the price list
//!
//! Both load `.env`, then config, then logging, then [`bootstrap`] the same
//! adapters.

pub mod bootstrap;
pub mod health;
pub mod logging;
pub mod price_source;
pub mod webhook;

use anyhow::Result;

pub use bootstrap::{bootstrap, bootstrap_with_config, Application, BootstrapError};
pub use logging::init_logging;

/// Resolves once the process receives Ctrl-C.
pub async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

/// Reads `.env` from the working directory when present. Variables already
/// set in the environment are kept.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Err(error) if error.not_found() => {}
        Err(error) => {
            eprintln!("ignoring unreadable .env file: {error}");
        }
    }
}
