use anyhow::Result;
use pharmabot_core::config::{AppConfig, BotProfile, LoadOptions};
use pharmabot_server::{bootstrap_with_config, init_logging, load_dotenv, wait_for_shutdown};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap_with_config(config, BotProfile::Wholesale)?;
    app.warm_price_list().await;

    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        profile = ?app.profile,
        "polling bot started"
    );

    let offset = app
        .polling_runner()
        .run_until(async {
            if let Err(error) = wait_for_shutdown().await {
                error!(
                    event_name = "system.server.signal_error",
                    correlation_id = "shutdown",
                    error = %error,
                    "could not listen for shutdown signal"
                );
            }
        })
        .await?;

    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        offset,
        "polling bot stopping"
    );
    Ok(())
}
