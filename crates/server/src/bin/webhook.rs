use anyhow::Result;
use pharmabot_core::config::{AppConfig, BotProfile, LoadOptions};
use pharmabot_server::{bootstrap_with_config, init_logging, load_dotenv, wait_for_shutdown};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap_with_config(config, BotProfile::Assistant)?;
    if app.profile == BotProfile::Wholesale {
        app.warm_price_list().await;
    }

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        profile = ?app.profile,
        "webhook server listening"
    );

    let served = axum::serve(listener, app.http_router())
        .with_graceful_shutdown(async {
            if let Err(error) = wait_for_shutdown().await {
                error!(
                    event_name = "system.server.signal_error",
                    correlation_id = "shutdown",
                    error = %error,
                    "could not listen for shutdown signal"
                );
            }
        })
        .await;

    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "webhook server stopping"
    );
    served?;
    Ok(())
}
