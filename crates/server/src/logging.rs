use pharmabot_core::config::{AppConfig, LogFormat};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &AppConfig) {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_ascii_lowercase()));

    let builder = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);
    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if installed.is_err() {
        tracing::debug!(
            event_name = "system.logging.already_initialized",
            correlation_id = "bootstrap",
            "global subscriber was already installed"
        );
    }
}
