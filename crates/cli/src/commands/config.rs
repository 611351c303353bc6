use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pharmabot_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct ConfigField {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

impl ConfigField {
    fn new(key: &'static str, value: impl Into<String>, env_keys: &'static [&'static str]) -> Self {
        Self { key, value: value.into(), env_keys }
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: override > env > file > default):".to_string()];
    for field in effective_fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<ConfigField> {
    let unset = || "<unset>".to_string();

    vec![
        ConfigField::new(
            "telegram.bot_token",
            redact_token(config.telegram.bot_token.expose_secret()),
            &["PHARMABOT_TELEGRAM_BOT_TOKEN", "TELEGRAM_BOT_TOKEN"],
        ),
        ConfigField::new(
            "telegram.admin_chat_id",
            config.telegram.admin_chat_id.map(|id| id.to_string()).unwrap_or_else(unset),
            &["PHARMABOT_TELEGRAM_ADMIN_CHAT_ID", "ADMIN_CHAT_ID"],
        ),
        ConfigField::new(
            "telegram.api_base_url",
            config.telegram.api_base_url.clone(),
            &["PHARMABOT_TELEGRAM_API_BASE_URL"],
        ),
        ConfigField::new(
            "telegram.request_timeout_secs",
            config.telegram.request_timeout_secs.to_string(),
            &["PHARMABOT_TELEGRAM_REQUEST_TIMEOUT_SECS"],
        ),
        ConfigField::new(
            "telegram.poll_timeout_secs",
            config.telegram.poll_timeout_secs.to_string(),
            &["PHARMABOT_TELEGRAM_POLL_TIMEOUT_SECS"],
        ),
        ConfigField::new(
            "llm.api_key",
            if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" },
            &["PHARMABOT_LLM_API_KEY", "OPENAI_API_KEY"],
        ),
        ConfigField::new("llm.base_url", config.llm.base_url.clone(), &["PHARMABOT_LLM_BASE_URL"]),
        ConfigField::new(
            "llm.model",
            config.llm.model.clone().unwrap_or_else(|| "<profile default>".to_string()),
            &["PHARMABOT_LLM_MODEL"],
        ),
        ConfigField::new(
            "llm.timeout_secs",
            config.llm.timeout_secs.to_string(),
            &["PHARMABOT_LLM_TIMEOUT_SECS"],
        ),
        ConfigField::new("pricelist.url", config.pricelist.url.clone(), &["PHARMABOT_PRICELIST_URL"]),
        ConfigField::new(
            "pricelist.timeout_secs",
            config.pricelist.timeout_secs.to_string(),
            &["PHARMABOT_PRICELIST_TIMEOUT_SECS"],
        ),
        ConfigField::new(
            "orders.log_path",
            config.orders.log_path.display().to_string(),
            &["PHARMABOT_ORDERS_LOG_PATH"],
        ),
        ConfigField::new(
            "server.bind_address",
            config.server.bind_address.clone(),
            &["PHARMABOT_SERVER_BIND_ADDRESS"],
        ),
        ConfigField::new(
            "server.port",
            config.server.port.to_string(),
            &["PHARMABOT_SERVER_PORT", "PORT"],
        ),
        ConfigField::new(
            "bot.profile",
            config
                .bot
                .profile
                .map(|profile| format!("{profile:?}").to_ascii_lowercase())
                .unwrap_or_else(|| "<entry point default>".to_string()),
            &["PHARMABOT_BOT_PROFILE"],
        ),
        ConfigField::new(
            "logging.level",
            config.logging.level.clone(),
            &["PHARMABOT_LOGGING_LEVEL", "PHARMABOT_LOG_LEVEL"],
        ),
        ConfigField::new(
            "logging.format",
            format!("{:?}", config.logging.format),
            &["PHARMABOT_LOGGING_FORMAT", "PHARMABOT_LOG_FORMAT"],
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("pharmabot.toml"), PathBuf::from("config/pharmabot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the public bot id and hides the secret half.
fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((bot_id, _)) = trimmed.split_once(':') {
        return format!("{bot_id}:***");
    }

    "<redacted>".to_string()
}
