use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_PRICELIST_URL: &str = "https://laminpaing.itstar.io/product/price\
?bid=00000000-0000-0000-0000-000000000001&img=0&pid=1&exp=NjM5MDEwOTQ0MDAwMDAwMDAw&sort=price";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub llm: LlmConfig,
    pub pricelist: PriceListConfig,
    pub orders: OrdersConfig,
    pub server: ServerConfig,
    pub bot: BotConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    pub admin_chat_id: Option<i64>,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub poll_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    /// Overrides the persona's default model when set.
    pub model: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct PriceListConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct OrdersConfig {
    pub log_path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug, Default)]
pub struct BotConfig {
    /// When unset, each entry point picks its own profile.
    pub profile: Option<BotProfile>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotProfile {
    /// Start command and free-text relay only.
    Assistant,
    /// Price lookup, order form, and relay fallback.
    Wholesale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bot_token: Option<String>,
    pub admin_chat_id: Option<i64>,
    pub telegram_api_base_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub pricelist_url: Option<String>,
    pub orders_log_path: Option<PathBuf>,
    pub server_port: Option<u16>,
    pub bot_profile: Option<BotProfile>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig {
                bot_token: String::new().into(),
                admin_chat_id: None,
                api_base_url: "https://api.telegram.org".to_string(),
                request_timeout_secs: 10,
                poll_timeout_secs: 30,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: None,
                timeout_secs: 30,
            },
            pricelist: PriceListConfig {
                url: DEFAULT_PRICELIST_URL.to_string(),
                timeout_secs: 15,
            },
            orders: OrdersConfig { log_path: PathBuf::from("orders.csv") },
            server: ServerConfig { bind_address: "0.0.0.0".to_string(), port: 8080 },
            bot: BotConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for BotProfile {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "assistant" => Ok(Self::Assistant),
            "wholesale" => Ok(Self::Wholesale),
            other => Err(ConfigError::Validation(format!(
                "unsupported bot profile `{other}` (expected assistant|wholesale)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("pharmabot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Profile from config, falling back to the entry point's default.
    pub fn profile_or(&self, fallback: BotProfile) -> BotProfile {
        self.bot.profile.unwrap_or(fallback)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(telegram) = patch.telegram {
            if let Some(bot_token_value) = telegram.bot_token {
                self.telegram.bot_token = secret_value(bot_token_value);
            }
            if let Some(admin_chat_id) = telegram.admin_chat_id {
                self.telegram.admin_chat_id = non_zero_chat(admin_chat_id);
            }
            if let Some(api_base_url) = telegram.api_base_url {
                self.telegram.api_base_url = api_base_url;
            }
            if let Some(request_timeout_secs) = telegram.request_timeout_secs {
                self.telegram.request_timeout_secs = request_timeout_secs;
            }
            if let Some(poll_timeout_secs) = telegram.poll_timeout_secs {
                self.telegram.poll_timeout_secs = poll_timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = Some(model);
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(pricelist) = patch.pricelist {
            if let Some(url) = pricelist.url {
                self.pricelist.url = url;
            }
            if let Some(timeout_secs) = pricelist.timeout_secs {
                self.pricelist.timeout_secs = timeout_secs;
            }
        }

        if let Some(orders) = patch.orders {
            if let Some(log_path) = orders.log_path {
                self.orders.log_path = log_path;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(bot) = patch.bot {
            if let Some(profile) = bot.profile {
                self.bot.profile = Some(profile);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let bot_token =
            read_env("PHARMABOT_TELEGRAM_BOT_TOKEN").or_else(|| read_env("TELEGRAM_BOT_TOKEN"));
        if let Some(value) = bot_token {
            self.telegram.bot_token = secret_value(value);
        }
        let admin_chat = read_env_pair("PHARMABOT_TELEGRAM_ADMIN_CHAT_ID", "ADMIN_CHAT_ID");
        if let Some((key, value)) = admin_chat {
            self.telegram.admin_chat_id = non_zero_chat(parse_i64(key, &value)?);
        }
        if let Some(value) = read_env("PHARMABOT_TELEGRAM_API_BASE_URL") {
            self.telegram.api_base_url = value;
        }
        if let Some(value) = read_env("PHARMABOT_TELEGRAM_REQUEST_TIMEOUT_SECS") {
            self.telegram.request_timeout_secs =
                parse_u64("PHARMABOT_TELEGRAM_REQUEST_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("PHARMABOT_TELEGRAM_POLL_TIMEOUT_SECS") {
            self.telegram.poll_timeout_secs =
                parse_u64("PHARMABOT_TELEGRAM_POLL_TIMEOUT_SECS", &value)?;
        }

        let llm_api_key = read_env("PHARMABOT_LLM_API_KEY").or_else(|| read_env("OPENAI_API_KEY"));
        if let Some(value) = llm_api_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("PHARMABOT_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("PHARMABOT_LLM_MODEL") {
            self.llm.model = Some(value);
        }
        if let Some(value) = read_env("PHARMABOT_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("PHARMABOT_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PHARMABOT_PRICELIST_URL") {
            self.pricelist.url = value;
        }
        if let Some(value) = read_env("PHARMABOT_PRICELIST_TIMEOUT_SECS") {
            self.pricelist.timeout_secs = parse_u64("PHARMABOT_PRICELIST_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PHARMABOT_ORDERS_LOG_PATH") {
            self.orders.log_path = PathBuf::from(value);
        }

        if let Some(value) = read_env("PHARMABOT_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some((key, value)) = read_env_pair("PHARMABOT_SERVER_PORT", "PORT") {
            self.server.port = parse_u16(key, &value)?;
        }

        if let Some(value) = read_env("PHARMABOT_BOT_PROFILE") {
            self.bot.profile = Some(value.parse()?);
        }

        let log_level =
            read_env("PHARMABOT_LOGGING_LEVEL").or_else(|| read_env("PHARMABOT_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PHARMABOT_LOGGING_FORMAT").or_else(|| read_env("PHARMABOT_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bot_token) = overrides.bot_token {
            self.telegram.bot_token = secret_value(bot_token);
        }
        if let Some(admin_chat_id) = overrides.admin_chat_id {
            self.telegram.admin_chat_id = non_zero_chat(admin_chat_id);
        }
        if let Some(api_base_url) = overrides.telegram_api_base_url {
            self.telegram.api_base_url = api_base_url;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_base_url) = overrides.llm_base_url {
            self.llm.base_url = llm_base_url;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = Some(llm_model);
        }
        if let Some(pricelist_url) = overrides.pricelist_url {
            self.pricelist.url = pricelist_url;
        }
        if let Some(log_path) = overrides.orders_log_path {
            self.orders.log_path = log_path;
        }
        if let Some(port) = overrides.server_port {
            self.server.port = port;
        }
        if let Some(profile) = overrides.bot_profile {
            self.bot.profile = Some(profile);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_telegram(&self.telegram)?;
        validate_llm(&self.llm)?;
        validate_pricelist(&self.pricelist)?;
        validate_orders(&self.orders)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("pharmabot.toml"), PathBuf::from("config/pharmabot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_telegram(telegram: &TelegramConfig) -> Result<(), ConfigError> {
    let bot_token = telegram.bot_token.expose_secret().trim();
    if bot_token.is_empty() {
        return Err(ConfigError::Validation(
            "telegram.bot_token is required (set TELEGRAM_BOT_TOKEN). Get it from @BotFather"
                .to_string(),
        ));
    }

    let well_formed = bot_token
        .split_once(':')
        .map(|(bot_id, secret)| {
            !bot_id.is_empty()
                && bot_id.bytes().all(|byte| byte.is_ascii_digit())
                && !secret.is_empty()
        })
        .unwrap_or(false);
    if !well_formed {
        return Err(ConfigError::Validation(
            "telegram.bot_token must look like `<bot id>:<secret>` as issued by @BotFather"
                .to_string(),
        ));
    }

    if !is_http_url(&telegram.api_base_url) {
        return Err(ConfigError::Validation(
            "telegram.api_base_url must start with http:// or https://".to_string(),
        ));
    }

    if telegram.request_timeout_secs == 0 || telegram.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "telegram.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if telegram.poll_timeout_secs > 600 {
        return Err(ConfigError::Validation(
            "telegram.poll_timeout_secs must be in range 0..=600".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if !is_http_url(&llm.base_url) {
        return Err(ConfigError::Validation(
            "llm.base_url must start with http:// or https://".to_string(),
        ));
    }

    if llm.model.as_ref().is_some_and(|model| model.trim().is_empty()) {
        return Err(ConfigError::Validation("llm.model must not be blank when set".to_string()));
    }

    Ok(())
}

fn validate_pricelist(pricelist: &PriceListConfig) -> Result<(), ConfigError> {
    if !is_http_url(&pricelist.url) {
        return Err(ConfigError::Validation(
            "pricelist.url must start with http:// or https://".to_string(),
        ));
    }

    if pricelist.timeout_secs == 0 || pricelist.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "pricelist.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_orders(orders: &OrdersConfig) -> Result<(), ConfigError> {
    if orders.log_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("orders.log_path must not be empty".to_string()));
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

// The platform treats chat id 0 as "no admin configured".
fn non_zero_chat(chat_id: i64) -> Option<i64> {
    (chat_id != 0).then_some(chat_id)
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn read_env_pair(primary: &'static str, alias: &'static str) -> Option<(&'static str, String)> {
    read_env(primary)
        .map(|value| (primary, value))
        .or_else(|| read_env(alias).map(|value| (alias, value)))
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    telegram: Option<TelegramPatch>,
    llm: Option<LlmPatch>,
    pricelist: Option<PriceListPatch>,
    orders: Option<OrdersPatch>,
    server: Option<ServerPatch>,
    bot: Option<BotPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct TelegramPatch {
    bot_token: Option<String>,
    admin_chat_id: Option<i64>,
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    poll_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PriceListPatch {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct OrdersPatch {
    log_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct BotPatch {
    profile: Option<BotProfile>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
pub(crate) mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, BotProfile, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    const ENV_KEYS: &[&str] = &[
        "PHARMABOT_TELEGRAM_BOT_TOKEN",
        "TELEGRAM_BOT_TOKEN",
        "PHARMABOT_TELEGRAM_ADMIN_CHAT_ID",
        "ADMIN_CHAT_ID",
        "PHARMABOT_TELEGRAM_API_BASE_URL",
        "PHARMABOT_TELEGRAM_REQUEST_TIMEOUT_SECS",
        "PHARMABOT_TELEGRAM_POLL_TIMEOUT_SECS",
        "PHARMABOT_LLM_API_KEY",
        "OPENAI_API_KEY",
        "PHARMABOT_LLM_BASE_URL",
        "PHARMABOT_LLM_MODEL",
        "PHARMABOT_LLM_TIMEOUT_SECS",
        "PHARMABOT_PRICELIST_URL",
        "PHARMABOT_PRICELIST_TIMEOUT_SECS",
        "PHARMABOT_ORDERS_LOG_PATH",
        "PHARMABOT_SERVER_BIND_ADDRESS",
        "PHARMABOT_SERVER_PORT",
        "PORT",
        "PHARMABOT_BOT_PROFILE",
        "PHARMABOT_LOGGING_LEVEL",
        "PHARMABOT_LOG_LEVEL",
        "PHARMABOT_LOGGING_FORMAT",
        "PHARMABOT_LOG_FORMAT",
    ];

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    pub(crate) fn env_lock() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        clear_vars(ENV_KEYS);
        guard
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock();

        env::set_var("TEST_PHARMABOT_TOKEN", "12345:from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("pharmabot.toml");
            fs::write(
                &path,
                r#"
[telegram]
bot_token = "${TEST_PHARMABOT_TOKEN}"
admin_chat_id = 777

[orders]
log_path = "data/orders.csv"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.telegram.bot_token.expose_secret() == "12345:from-env",
                "bot token should be interpolated from environment",
            )?;
            ensure(config.telegram.admin_chat_id == Some(777), "admin chat should load from file")?;
            ensure(
                config.orders.log_path.ends_with("data/orders.csv"),
                "orders path should load from file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_PHARMABOT_TOKEN"]);
        result
    }

    #[test]
    fn plain_platform_env_names_are_supported() -> Result<(), String> {
        let _guard = env_lock();

        env::set_var("TELEGRAM_BOT_TOKEN", "42:plain");
        env::set_var("ADMIN_CHAT_ID", "-100200300");
        env::set_var("OPENAI_API_KEY", "sk-plain");
        env::set_var("PORT", "9090");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.telegram.bot_token.expose_secret() == "42:plain", "token alias")?;
            ensure(config.telegram.admin_chat_id == Some(-100200300), "admin chat alias")?;
            ensure(
                config.llm.api_key.as_ref().map(|key| key.expose_secret() == "sk-plain")
                    == Some(true),
                "llm key alias",
            )?;
            ensure(config.server.port == 9090, "port alias")?;
            Ok(())
        })();

        clear_vars(ENV_KEYS);
        result
    }

    #[test]
    fn zero_admin_chat_means_unset() -> Result<(), String> {
        let _guard = env_lock();

        env::set_var("TELEGRAM_BOT_TOKEN", "42:plain");
        env::set_var("ADMIN_CHAT_ID", "0");

        let result = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))
            .and_then(|config| {
                ensure(config.telegram.admin_chat_id.is_none(), "zero chat id should be unset")
            });

        clear_vars(ENV_KEYS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock();

        env::set_var("PHARMABOT_TELEGRAM_BOT_TOKEN", "1:from-env");
        env::set_var("TELEGRAM_BOT_TOKEN", "2:alias-loses");
        env::set_var("PHARMABOT_PRICELIST_URL", "https://env.example/prices");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("pharmabot.toml");
            fs::write(
                &path,
                r#"
[telegram]
bot_token = "3:from-file"

[pricelist]
url = "https://file.example/prices"

[bot]
profile = "assistant"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    bot_profile: Some(BotProfile::Wholesale),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.telegram.bot_token.expose_secret() == "1:from-env",
                "prefixed env token should win over alias and file",
            )?;
            ensure(
                config.pricelist.url == "https://env.example/prices",
                "env price list url should win over file",
            )?;
            ensure(config.logging.level == "debug", "override log level should win")?;
            ensure(
                config.profile_or(BotProfile::Assistant) == BotProfile::Wholesale,
                "override profile should win over file",
            )?;
            Ok(())
        })();

        clear_vars(ENV_KEYS);
        result
    }

    #[test]
    fn missing_bot_token_fails_fast() -> Result<(), String> {
        let _guard = env_lock();

        let error = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => return Err("expected validation failure but config load succeeded".into()),
            Err(error) => error,
        };
        ensure(
            matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("telegram.bot_token")
            ),
            "validation failure should mention telegram.bot_token",
        )
    }

    #[test]
    fn malformed_bot_token_is_rejected() -> Result<(), String> {
        let _guard = env_lock();

        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                bot_token: Some("not-a-token".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });
        ensure(
            matches!(result, Err(ConfigError::Validation(ref message)) if message.contains("<bot id>")),
            "malformed token should be rejected",
        )
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock();

        env::set_var("TELEGRAM_BOT_TOKEN", "42:plain");
        env::set_var("PORT", "eighty");

        let result = AppConfig::load(LoadOptions::default());
        clear_vars(ENV_KEYS);

        ensure(
            matches!(result, Err(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "PORT"),
            "non-numeric port should name the offending variable",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock();

        env::set_var("TELEGRAM_BOT_TOKEN", "99:secret-bot-value");
        env::set_var("OPENAI_API_KEY", "sk-secret-llm-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("secret-bot-value"), "debug output should not contain token")?;
            ensure(!debug.contains("sk-secret-llm-value"), "debug output should not contain key")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(ENV_KEYS);
        result
    }
}
