use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use pharmabot_agent::{CompletionRelay, LlmError, OpenAiChatClient, Persona};
use pharmabot_core::config::{AppConfig, BotProfile, ConfigError, LoadOptions};
use pharmabot_core::pricelist::{PriceListError, PriceListProvider, ScrapedPriceList};
use pharmabot_db::{CsvOrderLog, InMemorySessionStore};
use pharmabot_telegram::{
    BotApiError, BotRouter, HttpBotApi, PollingRunner, ReconnectPolicy, UpdateDispatcher,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::health::{self, HealthState};
use crate::price_source::HttpPriceSource;
use crate::webhook;

pub struct Application {
    pub config: AppConfig,
    pub profile: BotProfile,
    pub price_list: Arc<ScrapedPriceList<HttpPriceSource>>,
    pub bot_api: Arc<HttpBotApi>,
    pub dispatcher: Arc<UpdateDispatcher>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("price list client could not be built: {0}")]
    PriceSource(#[source] PriceListError),
    #[error("completion client could not be built: {0}")]
    Llm(#[source] LlmError),
    #[error("bot api client could not be built: {0}")]
    BotApi(#[source] BotApiError),
}

pub fn bootstrap(
    options: LoadOptions,
    default_profile: BotProfile,
) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config, default_profile)
}

/// Wires every adapter from an already loaded config. `default_profile`
/// applies only when the config names none.
pub fn bootstrap_with_config(
    config: AppConfig,
    default_profile: BotProfile,
) -> Result<Application, BootstrapError> {
    let profile = config.profile_or(default_profile);

    let source = HttpPriceSource::new(
        config.pricelist.url.clone(),
        Duration::from_secs(config.pricelist.timeout_secs),
    )
    .map_err(BootstrapError::PriceSource)?;
    let price_list = Arc::new(ScrapedPriceList::new(source));

    let llm = OpenAiChatClient::new(
        &config.llm.base_url,
        config.llm.api_key.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    )
    .map_err(BootstrapError::Llm)?;
    if config.llm.api_key.is_none() {
        warn!(
            event_name = "system.bootstrap.llm_unconfigured",
            correlation_id = "bootstrap",
            "no LLM API key configured; free-text questions get the fallback reply"
        );
    }
    let persona = Persona::for_profile(profile).with_model(config.llm.model.clone());
    let relay = Arc::new(CompletionRelay::new(Arc::new(llm), persona));

    let router = BotRouter::new(
        profile,
        Arc::clone(&price_list) as Arc<dyn PriceListProvider>,
        Arc::new(InMemorySessionStore::default()),
        Arc::new(CsvOrderLog::new(config.orders.log_path.clone())),
        relay,
    )
    .with_admin_chat(config.telegram.admin_chat_id);

    let bot_api = Arc::new(
        HttpBotApi::new(
            &config.telegram.api_base_url,
            config.telegram.bot_token.clone(),
            Duration::from_secs(config.telegram.request_timeout_secs),
        )
        .map_err(BootstrapError::BotApi)?,
    );
    let dispatcher = Arc::new(UpdateDispatcher::new(Arc::new(router), bot_api.clone()));

    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        profile = ?profile,
        admin_notifications = config.telegram.admin_chat_id.is_some(),
        orders_log = %config.orders.log_path.display(),
        "application wired"
    );

    Ok(Application { config, profile, price_list, bot_api, dispatcher })
}

impl Application {
    /// Loads the price list once. A failure is logged and the bot starts with
    /// an empty list; the next order form retries the fetch.
    pub async fn warm_price_list(&self) -> bool {
        match self.price_list.refresh().await {
            Ok(list) => {
                info!(
                    event_name = "system.pricelist.loaded",
                    correlation_id = "bootstrap",
                    products = list.len(),
                    origin = self.price_list.origin(),
                    "price list loaded"
                );
                true
            }
            Err(error) => {
                warn!(
                    event_name = "system.pricelist.load_failed",
                    correlation_id = "bootstrap",
                    error = %error,
                    "price list could not be loaded at startup"
                );
                false
            }
        }
    }

    /// `POST /` for platform updates and `GET /health`.
    pub fn http_router(&self) -> Router {
        let health_state = HealthState {
            profile: self.profile,
            price_list: Arc::clone(&self.price_list) as Arc<dyn PriceListProvider>,
        };
        webhook::router(Arc::clone(&self.dispatcher)).merge(health::router(health_state))
    }

    pub fn polling_runner(&self) -> PollingRunner {
        PollingRunner::new(
            self.bot_api.clone(),
            Arc::clone(&self.dispatcher),
            ReconnectPolicy::default(),
            self.config.telegram.poll_timeout_secs,
        )
    }
}
