use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::replies::{OutgoingMessage, ReplyKeyboard};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    #[serde(default)]
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BotApiError {
    #[error("bot api request failed: {0}")]
    Transport(String),
    #[error("bot api returned HTTP {status}: {description}")]
    Status { status: u16, description: String },
    #[error("bot api rejected the call: {0}")]
    Api(String),
}

#[async_trait]
pub trait BotApi: Send + Sync {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), BotApiError>;
    async fn get_updates(&self, offset: i64, timeout_secs: u64)
        -> Result<Vec<Update>, BotApiError>;
}

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup<'a>>,
}

#[derive(Debug, Serialize)]
struct ReplyMarkup<'a> {
    keyboard: Vec<Vec<KeyboardButton<'a>>>,
    resize_keyboard: bool,
}

#[derive(Debug, Serialize)]
struct KeyboardButton<'a> {
    text: &'a str,
}

impl<'a> From<&'a ReplyKeyboard> for ReplyMarkup<'a> {
    fn from(keyboard: &'a ReplyKeyboard) -> Self {
        Self {
            keyboard: keyboard
                .rows
                .iter()
                .map(|row| row.iter().map(|label| KeyboardButton { text: label }).collect())
                .collect(),
            resize_keyboard: true,
        }
    }
}

#[derive(Debug, Serialize)]
struct GetUpdatesBody {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API over HTTPS: `{base_url}/bot<token>/<method>`.
pub struct HttpBotApi {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
    request_timeout: Duration,
}

impl HttpBotApi {
    pub fn new(
        base_url: &str,
        token: SecretString,
        request_timeout: Duration,
    ) -> Result<Self, BotApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|error| BotApiError::Transport(error.without_url().to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
            request_timeout,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token.expose_secret())
    }

    async fn call<B, T>(&self, method: &str, body: &B, timeout: Duration) -> Result<T, BotApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.method_url(method))
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|error| BotApiError::Transport(error.without_url().to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| BotApiError::Transport(error.without_url().to_string()))?;
        let parsed = serde_json::from_str::<ApiResponse<T>>(&text);

        if !status.is_success() {
            let description = parsed
                .ok()
                .and_then(|body| body.description)
                .unwrap_or_else(|| text.chars().take(200).collect());
            return Err(BotApiError::Status { status: status.as_u16(), description });
        }

        let body = parsed.map_err(|error| BotApiError::Api(format!("undecodable reply: {error}")))?;
        if !body.ok {
            return Err(BotApiError::Api(
                body.description.unwrap_or_else(|| format!("{method} returned ok=false")),
            ));
        }
        body.result.ok_or_else(|| BotApiError::Api(format!("{method} returned no result")))
    }
}

#[async_trait]
impl BotApi for HttpBotApi {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), BotApiError> {
        let body = SendMessageBody {
            chat_id: message.chat_id,
            text: &message.text,
            reply_markup: message.keyboard.as_ref().map(ReplyMarkup::from),
        };
        self.call::<_, serde_json::Value>("sendMessage", &body, self.request_timeout).await?;
        Ok(())
    }

    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, BotApiError> {
        let body = GetUpdatesBody { offset, timeout: timeout_secs, allowed_updates: ["message"] };
        let timeout = self.request_timeout + Duration::from_secs(timeout_secs);
        self.call("getUpdates", &body, timeout).await
    }
}
