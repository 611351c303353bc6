use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ERROR_BODY_LIMIT: usize = 200;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("no LLM API key is configured")]
    NotConfigured,
    #[error("completion request timed out")]
    Timeout,
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response had no content")]
    EmptyResponse,
    #[error("completion response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Returns the first choice's content, trimmed.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `POST {base_url}/chat/completions` with a bearer key.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl OpenAiChatClient {
    pub fn new(
        base_url: &str,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| LlmError::Transport(error.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for OpenAiChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::NotConfigured)?;

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let body: CompletionResponse =
            response.json().await.map_err(|error| LlmError::Decode(error.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

fn map_transport_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ChatMessage, CompletionRequest, LlmClient, LlmError, OpenAiChatClient};

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".to_owned(),
            messages: vec![ChatMessage::system("be brief"), ChatMessage::user("hello")],
            temperature: None,
            max_tokens: Some(200),
        }
    }

    fn client(server: &MockServer, timeout: Duration) -> OpenAiChatClient {
        OpenAiChatClient::new(&format!("{}/v1/", server.uri()), Some("sk-test".to_owned().into()), timeout)
            .expect("client builds")
    }

    #[test]
    fn request_omits_unset_sampling_fields() {
        let encoded = serde_json::to_value(request()).expect("encode");
        assert_eq!(encoded["max_tokens"], 200);
        assert!(encoded.get("temperature").is_none());
        assert_eq!(encoded["messages"][0]["role"], "system");
        assert_eq!(encoded["messages"][1]["content"], "hello");
    }

    #[tokio::test]
    async fn returns_trimmed_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-4o-mini", "max_tokens": 200})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "  မင်္ဂလာပါ  \n"}},
                    {"message": {"role": "assistant", "content": "second"}}
                ]
            })))
            .mount(&server)
            .await;

        let reply = client(&server, Duration::from_secs(5)).complete(&request()).await;
        assert_eq!(reply, Ok("မင်္ဂလာပါ".to_owned()));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let error = client(&server, Duration::from_secs(5))
            .complete(&request())
            .await
            .expect_err("429 must fail");
        assert_eq!(error, LlmError::Status { status: 429, body: "rate limited".to_owned() });
    }

    #[tokio::test]
    async fn empty_choices_are_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let error = client(&server, Duration::from_secs(5)).complete(&request()).await;
        assert_eq!(error, Err(LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let error = client(&server, Duration::from_secs(5)).complete(&request()).await;
        assert!(matches!(error, Err(LlmError::Decode(_))));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(500))
                    .set_body_json(json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let error = client(&server, Duration::from_millis(50)).complete(&request()).await;
        assert_eq!(error, Err(LlmError::Timeout));
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let client = OpenAiChatClient::new("http://127.0.0.1:9", None, Duration::from_secs(1))
            .expect("client builds");
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/chat/completions");
        assert_eq!(client.complete(&request()).await, Err(LlmError::NotConfigured));
    }
}
