use std::sync::Arc;

use tracing::warn;

use crate::llm::{ChatMessage, CompletionRequest, LlmClient, LlmError};
use crate::persona::Persona;

/// Single-turn relay: `[system, user]` in, first choice out.
pub struct CompletionRelay {
    client: Arc<dyn LlmClient>,
    persona: Persona,
}

impl CompletionRelay {
    pub fn new(client: Arc<dyn LlmClient>, persona: Persona) -> Self {
        Self { client, persona }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn request_for(&self, text: &str) -> CompletionRequest {
        CompletionRequest {
            model: self.persona.model.clone(),
            messages: vec![
                ChatMessage::system(self.persona.system_prompt),
                ChatMessage::user(text.trim()),
            ],
            temperature: self.persona.temperature,
            max_tokens: self.persona.max_tokens,
        }
    }

    pub async fn relay(&self, text: &str) -> Result<String, LlmError> {
        self.client.complete(&self.request_for(text)).await
    }

    /// Like `relay`, but any failure becomes the persona's canned reply.
    pub async fn reply(&self, text: &str) -> String {
        match self.relay(text).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(
                    event_name = "relay.completion_failed",
                    model = %self.persona.model,
                    error = %error,
                    "completion relay failed"
                );
                self.persona.failure_reply.to_owned()
            }
        }
    }
}
