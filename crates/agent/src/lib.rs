//! Completion relay for free-text questions.
//!
//! Messages that are not commands and do not belong to an active order form
//! are forwarded to an OpenAI-compatible chat completion endpoint, framed by
//! the persona of the running bot profile.
//!
//! # Key Types
//!
//! - `LlmClient` - Pluggable completion backend (see `llm` module)
//! - `Persona` - Model, sampling bounds, system prompt and failure reply
//! - `CompletionRelay` - Single-turn relay; no memory, no retries
//!
//! The relay never touches prices or orders. Those come from the scraped
//! price list and the order form only.

pub mod llm;
pub mod persona;
pub mod relay;

pub use llm::{ChatMessage, ChatRole, CompletionRequest, LlmClient, LlmError, OpenAiChatClient};
pub use persona::Persona;
pub use relay::CompletionRelay;
