//! Telegram Integration - Bot API interface for the pharmacy bot
//!
//! This crate provides the chat-facing side of pharmabot:
//! - **Bot API** (`api`) - Update types, `sendMessage`, `getUpdates`
//! - **Commands** (`commands`) - `/start`, `/p <query>`, `/cancel`, keyboard labels
//! - **Router** (`router`) - Profile-gated handling: price lookup, order form, relay
//! - **Dispatch** (`dispatch`) - Runs the router for one update and sends the replies
//! - **Polling** (`polling`) - Long-polling loop with backoff
//! - **Replies** (`replies`) - Reply texts and reply keyboards
//!
//! # Architecture
//!
//! ```text
//! Webhook / getUpdates → UpdateDispatcher → BotRouter → order form / price list / relay
//!                              ↓
//!                   BotApi::send_message ← OutgoingMessage
//! ```

pub mod api;
pub mod commands;
pub mod dispatch;
pub mod polling;
pub mod replies;
pub mod router;

pub use api::{BotApi, BotApiError, HttpBotApi, Update};
pub use dispatch::{DispatchOutcome, UpdateDispatcher};
pub use polling::{PollingRunner, ReconnectPolicy};
pub use replies::{OutgoingMessage, ReplyKeyboard};
pub use router::{BotRouter, EventContext};
