//! Storage adapters: the append-only order log and per-chat form sessions.

pub mod order_log;
pub mod sessions;

pub use order_log::{CsvOrderLog, InMemoryOrderLog, OrderLog, OrderLogError, ORDER_LOG_HEADER};
pub use sessions::{ChatId, InMemorySessionStore, SessionStore};
