use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use pharmabot_core::flows::OrderSession;

pub type ChatId = i64;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the chat's session, or an idle one when none is stored.
    async fn load(&self, chat_id: ChatId) -> OrderSession;
    /// Stores an active session; inactive ones are dropped instead.
    async fn save(&self, chat_id: ChatId, session: OrderSession);
    async fn clear(&self, chat_id: ChatId);
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<ChatId, OrderSession>>,
}

impl InMemorySessionStore {
    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, chat_id: ChatId) -> OrderSession {
        let sessions = self.sessions.read().await;
        sessions.get(&chat_id).cloned().unwrap_or_default()
    }

    async fn save(&self, chat_id: ChatId, session: OrderSession) {
        let mut sessions = self.sessions.write().await;
        if session.is_active() {
            sessions.insert(chat_id, session);
        } else {
            sessions.remove(&chat_id);
        }
    }

    async fn clear(&self, chat_id: ChatId) {
        self.sessions.write().await.remove(&chat_id);
    }
}

#[cfg(test)]
mod tests {
    use pharmabot_core::flows::{DraftField, FormState, OrderSession};

    use super::{InMemorySessionStore, SessionStore};

    #[tokio::test]
    async fn unknown_chat_loads_idle_session() {
        let store = InMemorySessionStore::default();
        let session = store.load(7).await;
        assert_eq!(session.state, FormState::Idle);
        assert!(session.draft.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_chat() {
        let store = InMemorySessionStore::default();
        let mut session = OrderSession { state: FormState::Phone, ..OrderSession::default() };
        session.record(DraftField::Name, "Ko Aung");

        store.save(1, session.clone()).await;

        assert_eq!(store.load(1).await, session);
        assert_eq!(store.load(2).await.state, FormState::Idle);
    }

    #[tokio::test]
    async fn ended_session_is_dropped() {
        let store = InMemorySessionStore::default();
        store.save(1, OrderSession { state: FormState::Items, ..OrderSession::default() }).await;
        assert_eq!(store.active_count().await, 1);

        store.save(1, OrderSession { state: FormState::End, ..OrderSession::default() }).await;
        assert_eq!(store.active_count().await, 0);

        store.save(3, OrderSession { state: FormState::Name, ..OrderSession::default() }).await;
        store.clear(3).await;
        assert_eq!(store.load(3).await.state, FormState::Idle);
    }
}
