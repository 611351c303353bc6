#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};

use pharmabot_agent::{CompletionRelay, CompletionRequest, LlmClient, LlmError, Persona};
use pharmabot_core::config::BotProfile;
use pharmabot_core::domain::order::OrderRecord;
use pharmabot_core::domain::product::ProductRecord;
use pharmabot_core::pricelist::{PriceList, PriceListError, PriceListProvider};
use pharmabot_db::{InMemoryOrderLog, InMemorySessionStore, OrderLog, OrderLogError};
use pharmabot_telegram::api::{Chat, Message};
use pharmabot_telegram::{BotApi, BotApiError, BotRouter, OutgoingMessage, Update};

pub const CHAT: i64 = 501;
pub const ADMIN: i64 = 999;

pub fn products() -> Vec<ProductRecord> {
    vec![
        ProductRecord::new("Amlodipine 5mg", "1,000").with_unit("box"),
        ProductRecord::new("Amlodipine 10mg", "1,800"),
        ProductRecord::new("Euroamlo 10mg", "2,500").with_expiry("03/2028"),
        ProductRecord::new("Paracetamol 500mg", "350"),
    ]
}

/// Fixed snapshot; refreshing an empty one fails like an unreachable site.
pub struct StaticPriceList {
    list: Arc<PriceList>,
    pub refreshes: AtomicUsize,
}

impl StaticPriceList {
    pub fn new(records: Vec<ProductRecord>) -> Self {
        let list = if records.is_empty() {
            PriceList::default()
        } else {
            PriceList::new(records, Utc::now())
        };
        Self { list: Arc::new(list), refreshes: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl PriceListProvider for StaticPriceList {
    async fn refresh(&self) -> Result<Arc<PriceList>, PriceListError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.list.is_empty() {
            return Err(PriceListError::Transport("site unreachable".to_owned()));
        }
        Ok(Arc::clone(&self.list))
    }

    async fn current(&self) -> Arc<PriceList> {
        Arc::clone(&self.list)
    }
}

/// Replies `echo: <user text>`.
#[derive(Default)]
pub struct EchoClient {
    pub requests: Mutex<Vec<CompletionRequest>>,
}

#[async_trait]
impl LlmClient for EchoClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().await.push(request.clone());
        let user = request.messages.last().map(|message| message.content.clone());
        Ok(format!("echo: {}", user.unwrap_or_default()))
    }
}

pub struct FailingOrderLog;

#[async_trait]
impl OrderLog for FailingOrderLog {
    async fn append(&self, _record: &OrderRecord) -> Result<(), OrderLogError> {
        Err(OrderLogError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "orders.csv is read-only",
        )))
    }
}

pub struct Harness {
    pub router: Arc<BotRouter>,
    pub sessions: Arc<InMemorySessionStore>,
    pub orders: Arc<InMemoryOrderLog>,
    pub llm: Arc<EchoClient>,
    pub prices: Arc<StaticPriceList>,
}

pub fn harness(profile: BotProfile, records: Vec<ProductRecord>, admin: Option<i64>) -> Harness {
    let sessions = Arc::new(InMemorySessionStore::default());
    let orders = Arc::new(InMemoryOrderLog::default());
    let llm = Arc::new(EchoClient::default());
    let prices = Arc::new(StaticPriceList::new(records));
    let relay = Arc::new(CompletionRelay::new(llm.clone(), Persona::for_profile(profile)));

    let router = BotRouter::new(profile, prices.clone(), sessions.clone(), orders.clone(), relay)
        .with_admin_chat(admin);

    Harness { router: Arc::new(router), sessions, orders, llm, prices }
}

pub fn harness_with_log(order_log: Arc<dyn OrderLog>) -> (Arc<BotRouter>, Arc<InMemorySessionStore>) {
    let sessions = Arc::new(InMemorySessionStore::default());
    let relay = Arc::new(CompletionRelay::new(
        Arc::new(EchoClient::default()),
        Persona::for_profile(BotProfile::Wholesale),
    ));
    let router = BotRouter::new(
        BotProfile::Wholesale,
        Arc::new(StaticPriceList::new(products())),
        sessions.clone(),
        order_log,
        relay,
    );
    (Arc::new(router), sessions)
}

pub fn text_update(update_id: i64, chat_id: i64, text: &str) -> Update {
    Update {
        update_id,
        message: Some(Message {
            message_id: update_id,
            chat: Chat { id: chat_id },
            text: Some(text.to_owned()),
        }),
    }
}

/// Records sends and replays a script of `getUpdates` results. Once the
/// script runs out it signals `exhausted` and returns empty batches.
#[derive(Default)]
pub struct ScriptedBotApi {
    pub sent: Mutex<Vec<OutgoingMessage>>,
    pub offsets: Mutex<Vec<i64>>,
    batches: Mutex<VecDeque<Result<Vec<Update>, BotApiError>>>,
    failing_chats: Vec<i64>,
    pub exhausted: Arc<Notify>,
}

impl ScriptedBotApi {
    pub fn with_batches(batches: Vec<Result<Vec<Update>, BotApiError>>) -> Self {
        Self { batches: Mutex::new(batches.into()), ..Self::default() }
    }

    pub fn failing_for(chats: Vec<i64>) -> Self {
        Self { failing_chats: chats, ..Self::default() }
    }
}

#[async_trait]
impl BotApi for ScriptedBotApi {
    async fn send_message(&self, message: &OutgoingMessage) -> Result<(), BotApiError> {
        if self.failing_chats.contains(&message.chat_id) {
            return Err(BotApiError::Status {
                status: 403,
                description: "bot was blocked by the user".to_owned(),
            });
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }

    async fn get_updates(
        &self,
        offset: i64,
        _timeout_secs: u64,
    ) -> Result<Vec<Update>, BotApiError> {
        self.offsets.lock().await.push(offset);
        match self.batches.lock().await.pop_front() {
            Some(batch) => batch,
            None => {
                self.exhausted.notify_one();
                tokio::task::yield_now().await;
                Ok(Vec::new())
            }
        }
    }
}
