use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, warn};

use pharmabot_agent::CompletionRelay;
use pharmabot_core::config::BotProfile;
use pharmabot_core::domain::order::OrderRecord;
use pharmabot_core::errors::{ApplicationError, DomainError};
use pharmabot_core::flows::{
    FormAction, FormEngine, FormEvent, FormState, FormTransitionError, OrderForm, OrderSession,
};
use pharmabot_core::pricelist::{PriceListError, PriceListProvider};
use pharmabot_core::pricing::{price_order_text, OrderQuote};
use pharmabot_core::LookupOptions;
use pharmabot_db::{OrderLog, SessionStore};

use crate::commands::{classify, Inbound};
use crate::replies::{self, OutgoingMessage, ReplyKeyboard};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub correlation_id: String,
}

impl Default for EventContext {
    fn default() -> Self {
        Self { correlation_id: "unknown-correlation-id".to_owned() }
    }
}

/// Turns one chat text into the messages to send back.
pub struct BotRouter {
    profile: BotProfile,
    price_list: Arc<dyn PriceListProvider>,
    sessions: Arc<dyn SessionStore>,
    order_log: Arc<dyn OrderLog>,
    relay: Arc<CompletionRelay>,
    admin_chat_id: Option<i64>,
    engine: FormEngine<OrderForm>,
}

impl BotRouter {
    pub fn new(
        profile: BotProfile,
        price_list: Arc<dyn PriceListProvider>,
        sessions: Arc<dyn SessionStore>,
        order_log: Arc<dyn OrderLog>,
        relay: Arc<CompletionRelay>,
    ) -> Self {
        Self {
            profile,
            price_list,
            sessions,
            order_log,
            relay,
            admin_chat_id: None,
            engine: FormEngine::default(),
        }
    }

    pub fn with_admin_chat(mut self, admin_chat_id: Option<i64>) -> Self {
        self.admin_chat_id = admin_chat_id.filter(|id| *id != 0);
        self
    }

    pub fn profile(&self) -> BotProfile {
        self.profile
    }

    pub async fn handle(
        &self,
        chat_id: i64,
        text: &str,
        ctx: &EventContext,
    ) -> Vec<OutgoingMessage> {
        let inbound = classify(text);
        debug!(
            event_name = "router.inbound_classified",
            correlation_id = %ctx.correlation_id,
            chat_id,
            inbound = ?inbound,
            "classified inbound text"
        );

        if inbound == Inbound::Start {
            self.sessions.clear(chat_id).await;
            return vec![replies::welcome(chat_id, self.profile)];
        }
        if self.profile == BotProfile::Assistant {
            return vec![self.relay_reply(chat_id, text, ctx).await];
        }

        match inbound {
            Inbound::Price { query } => self.price_reply(chat_id, query.as_deref(), ctx).await,
            Inbound::Cancel => self.advance(chat_id, FormEvent::Abort, ctx).await,
            other => {
                let session = self.sessions.load(chat_id).await;
                if session.is_active() {
                    // Every step takes the next message as-is, the order label included.
                    let event = match (session.state, other) {
                        (FormState::Confirm, Inbound::ConfirmButton) => FormEvent::ConfirmPressed,
                        (FormState::Confirm, Inbound::CancelButton) => FormEvent::CancelPressed,
                        _ => FormEvent::Text(text.to_owned()),
                    };
                    self.advance(chat_id, event, ctx).await
                } else if other == Inbound::OrderButton {
                    self.advance(chat_id, FormEvent::Begin, ctx).await
                } else if matches!(other, Inbound::OtherCommand { .. }) {
                    Vec::new()
                } else {
                    vec![self.relay_reply(chat_id, text, ctx).await]
                }
            }
        }
    }

    async fn relay_reply(&self, chat_id: i64, text: &str, ctx: &EventContext) -> OutgoingMessage {
        info!(
            event_name = "router.relay_requested",
            correlation_id = %ctx.correlation_id,
            chat_id,
            model = %self.relay.persona().model,
            "relaying free text"
        );
        OutgoingMessage::new(chat_id, self.relay.reply(text).await)
    }

    async fn price_reply(
        &self,
        chat_id: i64,
        query: Option<&str>,
        ctx: &EventContext,
    ) -> Vec<OutgoingMessage> {
        let list = match self.price_list.ensure_loaded().await {
            Ok(list) => list,
            Err(error) => {
                log_price_list_failure(error, ctx, "price lookup falls back to the cached list");
                self.price_list.current().await
            }
        };

        if list.is_empty() {
            return vec![OutgoingMessage::new(chat_id, replies::PRICE_LIST_UNAVAILABLE)];
        }
        let Some(query) = query else {
            return vec![OutgoingMessage::new(chat_id, replies::PRICE_USAGE)];
        };

        let lookup = list.catalog.lookup(query, LookupOptions::PRICE_COMMAND);
        let reply = match lookup.matches.as_slice() {
            [] => replies::price_not_found(chat_id, query),
            [single] => replies::product_card(chat_id, single),
            many => replies::price_results(chat_id, query, lookup.strategy, many),
        };
        vec![reply]
    }

    async fn advance(
        &self,
        chat_id: i64,
        event: FormEvent,
        ctx: &EventContext,
    ) -> Vec<OutgoingMessage> {
        let session = self.sessions.load(chat_id).await;
        let outcome = match self.engine.apply(&session.state, &event) {
            Ok(outcome) => outcome,
            Err(FormTransitionError::NotActive) => {
                return vec![OutgoingMessage::new(chat_id, replies::NO_ACTIVE_ORDER)];
            }
            Err(error) => {
                let interface = ApplicationError::from(DomainError::from(error))
                    .into_interface(ctx.correlation_id.clone());
                warn!(
                    event_name = "order.transition_rejected",
                    correlation_id = %ctx.correlation_id,
                    chat_id,
                    error = %interface,
                    "order form rejected event"
                );
                return vec![OutgoingMessage::new(chat_id, interface.user_message())];
            }
        };

        let mut working = session.clone();
        let mut quote: Option<OrderQuote> = None;
        let mut persisted: Option<OrderRecord> = None;
        let mut outgoing = Vec::new();

        for action in &outcome.actions {
            match action {
                FormAction::DiscardDraft => working.discard_draft(),
                FormAction::EnsurePriceList => {
                    if let Err(error) = self.price_list.ensure_loaded().await {
                        log_price_list_failure(
                            error,
                            ctx,
                            "order form started without a price list",
                        );
                    }
                }
                FormAction::RecordField(field) => {
                    if let FormEvent::Text(value) = &event {
                        working.record(*field, value.clone());
                    }
                }
                FormAction::PromptFor(field) => {
                    outgoing.push(replies::field_prompt(chat_id, *field));
                }
                FormAction::PriceItems => {
                    let list = self.price_list.current().await;
                    let items = working.draft.items_text.as_deref().unwrap_or_default();
                    let priced = price_order_text(items, &list.catalog);
                    working.draft.apply_quote(&priced);
                    quote = Some(priced);
                }
                FormAction::ShowSummary => {
                    let priced = quote.clone().unwrap_or_default();
                    outgoing.push(replies::order_summary(chat_id, &working.draft, &priced));
                }
                FormAction::PersistOrder => {
                    let record = working.draft.to_record(Local::now().naive_local());
                    if let Err(error) = self.order_log.append(&record).await {
                        return self.persistence_failure(chat_id, &session, error.to_string(), ctx);
                    }
                    info!(
                        event_name = "order.persisted",
                        correlation_id = %ctx.correlation_id,
                        chat_id,
                        total = %record.total,
                        "order appended to log"
                    );
                    persisted = Some(record);
                }
                FormAction::NotifyAdmin => {
                    if let (Some(admin_chat_id), Some(record)) = (self.admin_chat_id, &persisted) {
                        outgoing.push(replies::admin_notice(admin_chat_id, record));
                    }
                }
                FormAction::ReportAccepted => outgoing.push(
                    OutgoingMessage::new(chat_id, replies::ORDER_ACCEPTED)
                        .with_keyboard(ReplyKeyboard::order()),
                ),
                FormAction::ReportCancelled => {
                    outgoing.push(OutgoingMessage::new(chat_id, replies::ORDER_CANCELLED));
                }
                FormAction::ReportAborted => {
                    outgoing.push(OutgoingMessage::new(chat_id, replies::ORDER_ABORTED));
                }
                FormAction::RepromptConfirmation => {
                    outgoing.push(replies::confirmation_reprompt(chat_id));
                }
            }
        }

        info!(
            event_name = "order.form_transition",
            correlation_id = %ctx.correlation_id,
            chat_id,
            from = ?outcome.from,
            to = ?outcome.to,
            "order form advanced"
        );
        working.state = outcome.to;
        self.sessions.save(chat_id, working).await;
        outgoing
    }

    /// Leaves the session at the confirmation step so the user can retry.
    fn persistence_failure(
        &self,
        chat_id: i64,
        session: &OrderSession,
        error: String,
        ctx: &EventContext,
    ) -> Vec<OutgoingMessage> {
        let interface =
            ApplicationError::Persistence(error).into_interface(ctx.correlation_id.clone());
        warn!(
            event_name = "order.persist_failed",
            correlation_id = %ctx.correlation_id,
            chat_id,
            state = ?session.state,
            error = %interface,
            "order log append failed"
        );
        vec![OutgoingMessage::new(chat_id, interface.user_message())
            .with_keyboard(ReplyKeyboard::confirm())]
    }
}

/// Items priced against an empty list come out unresolved, so a failed load
/// never blocks the conversation.
fn log_price_list_failure(error: PriceListError, ctx: &EventContext, detail: &'static str) {
    let interface = ApplicationError::PriceList(error).into_interface(ctx.correlation_id.clone());
    warn!(
        event_name = "pricelist.load_failed",
        correlation_id = %interface.correlation_id(),
        error = %interface,
        "{detail}"
    );
}
