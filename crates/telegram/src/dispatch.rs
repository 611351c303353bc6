use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{BotApi, Update};
use crate::router::{BotRouter, EventContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The update carried no message.
    NoMessage,
    /// A message without usable text.
    Ignored,
    Handled { sent: usize, failed: usize },
}

/// Runs the router for one update and delivers every reply. Delivery
/// failures are logged and counted, never returned.
pub struct UpdateDispatcher {
    router: Arc<BotRouter>,
    api: Arc<dyn BotApi>,
}

impl UpdateDispatcher {
    pub fn new(router: Arc<BotRouter>, api: Arc<dyn BotApi>) -> Self {
        Self { router, api }
    }

    pub async fn dispatch(&self, update: &Update) -> DispatchOutcome {
        let ctx = EventContext { correlation_id: format!("update-{}", update.update_id) };
        let Some(message) = &update.message else {
            debug!(
                event_name = "ingress.telegram.no_message",
                correlation_id = %ctx.correlation_id,
                "update has no message"
            );
            return DispatchOutcome::NoMessage;
        };

        let chat_id = message.chat.id;
        let text = message.text.as_deref().unwrap_or_default();
        if text.trim().is_empty() {
            return DispatchOutcome::Ignored;
        }

        info!(
            event_name = "ingress.telegram.message_received",
            correlation_id = %ctx.correlation_id,
            chat_id,
            profile = ?self.router.profile(),
            "received telegram message"
        );

        let replies = self.router.handle(chat_id, text, &ctx).await;
        let mut sent = 0;
        let mut failed = 0;
        for reply in &replies {
            match self.api.send_message(reply).await {
                Ok(()) => sent += 1,
                Err(error) => {
                    failed += 1;
                    warn!(
                        event_name = "egress.telegram.send_failed",
                        correlation_id = %ctx.correlation_id,
                        chat_id = reply.chat_id,
                        error = %error,
                        "failed to send reply; continuing"
                    );
                }
            }
        }

        DispatchOutcome::Handled { sent, failed }
    }
}
