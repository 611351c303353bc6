use std::{future::Future, sync::Arc, time::Duration};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::api::BotApi;
use crate::dispatch::UpdateDispatcher;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { base_delay_ms: 250, max_delay_ms: 30_000 }
    }
}

impl ReconnectPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// `getUpdates` long-polling loop. Updates are dispatched one at a time, in
/// order; the offset only moves past an update once it has been dispatched.
pub struct PollingRunner {
    api: Arc<dyn BotApi>,
    dispatcher: Arc<UpdateDispatcher>,
    reconnect_policy: ReconnectPolicy,
    poll_timeout_secs: u64,
}

impl PollingRunner {
    pub fn new(
        api: Arc<dyn BotApi>,
        dispatcher: Arc<UpdateDispatcher>,
        reconnect_policy: ReconnectPolicy,
        poll_timeout_secs: u64,
    ) -> Self {
        Self { api, dispatcher, reconnect_policy, poll_timeout_secs }
    }

    /// Polls until `shutdown` resolves. Transport failures back off and the
    /// loop keeps going.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<i64>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset = 0_i64;
        let mut failures = 0_u32;
        info!(poll_timeout_secs = self.poll_timeout_secs, "starting telegram polling loop");

        loop {
            let batch = tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!(offset, "polling loop shutting down");
                    return Ok(offset);
                }
                batch = self.api.get_updates(offset, self.poll_timeout_secs) => batch,
            };

            match batch {
                Ok(updates) => {
                    failures = 0;
                    debug!(count = updates.len(), offset, "received update batch");
                    for update in updates {
                        let outcome = self.dispatcher.dispatch(&update).await;
                        debug!(
                            event_name = "ingress.telegram.update_dispatched",
                            correlation_id = %format!("update-{}", update.update_id),
                            outcome = ?outcome,
                            "dispatched update"
                        );
                        offset = offset.max(update.update_id + 1);
                    }
                }
                Err(error) => {
                    let delay = self.reconnect_policy.backoff(failures);
                    warn!(
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "getUpdates failed; backing off"
                    );
                    failures = failures.saturating_add(1);
                    if !delay.is_zero() {
                        tokio::select! {
                            biased;
                            () = &mut shutdown => return Ok(offset),
                            () = tokio::time::sleep(delay) => {}
                        }
                    }
                }
            }
        }
    }
}
