//! Webhook ingress: the chat platform posts each update to `POST /`.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use pharmabot_telegram::{DispatchOutcome, Update, UpdateDispatcher};

#[derive(Clone)]
pub struct WebhookState {
    pub dispatcher: Arc<UpdateDispatcher>,
}

pub fn router(dispatcher: Arc<UpdateDispatcher>) -> Router {
    Router::new().route("/", post(receive_update)).with_state(WebhookState { dispatcher })
}

/// Replies are sent before the platform gets its acknowledgement. Delivery
/// failures never change the acknowledgement.
pub async fn receive_update(
    State(state): State<WebhookState>,
    Json(update): Json<Update>,
) -> (StatusCode, &'static str) {
    match state.dispatcher.dispatch(&update).await {
        DispatchOutcome::NoMessage => (StatusCode::OK, "no message"),
        DispatchOutcome::Ignored | DispatchOutcome::Handled { .. } => (StatusCode::OK, "ok"),
    }
}
