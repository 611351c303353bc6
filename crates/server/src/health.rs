use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use pharmabot_core::config::BotProfile;
use pharmabot_core::pricelist::PriceListProvider;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    pub profile: BotProfile,
    pub price_list: Arc<dyn PriceListProvider>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub profile: BotProfile,
    pub service: HealthCheck,
    pub price_list: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let price_list = price_list_check(&state).await;
    let ready = price_list.status != "degraded";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        profile: state.profile,
        service: HealthCheck {
            status: "ready",
            detail: "pharmabot webhook runtime initialized".to_string(),
        },
        price_list,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn price_list_check(state: &HealthState) -> HealthCheck {
    let snapshot = state.price_list.current().await;
    match (state.profile, snapshot.fetched_at) {
        (_, Some(fetched_at)) => HealthCheck {
            status: "ready",
            detail: format!("{} products loaded at {}", snapshot.len(), fetched_at.to_rfc3339()),
        },
        (BotProfile::Assistant, None) => HealthCheck {
            status: "not_required",
            detail: "assistant profile does not use the price list".to_string(),
        },
        (BotProfile::Wholesale, None) => HealthCheck {
            status: "degraded",
            detail: "price list has not been loaded yet".to_string(),
        },
    }
}
