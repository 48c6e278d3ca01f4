use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Router, middleware};
use shared::dictionaries::DictionaryLoadReport;
use shared::session_store::SessionStore;

mod chat;
mod errors;
mod health;
mod observability;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub dictionary_report: Arc<DictionaryLoadReport>,
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/v1/chat", post(chat::chat))
        .route_layer(middleware::from_fn(
            observability::request_observability_middleware,
        ))
        .with_state(app_state)
}
