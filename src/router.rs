use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/webhook", post(handlers::webhook::receive_message))
        .route("/messages", get(handlers::messages::list_messages))
        .route("/message/:id", get(handlers::messages::get_message))
        .route("/staff/reply", post(handlers::staff::send_reply))
        .route("/canned", get(handlers::canned::list_canned))
        .route("/events", get(handlers::events::events_stream))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
