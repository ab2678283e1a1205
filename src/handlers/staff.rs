use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::parse_intent_param;
use crate::errors::AppError;
use crate::services::dispatcher::{self, ReplyTarget};
use crate::state::AppState;

// POST /staff/reply
#[derive(Deserialize)]
pub struct StaffReplyRequest {
    pub message_ids: Option<Vec<i64>>,
    pub intent: Option<String>,
    #[serde(default)]
    pub reply_text: String,
}

#[derive(Serialize)]
pub struct StaffReplyResponse {
    pub status: &'static str,
    pub updated: usize,
    pub ids: Vec<i64>,
}

pub async fn send_reply(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StaffReplyRequest>, JsonRejection>,
) -> Result<Json<StaffReplyResponse>, AppError> {
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    let target = ReplyTarget::from_request(body.message_ids, parse_intent_param(body.intent)?)?;
    let outcome = dispatcher::send_staff_reply(&state, &target, &body.reply_text)?;

    Ok(Json(StaffReplyResponse {
        status: "ok",
        updated: outcome.updated,
        ids: outcome.ids,
    }))
}
