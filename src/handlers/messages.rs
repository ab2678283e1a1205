use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{parse_intent_param, parse_status_param, window_since};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Message, MessageFilter};
use crate::state::AppState;

// GET /messages
#[derive(Deserialize)]
pub struct MessagesQuery {
    pub intent: Option<String>,
    pub status: Option<String>,
    pub minutes: Option<i64>,
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>, AppError> {
    let filter = MessageFilter {
        intent: parse_intent_param(query.intent)?,
        status: parse_status_param(query.status)?,
        since: query.minutes.filter(|m| *m > 0).map(window_since).transpose()?,
        limit: state.config.page_size,
    };

    let messages = {
        let db = state.conn()?;
        queries::query_messages(&db, &filter)?
    };

    Ok(Json(messages))
}

// GET /message/:id
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Message>, AppError> {
    let Path(id) = id.map_err(|e| AppError::Validation(e.body_text()))?;

    let message = {
        let db = state.conn()?;
        queries::get_message(&db, id)?
    };

    message.map(Json).ok_or(AppError::NotFound)
}
