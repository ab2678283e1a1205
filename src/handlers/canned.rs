use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::{parse_intent_param, window_since};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::CannedReply;
use crate::state::AppState;

// GET /canned
#[derive(Deserialize)]
pub struct CannedQuery {
    pub intent: Option<String>,
    pub minutes: Option<i64>,
}

pub async fn list_canned(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CannedQuery>,
) -> Result<Json<Vec<CannedReply>>, AppError> {
    let intent = parse_intent_param(query.intent)?;
    let since = match query.minutes.filter(|m| *m > 0) {
        Some(minutes) => window_since(minutes)?,
        None => Utc::now().naive_utc() - state.config.broadcast_window(),
    };

    let replies = {
        let db = state.conn()?;
        queries::list_canned(&db, intent, since, state.config.page_size)?
    };

    Ok(Json(replies))
}
