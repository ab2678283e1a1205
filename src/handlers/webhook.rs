use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::Slots;
use crate::services::ingest::{self, InboundMessage, IngestOutcome};
use crate::state::AppState;

/// `phone` and `text` are accepted as alternate keys. When a body carries
/// both spellings, `from_number` and `message` take precedence.
#[derive(Deserialize)]
pub struct WebhookPayload {
    pub from_number: Option<String>,
    pub phone: Option<String>,
    pub display_name: Option<String>,
    pub message: Option<String>,
    pub text: Option<String>,
}

fn first_non_blank(primary: Option<String>, alternate: Option<String>) -> Option<String> {
    primary
        .filter(|v| !v.trim().is_empty())
        .or(alternate.filter(|v| !v.trim().is_empty()))
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<&'static str>,
    pub parsed: Slots,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

impl From<IngestOutcome> for WebhookResponse {
    fn from(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::AutoReplied {
                message_id,
                slots,
                reply,
            } => WebhookResponse {
                status: "auto-replied",
                message_id,
                next: None,
                parsed: slots,
                reply: Some(reply),
            },
            IngestOutcome::Received {
                message_id,
                slots,
                next,
            } => WebhookResponse {
                status: "received",
                message_id,
                next: Some(next),
                parsed: slots,
                reply: None,
            },
        }
    }
}

// POST /webhook
pub async fn receive_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> Result<Json<WebhookResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let text = first_non_blank(payload.message, payload.text)
        .ok_or_else(|| AppError::Validation("message text is required".to_string()))?;
    let phone = first_non_blank(payload.from_number, payload.phone);

    tracing::info!(from = phone.as_deref().unwrap_or(""), "incoming message");

    let inbound = InboundMessage {
        phone,
        display_name: payload.display_name,
        text,
    };

    let outcome = ingest::process_inbound(&state, &inbound)?;
    Ok(Json(outcome.into()))
}
