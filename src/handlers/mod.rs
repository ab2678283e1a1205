pub mod canned;
pub mod events;
pub mod health;
pub mod messages;
pub mod staff;
pub mod webhook;

use chrono::{Duration, NaiveDateTime, Utc};

use crate::errors::AppError;
use crate::models::{Intent, MessageStatus};

/// Query strings send `intent=` for "no filter"; treat blank like absent.
fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_intent_param(value: Option<String>) -> Result<Option<Intent>, AppError> {
    blank_to_none(value)
        .map(|v| Intent::parse(&v).ok_or_else(|| AppError::Validation(format!("unknown intent: {v}"))))
        .transpose()
}

pub(crate) fn parse_status_param(value: Option<String>) -> Result<Option<MessageStatus>, AppError> {
    blank_to_none(value)
        .map(|v| {
            MessageStatus::parse(&v).ok_or_else(|| AppError::Validation(format!("unknown status: {v}")))
        })
        .transpose()
}

/// Start of a `minutes=` lookback window. Values chrono cannot represent are
/// rejected instead of overflowing.
pub(crate) fn window_since(minutes: i64) -> Result<NaiveDateTime, AppError> {
    Duration::try_minutes(minutes)
        .and_then(|window| Utc::now().naive_utc().checked_sub_signed(window))
        .ok_or_else(|| AppError::Validation("minutes out of range".to_string()))
}
