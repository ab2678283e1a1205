use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Intent, Service};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub phone: Option<String>,
    pub display_name: Option<String>,
    pub raw_text: String,
    pub intent: Intent,
    pub service: Option<Service>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub status: MessageStatus,
    pub staff_reply: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    New,
    Handled,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::New => "new",
            MessageStatus::Handled => "handled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "new" => Some(MessageStatus::New),
            "handled" => Some(MessageStatus::Handled),
            _ => None,
        }
    }
}

/// Query constraints for listing messages. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub intent: Option<Intent>,
    pub status: Option<MessageStatus>,
    pub since: Option<NaiveDateTime>,
    pub limit: i64,
}
