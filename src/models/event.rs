use serde::Serialize;

use super::Intent;

/// Pushed to `/events` subscribers as messages arrive and get answered.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntakeEvent {
    MessageReceived {
        message_id: i64,
        intent: Intent,
        phone: Option<String>,
    },
    MessageHandled {
        message_id: i64,
        reply: String,
    },
}

impl IntakeEvent {
    pub fn name(&self) -> &'static str {
        match self {
            IntakeEvent::MessageReceived { .. } => "message_received",
            IntakeEvent::MessageHandled { .. } => "message_handled",
        }
    }
}
