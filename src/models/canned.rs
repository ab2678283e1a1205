use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Intent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedReply {
    pub id: i64,
    pub intent: Intent,
    pub reply_text: String,
    pub created_at: NaiveDateTime,
}
