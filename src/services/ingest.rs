use crate::db::queries;
use crate::errors::AppError;
use crate::models::{IntakeEvent, Slots};
use crate::services::extractor::extract_name;
use crate::services::prompt::next_prompt;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub phone: Option<String>,
    pub display_name: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// A fresh canned reply for the intent closed the message on arrival.
    AutoReplied {
        message_id: i64,
        slots: Slots,
        reply: String,
    },
    /// Stored as pending; `next` is the clarifying question for the sender.
    Received {
        message_id: i64,
        slots: Slots,
        next: &'static str,
    },
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn process_inbound(state: &AppState, inbound: &InboundMessage) -> Result<IngestOutcome, AppError> {
    let text = inbound.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("message text is required".to_string()));
    }

    let phone = non_blank(inbound.phone.as_deref());
    let display_name = non_blank(inbound.display_name.as_deref()).or_else(|| extract_name(text));
    let slots = state.extractor.extract(text);

    // Insert and the canned-reply check share one lock acquisition; a
    // concurrent broadcast either sees this row or does not, and
    // update_status only ever touches pending rows.
    let (message_id, auto_reply) = {
        let db = state.conn()?;
        let message_id =
            queries::insert_message(&db, phone.as_deref(), display_name.as_deref(), text, &slots)?;

        let auto_reply =
            match queries::lookup_recent_canned(&db, slots.intent, state.config.broadcast_window())? {
                Some(canned) => {
                    let handled = queries::update_status(&db, &[message_id], &canned.reply_text)?;
                    (!handled.is_empty()).then_some(canned.reply_text)
                }
                None => None,
            };

        (message_id, auto_reply)
    };

    tracing::info!(
        message_id,
        intent = slots.intent.as_str(),
        destination = slots.destination.as_deref().unwrap_or(""),
        auto_replied = auto_reply.is_some(),
        "inbound message stored"
    );

    state.publish(IntakeEvent::MessageReceived {
        message_id,
        intent: slots.intent,
        phone,
    });

    match auto_reply {
        Some(reply) => {
            state.publish(IntakeEvent::MessageHandled {
                message_id,
                reply: reply.clone(),
            });
            Ok(IngestOutcome::AutoReplied {
                message_id,
                slots,
                reply,
            })
        }
        None => Ok(IngestOutcome::Received {
            message_id,
            next: next_prompt(&slots),
            slots,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::init_db;
    use crate::models::{Intent, MessageStatus};
    use crate::services::prompt::{ASK_DATE, SERVICE_MENU};

    fn test_state() -> AppState {
        AppState::new(init_db(":memory:").unwrap(), AppConfig::default())
    }

    fn inbound(text: &str) -> InboundMessage {
        InboundMessage {
            phone: Some("+967771234567".to_string()),
            display_name: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_new_message_gets_next_prompt() {
        let state = test_state();
        let outcome = process_inbound(&state, &inbound("حجز طيران الى جدة")).unwrap();

        match outcome {
            IngestOutcome::Received { message_id, slots, next } => {
                assert_eq!(slots.intent, Intent::Booking);
                assert_eq!(next, ASK_DATE);
                let db = state.conn().unwrap();
                let msg = queries::get_message(&db, message_id).unwrap().unwrap();
                assert_eq!(msg.status, MessageStatus::New);
                assert_eq!(msg.phone.as_deref(), Some("+967771234567"));
            }
            other => panic!("expected Received, got {other:?}"),
        }
    }

    #[test]
    fn test_fresh_canned_reply_is_applied_on_arrival() {
        let state = test_state();
        {
            let db = state.conn().unwrap();
            queries::store_canned_reply(&db, Intent::Inquiry, "اهلا بك").unwrap();
        }

        match process_inbound(&state, &inbound("السلام عليكم")).unwrap() {
            IngestOutcome::AutoReplied { message_id, reply, .. } => {
                assert_eq!(reply, "اهلا بك");
                let db = state.conn().unwrap();
                let msg = queries::get_message(&db, message_id).unwrap().unwrap();
                assert_eq!(msg.status, MessageStatus::Handled);
                assert_eq!(msg.staff_reply.as_deref(), Some("اهلا بك"));
            }
            other => panic!("expected AutoReplied, got {other:?}"),
        }
    }

    #[test]
    fn test_stale_canned_reply_is_ignored() {
        let state = test_state();
        {
            let db = state.conn().unwrap();
            let id = queries::store_canned_reply(&db, Intent::Inquiry, "old").unwrap();
            db.execute(
                "UPDATE canned_replies SET created_at = datetime('now', '-11 minutes') WHERE id = ?1",
                [id],
            )
            .unwrap();
        }

        match process_inbound(&state, &inbound("hello")).unwrap() {
            IngestOutcome::Received { next, .. } => assert_eq!(next, SERVICE_MENU),
            other => panic!("expected Received, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_text_is_rejected_before_storage() {
        let state = test_state();
        let err = process_inbound(&state, &inbound("  ")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let db = state.conn().unwrap();
        let count: i64 = db
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_display_name_falls_back_to_self_introduction() {
        let state = test_state();
        let outcome = process_inbound(&state, &inbound("My name is Sara. Trip to Riyadh 05/01")).unwrap();
        let message_id = match outcome {
            IngestOutcome::Received { message_id, .. } => message_id,
            IngestOutcome::AutoReplied { message_id, .. } => message_id,
        };

        let db = state.conn().unwrap();
        let msg = queries::get_message(&db, message_id).unwrap().unwrap();
        assert_eq!(msg.display_name.as_deref(), Some("Sara"));
        assert_eq!(msg.destination.as_deref(), Some("riyadh"));
        assert_eq!(msg.date.as_deref(), Some("05/01"));
    }
}
