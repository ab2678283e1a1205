use chrono::{Duration, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::config::MAX_PAGE_SIZE;
use crate::db::queries;
use crate::errors::AppError;
use crate::models::{IntakeEvent, Intent, MessageFilter, MessageStatus};
use crate::state::AppState;

/// Who a staff reply goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Exactly these messages.
    Messages(Vec<i64>),
    /// Every pending message of this intent inside the broadcast window.
    Intent(Intent),
}

impl ReplyTarget {
    /// Explicit ids win over an intent; an empty id list counts as absent.
    pub fn from_request(ids: Option<Vec<i64>>, intent: Option<Intent>) -> Result<Self, AppError> {
        match (ids.filter(|ids| !ids.is_empty()), intent) {
            (Some(ids), _) => Ok(ReplyTarget::Messages(ids)),
            (None, Some(intent)) => Ok(ReplyTarget::Intent(intent)),
            (None, None) => Err(AppError::MissingReplyTarget),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub updated: usize,
    /// Targeted ids as requested, or the pending ids a broadcast selected.
    pub ids: Vec<i64>,
    /// Ids whose status this reply actually changed.
    #[serde(skip)]
    pub handled: Vec<i64>,
}

pub fn dispatch(
    conn: &Connection,
    target: &ReplyTarget,
    reply_text: &str,
    window: Duration,
) -> Result<DispatchOutcome, AppError> {
    let reply_text = reply_text.trim();
    if reply_text.is_empty() {
        return Err(AppError::Validation("reply_text is required".to_string()));
    }

    match target {
        ReplyTarget::Messages(ids) => {
            let handled = queries::update_status(conn, ids, reply_text)?;
            Ok(DispatchOutcome {
                updated: handled.len(),
                ids: ids.clone(),
                handled,
            })
        }
        ReplyTarget::Intent(intent) => {
            queries::store_canned_reply(conn, *intent, reply_text)?;

            let pending = queries::query_messages(
                conn,
                &MessageFilter {
                    intent: Some(*intent),
                    status: Some(MessageStatus::New),
                    since: Some(Utc::now().naive_utc() - window),
                    limit: MAX_PAGE_SIZE,
                },
            )?;
            let ids: Vec<i64> = pending.iter().map(|m| m.id).collect();
            let handled = queries::update_status(conn, &ids, reply_text)?;

            Ok(DispatchOutcome {
                updated: handled.len(),
                ids,
                handled,
            })
        }
    }
}

/// Applies a staff reply and notifies `/events` subscribers about every
/// message it closed.
pub fn send_staff_reply(
    state: &AppState,
    target: &ReplyTarget,
    reply_text: &str,
) -> Result<DispatchOutcome, AppError> {
    let outcome = {
        let db = state.conn()?;
        dispatch(&db, target, reply_text, state.config.broadcast_window())?
    };

    match target {
        ReplyTarget::Messages(_) => {
            tracing::info!(updated = outcome.updated, ids = ?outcome.ids, "staff reply applied to messages");
        }
        ReplyTarget::Intent(intent) => {
            tracing::info!(
                intent = intent.as_str(),
                updated = outcome.updated,
                "staff reply broadcast and cached"
            );
        }
    }

    for id in &outcome.handled {
        state.publish(IntakeEvent::MessageHandled {
            message_id: *id,
            reply: reply_text.trim().to_string(),
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::init_db;
    use crate::models::Slots;
    use crate::services::extractor::SlotExtractor;

    fn window() -> Duration {
        Duration::minutes(10)
    }

    #[test]
    fn test_target_requires_ids_or_intent() {
        assert!(matches!(
            ReplyTarget::from_request(None, None),
            Err(AppError::MissingReplyTarget)
        ));
        assert!(matches!(
            ReplyTarget::from_request(Some(vec![]), None),
            Err(AppError::MissingReplyTarget)
        ));
        assert_eq!(
            ReplyTarget::from_request(Some(vec![1, 2]), Some(Intent::Visa)).unwrap(),
            ReplyTarget::Messages(vec![1, 2])
        );
        assert_eq!(
            ReplyTarget::from_request(Some(vec![]), Some(Intent::Visa)).unwrap(),
            ReplyTarget::Intent(Intent::Visa)
        );
    }

    #[test]
    fn test_targeted_reply_updates_listed_messages() {
        let conn = init_db(":memory:").unwrap();
        let a = queries::insert_message(&conn, None, None, "a", &Slots::default()).unwrap();
        let b = queries::insert_message(&conn, None, None, "b", &Slots::default()).unwrap();

        let outcome = dispatch(&conn, &ReplyTarget::Messages(vec![a, 404]), "مرحباً", window()).unwrap();
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.ids, vec![a, 404]);
        assert_eq!(outcome.handled, vec![a]);

        let untouched = queries::get_message(&conn, b).unwrap().unwrap();
        assert_eq!(untouched.status, MessageStatus::New);

        let canned = queries::list_canned(&conn, None, Utc::now().naive_utc() - window(), 200).unwrap();
        assert!(canned.is_empty());
    }

    #[test]
    fn test_broadcast_closes_pending_messages_of_intent() {
        let conn = init_db(":memory:").unwrap();
        let extractor = SlotExtractor::new();

        let slots = extractor.extract("حجز طيران الى جدة");
        let m1 = queries::insert_message(&conn, Some("+967771234567"), None, "حجز طيران الى جدة", &slots).unwrap();
        let hotel = queries::insert_message(&conn, None, None, "فندق", &extractor.extract("فندق")).unwrap();

        let outcome = dispatch(&conn, &ReplyTarget::Intent(Intent::Booking), "تم الحجز", window()).unwrap();
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.ids, vec![m1]);

        let m1 = queries::get_message(&conn, m1).unwrap().unwrap();
        assert_eq!(m1.status, MessageStatus::Handled);
        assert_eq!(m1.staff_reply.as_deref(), Some("تم الحجز"));

        let hotel = queries::get_message(&conn, hotel).unwrap().unwrap();
        assert_eq!(hotel.status, MessageStatus::New);

        let cached = queries::lookup_recent_canned(&conn, Intent::Booking, window()).unwrap().unwrap();
        assert_eq!(cached.reply_text, "تم الحجز");
    }

    #[test]
    fn test_broadcast_skips_messages_outside_window() {
        let conn = init_db(":memory:").unwrap();
        let old = queries::insert_message(&conn, None, None, "visa", &SlotExtractor::new().extract("visa")).unwrap();
        conn.execute(
            "UPDATE messages SET created_at = datetime('now', '-30 minutes') WHERE id = ?1",
            [old],
        )
        .unwrap();

        let outcome = dispatch(&conn, &ReplyTarget::Intent(Intent::Visa), "see staff", window()).unwrap();
        assert_eq!(outcome.updated, 0);
        assert!(outcome.ids.is_empty());
    }

    #[test]
    fn test_handled_events_cover_only_changed_messages() {
        let state = AppState::new(init_db(":memory:").unwrap(), AppConfig::default());
        let mut events = state.events_tx.subscribe();

        let (pending, closed) = {
            let db = state.conn().unwrap();
            let pending = queries::insert_message(&db, None, None, "a", &Slots::default()).unwrap();
            let closed = queries::insert_message(&db, None, None, "b", &Slots::default()).unwrap();
            queries::update_status(&db, &[closed], "earlier").unwrap();
            (pending, closed)
        };

        let target = ReplyTarget::Messages(vec![pending, closed, 9999]);
        let outcome = send_staff_reply(&state, &target, " تم ").unwrap();
        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.handled, vec![pending]);

        match events.try_recv().unwrap() {
            IntakeEvent::MessageHandled { message_id, reply } => {
                assert_eq!(message_id, pending);
                assert_eq!(reply, "تم");
            }
            other => panic!("expected MessageHandled, got {other:?}"),
        }
        assert!(events.try_recv().is_err());

        let closed = {
            let db = state.conn().unwrap();
            queries::get_message(&db, closed).unwrap().unwrap()
        };
        assert_eq!(closed.staff_reply.as_deref(), Some("earlier"));
    }

    #[test]
    fn test_blank_reply_is_rejected_without_side_effects() {
        let conn = init_db(":memory:").unwrap();
        let err = dispatch(&conn, &ReplyTarget::Intent(Intent::Hotel), "   ", window()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(queries::lookup_recent_canned(&conn, Intent::Hotel, window()).unwrap().is_none());
    }
}
