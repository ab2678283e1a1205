use std::collections::BTreeSet;

use chrono::{Duration, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::config::MAX_PAGE_SIZE;
use crate::models::{CannedReply, Intent, Message, MessageFilter, MessageStatus, Service, Slots};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MESSAGE_COLUMNS: &str = "id, phone, display_name, raw_text, intent, service, destination, travel_date, \
     adults, children, infants, status, staff_reply, created_at";

fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

fn window_start(window: Duration) -> NaiveDateTime {
    Utc::now().naive_utc() - window
}

// ── Messages ──

pub fn insert_message(
    conn: &Connection,
    phone: Option<&str>,
    display_name: Option<&str>,
    raw_text: &str,
    slots: &Slots,
) -> anyhow::Result<i64> {
    let created_at = format_ts(&Utc::now().naive_utc());

    conn.execute(
        "INSERT INTO messages (phone, display_name, raw_text, intent, service, destination, travel_date,
                               adults, children, infants, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 'new', ?11)",
        params![
            phone,
            display_name,
            raw_text,
            slots.intent.as_str(),
            slots.service.map(|s| s.as_str()),
            slots.destination,
            slots.date,
            slots.adults,
            slots.children,
            slots.infants,
            created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_message(conn: &Connection, id: i64) -> anyhow::Result<Option<Message>> {
    let result = conn.query_row(
        &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
        params![id],
        parse_message_row,
    );

    match result {
        Ok(message) => Ok(Some(message)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Newest first. The limit is clamped to `1..=MAX_PAGE_SIZE`.
pub fn query_messages(conn: &Connection, filter: &MessageFilter) -> anyhow::Result<Vec<Message>> {
    let mut sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE 1 = 1");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![];

    if let Some(intent) = filter.intent {
        params_vec.push(Box::new(intent.as_str()));
        sql.push_str(&format!(" AND intent = ?{}", params_vec.len()));
    }
    if let Some(status) = filter.status {
        params_vec.push(Box::new(status.as_str()));
        sql.push_str(&format!(" AND status = ?{}", params_vec.len()));
    }
    if let Some(since) = filter.since {
        params_vec.push(Box::new(format_ts(&since)));
        sql.push_str(&format!(" AND created_at >= ?{}", params_vec.len()));
    }

    params_vec.push(Box::new(filter.limit.clamp(1, MAX_PAGE_SIZE)));
    sql.push_str(&format!(
        " ORDER BY created_at DESC, id DESC LIMIT ?{}",
        params_vec.len()
    ));

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), parse_message_row)?;

    let mut messages = vec![];
    for row in rows {
        messages.push(row?);
    }
    Ok(messages)
}

/// Marks every listed message that is still `new` as handled with `reply_text`.
/// Unknown or already handled ids are skipped. Runs as one transaction and
/// returns how many rows actually changed.
/// Marks pending messages handled and returns the ids that actually changed,
/// in ascending order. Unknown and already-handled ids are skipped.
pub fn update_status(conn: &Connection, ids: &[i64], reply_text: &str) -> anyhow::Result<Vec<i64>> {
    let unique: BTreeSet<i64> = ids.iter().copied().collect();

    let tx = conn.unchecked_transaction()?;
    let mut changed = Vec::new();
    {
        let mut stmt = tx.prepare(
            "UPDATE messages SET status = 'handled', staff_reply = ?1 WHERE id = ?2 AND status = 'new'",
        )?;
        for id in &unique {
            if stmt.execute(params![reply_text, id])? > 0 {
                changed.push(*id);
            }
        }
    }
    tx.commit()?;

    Ok(changed)
}

fn parse_message_row(row: &rusqlite::Row) -> rusqlite::Result<Message> {
    let intent_str: String = row.get(4)?;
    let service_str: Option<String> = row.get(5)?;
    let status_str: String = row.get(11)?;
    let created_at_str: String = row.get(13)?;

    Ok(Message {
        id: row.get(0)?,
        phone: row.get(1)?,
        display_name: row.get(2)?,
        raw_text: row.get(3)?,
        intent: Intent::parse(&intent_str).unwrap_or(Intent::Inquiry),
        service: service_str.as_deref().and_then(Service::parse),
        destination: row.get(6)?,
        date: row.get(7)?,
        adults: row.get(8)?,
        children: row.get(9)?,
        infants: row.get(10)?,
        status: MessageStatus::parse(&status_str).unwrap_or(MessageStatus::New),
        staff_reply: row.get(12)?,
        created_at: parse_ts(&created_at_str),
    })
}

// ── Canned Replies ──

pub fn store_canned_reply(conn: &Connection, intent: Intent, reply_text: &str) -> anyhow::Result<i64> {
    let created_at = format_ts(&Utc::now().naive_utc());
    conn.execute(
        "INSERT INTO canned_replies (intent, reply_text, created_at) VALUES (?1, ?2, ?3)",
        params![intent.as_str(), reply_text, created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The newest canned reply for `intent` created within `window` of now.
pub fn lookup_recent_canned(
    conn: &Connection,
    intent: Intent,
    window: Duration,
) -> anyhow::Result<Option<CannedReply>> {
    let since = format_ts(&window_start(window));
    let result = conn.query_row(
        "SELECT id, intent, reply_text, created_at FROM canned_replies
         WHERE intent = ?1 AND created_at >= ?2
         ORDER BY created_at DESC, id DESC LIMIT 1",
        params![intent.as_str(), since],
        parse_canned_row,
    );

    match result {
        Ok(reply) => Ok(Some(reply)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_canned(
    conn: &Connection,
    intent: Option<Intent>,
    since: NaiveDateTime,
    limit: i64,
) -> anyhow::Result<Vec<CannedReply>> {
    let since = format_ts(&since);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);

    let mut stmt = conn.prepare(
        "SELECT id, intent, reply_text, created_at FROM canned_replies
         WHERE (?1 IS NULL OR intent = ?1) AND created_at >= ?2
         ORDER BY created_at DESC, id DESC LIMIT ?3",
    )?;
    let rows = stmt.query_map(
        params![intent.map(|i| i.as_str()), since, limit],
        parse_canned_row,
    )?;

    let mut replies = vec![];
    for row in rows {
        replies.push(row?);
    }
    Ok(replies)
}

fn parse_canned_row(row: &rusqlite::Row) -> rusqlite::Result<CannedReply> {
    let intent_str: String = row.get(1)?;
    let created_at_str: String = row.get(3)?;

    Ok(CannedReply {
        id: row.get(0)?,
        intent: Intent::parse(&intent_str).unwrap_or(Intent::Inquiry),
        reply_text: row.get(2)?,
        created_at: parse_ts(&created_at_str),
    })
}
