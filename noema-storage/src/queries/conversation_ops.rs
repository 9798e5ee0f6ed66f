//! Conversation, user, and feedback rows.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};

use noema_core::errors::{NoemaResult, StorageError};
use noema_core::models::{Conversation, Feedback, FeedbackKind, User};

use crate::pool::sqlite_err;

use super::{in_placeholders, parse_json, parse_ts};

type RawConversationRow = (
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    String,
);

fn read_conversation_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawConversationRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn to_conversation(raw: RawConversationRow) -> NoemaResult<Conversation> {
    let (id, domain_id, user_id, messages, metadata, created_at, updated_at) = raw;
    Ok(Conversation {
        id,
        domain_id,
        user_id,
        messages: parse_json(&messages)?,
        metadata: parse_json(&metadata)?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
    })
}

pub fn insert_conversation(conn: &Connection, conversation: &Conversation) -> NoemaResult<()> {
    conn.execute(
        "INSERT INTO conversations (id, domain_id, user_id, messages, metadata, created_at,
         updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            conversation.id,
            conversation.domain_id,
            conversation.user_id,
            conversation.messages.to_string(),
            conversation.metadata.to_string(),
            conversation.created_at.to_rfc3339(),
            conversation.updated_at.to_rfc3339(),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn conversations_by_ids(conn: &Connection, ids: &[String]) -> NoemaResult<Vec<Conversation>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id, domain_id, user_id, messages, metadata, created_at, updated_at
         FROM conversations WHERE id IN ({})",
        in_placeholders(ids.len())
    );
    let mut stmt = conn.prepare(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), read_conversation_row)
        .map_err(sqlite_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_err)?;
    rows.into_iter().map(to_conversation).collect()
}

// --- Users ---

pub fn insert_user(conn: &Connection, user: &User) -> NoemaResult<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            user.id,
            user.name,
            user.email,
            user.created_at.to_rfc3339()
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> NoemaResult<Option<User>> {
    let raw: Option<(String, String, String, String)> = conn
        .query_row(
            "SELECT id, name, email, created_at FROM users WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()
        .map_err(sqlite_err)?;
    raw.map(|(id, name, email, created_at)| {
        Ok(User {
            id,
            name,
            email,
            created_at: parse_ts(&created_at)?,
        })
    })
    .transpose()
}

// --- Feedback ---

pub fn insert_feedback(conn: &Connection, feedback: &Feedback) -> NoemaResult<()> {
    conn.execute(
        "INSERT INTO feedback (id, query_id, user_id, kind, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            feedback.id,
            feedback.query_id,
            feedback.user_id,
            feedback.kind.as_str(),
            feedback.rating,
            feedback.comment,
            feedback.created_at.to_rfc3339(),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn feedback_by_query(conn: &Connection, query_id: &str) -> NoemaResult<Vec<Feedback>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, query_id, user_id, kind, rating, comment, created_at
             FROM feedback WHERE query_id = ?1 ORDER BY created_at",
        )
        .map_err(sqlite_err)?;
    type RawFeedbackRow = (
        String,
        String,
        Option<String>,
        String,
        Option<i32>,
        Option<String>,
        String,
    );
    let rows = stmt
        .query_map(params![query_id], |row| {
            Ok::<RawFeedbackRow, _>((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })
        .map_err(sqlite_err)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(sqlite_err)?;
    rows.into_iter()
        .map(|(id, query_id, user_id, kind, rating, comment, created_at)| {
            Ok(Feedback {
                id,
                query_id,
                user_id,
                kind: FeedbackKind::parse(&kind).ok_or_else(|| StorageError::Serialization {
                    message: format!("unknown feedback kind {kind:?}"),
                })?,
                rating,
                comment,
                created_at: parse_ts(&created_at)?,
            })
        })
        .collect()
}
