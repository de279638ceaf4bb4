//! Modification log persistence.
//!
//! # Responsibility
//! - Append one log row per record mutation, inside the caller's transaction.
//! - Read per-record history, newest first.
//!
//! # Invariants
//! - `append_entry` never opens or commits a transaction of its own, so its
//!   failure aborts the enclosing update.
//! - History rows are returned even when their record was deleted.

use crate::model::audit::{LogEntryId, ModificationLogEntry, ModificationSummary};
use crate::model::record::RecordId;
use crate::model::timestamp::{format_timestamp, parse_timestamp, Timestamp};
use crate::repo::schema::{ensure_connection_ready, MODIFICATION_LOG_COLUMNS};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const LOG_SELECT_SQL: &str = "SELECT
    id,
    record_id,
    action_type,
    details,
    modified_at
FROM modification_log";

/// Writes one log row stamped with `at`.
///
/// `conn` is normally a `Transaction` deref; the row becomes visible only
/// when that transaction commits.
pub fn append_entry(
    conn: &Connection,
    record_id: RecordId,
    action_type: &str,
    details: Option<&str>,
    at: &Timestamp,
) -> RepoResult<LogEntryId> {
    conn.execute(
        "INSERT INTO modification_log (
            record_id,
            action_type,
            details,
            modified_at
        ) VALUES (?1, ?2, ?3, ?4);",
        params![record_id, action_type, details, format_timestamp(at)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Read access to the modification log.
pub trait AuditRepository {
    /// Full log rows for one record, newest first.
    fn entries_for(&self, record_id: RecordId) -> RepoResult<Vec<ModificationLogEntry>>;

    /// `(action_type, modified_at)` pairs for one record, newest first.
    fn history(&self, record_id: RecordId) -> RepoResult<Vec<ModificationSummary>> {
        Ok(self
            .entries_for(record_id)?
            .into_iter()
            .map(ModificationSummary::from)
            .collect())
    }
}

/// SQLite-backed modification log reader.
pub struct SqliteAuditRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("modification_log", MODIFICATION_LOG_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl AuditRepository for SqliteAuditRepository<'_> {
    fn entries_for(&self, record_id: RecordId) -> RepoResult<Vec<ModificationLogEntry>> {
        load_entries(self.conn, record_id)
    }
}

pub(crate) fn load_entries(
    conn: &Connection,
    record_id: RecordId,
) -> RepoResult<Vec<ModificationLogEntry>> {
    let mut stmt = conn.prepare(&format!(
        "{LOG_SELECT_SQL}
         WHERE record_id = ?1
         ORDER BY modified_at DESC, id DESC;"
    ))?;
    let mut rows = stmt.query([record_id])?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(parse_log_row(row)?);
    }
    Ok(entries)
}

fn parse_log_row(row: &Row<'_>) -> RepoResult<ModificationLogEntry> {
    let modified_at = match row.get::<_, Option<String>>("modified_at")? {
        Some(text) => Some(parse_timestamp(&text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid timestamp `{text}` in modification_log.modified_at"
            ))
        })?),
        None => None,
    };

    Ok(ModificationLogEntry {
        id: row.get("id")?,
        record_id: row.get("record_id")?,
        action_type: row
            .get::<_, Option<String>>("action_type")?
            .unwrap_or_default(),
        details: row.get("details")?,
        modified_at,
    })
}
