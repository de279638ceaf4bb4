//! Modification log model.
//!
//! # Invariants
//! - Entries are append-only; nothing updates or deletes them.
//! - `record_id` is a logical reference and may outlive its record.

use crate::model::record::RecordId;
use crate::model::timestamp::Timestamp;
use serde::Serialize;

/// Action type written for record updates.
pub const ACTION_MODIFICATION: &str = "MODIFICATION";

/// SQLite row id of a log entry.
pub type LogEntryId = i64;

/// One row of `modification_log`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModificationLogEntry {
    pub id: LogEntryId,
    pub record_id: RecordId,
    pub action_type: String,
    pub details: Option<String>,
    /// `None` only for rows written by earlier builds.
    pub modified_at: Option<Timestamp>,
}

/// History line shown per record: what happened and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModificationSummary {
    pub action_type: String,
    pub modified_at: Option<Timestamp>,
}

impl From<ModificationLogEntry> for ModificationSummary {
    fn from(value: ModificationLogEntry) -> Self {
        Self {
            action_type: value.action_type,
            modified_at: value.modified_at,
        }
    }
}
