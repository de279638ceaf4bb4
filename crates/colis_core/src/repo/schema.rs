//! Connection readiness checks run when a repository is constructed.

use crate::db::migrations::latest_version;
use crate::db::{table_columns, table_exists};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Connection;

pub(crate) const USERS_COLUMNS: &[&str] = &["id", "username", "password", "phone"];

pub(crate) const RECORDS_COLUMNS: &[&str] = &[
    "id",
    "name_exp",
    "city_exp",
    "phone_exp",
    "name_dest",
    "phone_dest",
    "city_dest",
    "nmbr_package",
    "gender_package",
    "value_package",
    "kilos",
    "price",
    "created_at",
    "modified_at",
    "status",
];

pub(crate) const MODIFICATION_LOG_COLUMNS: &[&str] =
    &["id", "record_id", "action_type", "details", "modified_at"];

/// Verifies schema version, then each `(table, columns)` requirement.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    requirements: &[(&'static str, &'static [&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in requirements {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        let existing = table_columns(conn, table)?;
        for &column in columns {
            if !existing.iter().any(|name| name.as_str() == column) {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}
