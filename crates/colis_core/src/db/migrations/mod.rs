//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register base schema migrations in strictly increasing order.
//! - Add columns introduced after a table was first created, in place.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - The additive pass only ever runs `ALTER TABLE ... ADD COLUMN`; it never
//!   drops, renames or rewrites existing data.
//! - Running the whole pipeline on an up-to-date schema is a no-op.

use crate::db::{table_columns, table_exists, DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Column that may be absent from databases created by older builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredColumn {
    pub table: &'static str,
    pub column: &'static str,
    /// Type and constraints used by `ADD COLUMN`; must be nullable or defaulted.
    pub definition: &'static str,
}

const ADDITIVE_COLUMNS: &[DeclaredColumn] = &[
    DeclaredColumn {
        table: "users",
        column: "phone",
        definition: "TEXT",
    },
    DeclaredColumn {
        table: "records",
        column: "modified_at",
        definition: "TEXT",
    },
    DeclaredColumn {
        table: "records",
        column: "status",
        definition: "TEXT",
    },
    DeclaredColumn {
        table: "modification_log",
        column: "details",
        definition: "TEXT",
    },
    DeclaredColumn {
        table: "modification_log",
        column: "modified_at",
        definition: "TEXT",
    },
];

/// Summary of what one migration run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    /// `table.column` entries added by the additive pass.
    pub added_columns: Vec<String>,
}

impl MigrationReport {
    /// Returns whether the run left the schema untouched.
    pub fn is_noop(&self) -> bool {
        self.from_version == self.to_version && self.added_columns.is_empty()
    }
}

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Returns columns the additive pass guarantees after migration.
pub fn declared_columns() -> &'static [DeclaredColumn] {
    ADDITIVE_COLUMNS
}

/// Applies pending versioned migrations, then adds missing declared columns.
///
/// Both steps share one transaction: a failure leaves the file unchanged.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<MigrationReport> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }

    let added_columns = add_missing_columns(&tx)?;
    tx.commit()?;

    let report = MigrationReport {
        from_version: current_version,
        to_version: latest,
        added_columns,
    };
    if !report.is_noop() {
        info!(
            "event=db_migrate module=db status=ok from_version={} to_version={} added_columns={}",
            report.from_version,
            report.to_version,
            report.added_columns.len()
        );
    }
    Ok(report)
}

fn add_missing_columns(conn: &Connection) -> DbResult<Vec<String>> {
    let mut added = Vec::new();
    for declared in ADDITIVE_COLUMNS {
        if !table_exists(conn, declared.table)? {
            continue;
        }
        let existing = table_columns(conn, declared.table)?;
        if existing.iter().any(|name| name == declared.column) {
            continue;
        }

        conn.execute_batch(&format!(
            "ALTER TABLE {} ADD COLUMN {} {};",
            declared.table, declared.column, declared.definition
        ))?;
        added.push(format!("{}.{}", declared.table, declared.column));
    }
    Ok(added)
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
