//! Shipment record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and search over the `records` table.
//! - Couple every update with exactly one modification log entry.
//!
//! # Invariants
//! - Write paths call `ShipmentDetails::validate()` before SQL mutations.
//! - Update and its log append commit together or not at all.
//! - Delete is a hard delete and leaves log rows in place.
//! - Lists are ordered by `id DESC` (most recent first).

use crate::model::audit::{ModificationSummary, ACTION_MODIFICATION};
use crate::model::record::{RecordId, ShipmentDetails, ShipmentRecord, STATUS_MODIFIED};
use crate::model::timestamp::{self, format_timestamp, parse_timestamp, Timestamp};
use crate::repo::audit_repo::{append_entry, load_entries};
use crate::repo::schema::{ensure_connection_ready, MODIFICATION_LOG_COLUMNS, RECORDS_COLUMNS};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    name_exp,
    city_exp,
    phone_exp,
    name_dest,
    phone_dest,
    city_dest,
    nmbr_package,
    gender_package,
    value_package,
    kilos,
    price,
    created_at,
    modified_at,
    status
FROM records";

/// Repository interface for shipment records.
pub trait RecordRepository {
    /// Inserts a record stamped with the current time and returns its id.
    fn insert_record(&self, details: &ShipmentDetails) -> RepoResult<RecordId>;
    fn get_record(&self, id: RecordId) -> RepoResult<Option<ShipmentRecord>>;
    fn list_records(&self) -> RepoResult<Vec<ShipmentRecord>>;
    /// Case-insensitive substring match on id or sender name.
    fn search_records(&self, text: &str) -> RepoResult<Vec<ShipmentRecord>>;
    /// Replaces editable fields, stamps the record and appends a log entry.
    fn update_record(&self, id: RecordId, details: &ShipmentDetails) -> RepoResult<Timestamp>;
    /// Hard-deletes one record; `NotFound` when no row matched.
    fn delete_record(&self, id: RecordId) -> RepoResult<()>;
    /// `(action_type, modified_at)` for one record, newest first.
    fn modification_history(&self, id: RecordId) -> RepoResult<Vec<ModificationSummary>>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                ("records", RECORDS_COLUMNS),
                ("modification_log", MODIFICATION_LOG_COLUMNS),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn insert_record(&self, details: &ShipmentDetails) -> RepoResult<RecordId> {
        details.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO records (
                name_exp,
                city_exp,
                phone_exp,
                name_dest,
                phone_dest,
                city_dest,
                nmbr_package,
                gender_package,
                value_package,
                kilos,
                price,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            params![
                details.name_exp.trim(),
                details.city_exp.trim(),
                details.phone_exp.trim(),
                details.name_dest.trim(),
                details.phone_dest.trim(),
                details.city_dest.trim(),
                details.nmbr_package,
                details.gender_package.trim(),
                details.value_package,
                details.kilos,
                details.price,
                format_timestamp(&timestamp::now()),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(id)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<ShipmentRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn list_records(&self) -> RepoResult<Vec<ShipmentRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} ORDER BY id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn search_records(&self, text: &str) -> RepoResult<Vec<ShipmentRecord>> {
        let pattern = format!("%{}%", escape_like(text));
        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL}
             WHERE CAST(id AS TEXT) LIKE ?1 ESCAPE '\\'
                OR name_exp LIKE ?1 ESCAPE '\\'
             ORDER BY id DESC;"
        ))?;
        let mut rows = stmt.query([pattern.as_str()])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row(row)?);
        }

        Ok(records)
    }

    fn update_record(&self, id: RecordId, details: &ShipmentDetails) -> RepoResult<Timestamp> {
        details.validate()?;

        let stamp = timestamp::now();
        let stamp_text = format_timestamp(&stamp);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE records
             SET
                name_exp = ?2,
                city_exp = ?3,
                phone_exp = ?4,
                name_dest = ?5,
                phone_dest = ?6,
                city_dest = ?7,
                nmbr_package = ?8,
                gender_package = ?9,
                value_package = ?10,
                kilos = ?11,
                price = ?12,
                modified_at = ?13,
                status = ?14
             WHERE id = ?1;",
            params![
                id,
                details.name_exp.trim(),
                details.city_exp.trim(),
                details.phone_exp.trim(),
                details.name_dest.trim(),
                details.phone_dest.trim(),
                details.city_dest.trim(),
                details.nmbr_package,
                details.gender_package.trim(),
                details.value_package,
                details.kilos,
                details.price,
                stamp_text.as_str(),
                STATUS_MODIFIED,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        let note = format!("Modifié par l'utilisateur - {stamp_text}");
        append_entry(&tx, id, ACTION_MODIFICATION, Some(note.as_str()), &stamp)?;
        tx.commit()?;

        Ok(stamp)
    }

    fn delete_record(&self, id: RecordId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM records WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;

        Ok(())
    }

    fn modification_history(&self, id: RecordId) -> RepoResult<Vec<ModificationSummary>> {
        Ok(load_entries(self.conn, id)?
            .into_iter()
            .map(ModificationSummary::from)
            .collect())
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<ShipmentRecord> {
    let created_text: String = row.get("created_at")?;
    let created_at = parse_timestamp(&created_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{created_text}` in records.created_at"
        ))
    })?;

    let modified_at = match row.get::<_, Option<String>>("modified_at")? {
        Some(text) => Some(parse_timestamp(&text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid timestamp `{text}` in records.modified_at"))
        })?),
        None => None,
    };

    Ok(ShipmentRecord {
        id: row.get("id")?,
        details: ShipmentDetails {
            name_exp: row.get("name_exp")?,
            city_exp: row.get("city_exp")?,
            phone_exp: row.get("phone_exp")?,
            name_dest: row.get("name_dest")?,
            phone_dest: row.get("phone_dest")?,
            city_dest: row.get("city_dest")?,
            nmbr_package: row.get("nmbr_package")?,
            gender_package: row.get("gender_package")?,
            value_package: row.get("value_package")?,
            kilos: row.get("kilos")?,
            price: row.get("price")?,
        },
        created_at,
        modified_at,
        status: row.get("status")?,
    })
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
