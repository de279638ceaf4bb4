//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose account, record, label and history use-cases to Dart via FRB.
//! - Flatten core results into plain response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every envelope carries `ok` and a human-readable `message`.
//! - Timestamps cross the boundary as RFC 3339 strings.

use colis_core::db::open_db;
use colis_core::label::{parse_label, ScannedPayload};
use colis_core::model::timestamp::format_timestamp;
use colis_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, AuthService,
    ModificationSummary, RecordFields, RecordService, ShipmentRecord, SqliteRecordRepository,
    SqliteUserRepository,
};
use log::warn;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

const ENTRY_DB_FILE_NAME: &str = "colis_entry.sqlite3";
const DB_PATH_ENV: &str = "COLIS_DB_PATH";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Shipment record projection for the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordItem {
    pub id: i64,
    pub name_exp: String,
    pub city_exp: String,
    pub phone_exp: String,
    pub name_dest: String,
    pub phone_dest: String,
    pub city_dest: String,
    pub nmbr_package: i64,
    pub gender_package: String,
    pub value_package: f64,
    pub kilos: f64,
    pub price: f64,
    pub created_at: String,
    pub modified_at: Option<String>,
    /// `Some("Modifié")` once the record was edited.
    pub status: Option<String>,
}

/// Single-record response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordResponse {
    pub ok: bool,
    pub record: Option<RecordItem>,
    pub message: String,
}

/// Record list response envelope for list and search.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordListResponse {
    pub ok: bool,
    /// Most recent first.
    pub items: Vec<RecordItem>,
    pub message: String,
}

/// One history line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub action_type: String,
    pub modified_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryResponse {
    pub ok: bool,
    /// Newest first.
    pub items: Vec<HistoryItem>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub record_id: Option<i64>,
    pub message: String,
}

/// Signup/login response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub ok: bool,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    pub message: String,
}

/// QR payload text for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelResponse {
    pub ok: bool,
    pub payload: Option<String>,
    pub message: String,
}

/// Parsed QR scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResponse {
    pub ok: bool,
    /// `shipment`, `text`, or empty on failure.
    pub kind: String,
    pub record_id: Option<i64>,
    pub tracking_code: Option<String>,
    /// Record field map keyed like the edit form; empty for text payloads.
    pub fields: HashMap<String, String>,
    pub raw: Option<String>,
    pub message: String,
}

impl RecordResponse {
    fn success(message: impl Into<String>, record: &ShipmentRecord) -> Self {
        Self {
            ok: true,
            record: Some(to_record_item(record)),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record: None,
            message: message.into(),
        }
    }
}

impl RecordListResponse {
    fn from_result(operation: &str, result: Result<Vec<ShipmentRecord>, String>) -> Self {
        match result {
            Ok(records) => {
                let items = records.iter().map(to_record_item).collect::<Vec<_>>();
                let message = if items.is_empty() {
                    "No records.".to_string()
                } else {
                    format!("Found {} record(s).", items.len())
                };
                Self {
                    ok: true,
                    items,
                    message,
                }
            }
            Err(err) => Self {
                ok: false,
                items: Vec::new(),
                message: format!("{operation} failed: {err}"),
            },
        }
    }
}

impl AuthResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            user_id: None,
            username: None,
            message: message.into(),
        }
    }
}

/// Creates an account from the signup form.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_sign_up(username: String, password: String, confirm_password: String) -> AuthResponse {
    match with_auth_service(|service| {
        service
            .sign_up(&username, &password, &confirm_password)
            .map_err(|err| err.to_string())
    }) {
        Ok(user_id) => AuthResponse {
            ok: true,
            user_id: Some(user_id),
            username: Some(username),
            message: "Account created.".to_string(),
        },
        Err(err) => AuthResponse::failure(format!("auth_sign_up failed: {err}")),
    }
}

/// Checks credentials from the login form.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; the password is never echoed back.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_log_in(username: String, password: String) -> AuthResponse {
    match with_auth_service(|service| {
        service
            .log_in(&username, &password)
            .map_err(|err| err.to_string())
    }) {
        Ok(user) => AuthResponse {
            ok: true,
            user_id: Some(user.id),
            username: Some(user.username),
            message: "Logged in.".to_string(),
        },
        Err(err) => AuthResponse::failure(format!("auth_log_in failed: {err}")),
    }
}

/// Validates a form field map and stores it as a new record.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; validation failures come back with `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn record_create(fields: HashMap<String, String>) -> RecordResponse {
    let fields = fields.into_iter().collect::<RecordFields>();
    match with_record_service(|service| {
        service
            .create_record(&fields)
            .map_err(|err| err.to_string())
    }) {
        Ok(record) => RecordResponse::success("Record created.", &record),
        Err(err) => RecordResponse::failure(format!("record_create failed: {err}")),
    }
}

/// Loads one record; `ok=true` with `record=None` when absent.
#[flutter_rust_bridge::frb(sync)]
pub fn record_get(id: i64) -> RecordResponse {
    match with_record_service(|service| service.get_record(id).map_err(|err| err.to_string())) {
        Ok(Some(record)) => RecordResponse::success("Record found.", &record),
        Ok(None) => RecordResponse {
            ok: true,
            record: None,
            message: format!("Record #{id} not found."),
        },
        Err(err) => RecordResponse::failure(format!("record_get failed: {err}")),
    }
}

/// Lists all records, most recent first.
#[flutter_rust_bridge::frb(sync)]
pub fn record_list() -> RecordListResponse {
    RecordListResponse::from_result(
        "record_list",
        with_record_service(|service| service.list_records().map_err(|err| err.to_string())),
    )
}

/// Searches records by id or sender name.
///
/// # FFI contract
/// - Blank text returns `ok=false` without touching the database.
#[flutter_rust_bridge::frb(sync)]
pub fn record_search(text: String) -> RecordListResponse {
    RecordListResponse::from_result(
        "record_search",
        with_record_service(|service| {
            service
                .search_records(&text)
                .map_err(|err| err.to_string())
        }),
    )
}

/// Applies an edit form field map to an existing record.
#[flutter_rust_bridge::frb(sync)]
pub fn record_update(id: i64, fields: HashMap<String, String>) -> RecordResponse {
    let fields = fields.into_iter().collect::<RecordFields>();
    match with_record_service(|service| {
        service
            .update_record(id, &fields)
            .map_err(|err| err.to_string())
    }) {
        Ok(record) => RecordResponse::success("Record updated.", &record),
        Err(err) => RecordResponse::failure(format!("record_update failed: {err}")),
    }
}

/// Hard-deletes one record.
#[flutter_rust_bridge::frb(sync)]
pub fn record_delete(id: i64) -> ActionResponse {
    match with_record_service(|service| service.delete_record(id).map_err(|err| err.to_string())) {
        Ok(()) => ActionResponse {
            ok: true,
            record_id: Some(id),
            message: "Record deleted.".to_string(),
        },
        Err(err) => ActionResponse {
            ok: false,
            record_id: None,
            message: format!("record_delete failed: {err}"),
        },
    }
}

/// Returns `(action_type, modified_at)` lines for one record, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn record_history(id: i64) -> HistoryResponse {
    match with_record_service(|service| {
        service
            .modification_history(id)
            .map_err(|err| err.to_string())
    }) {
        Ok(entries) => HistoryResponse {
            ok: true,
            message: format!("{} modification(s).", entries.len()),
            items: entries.iter().map(to_history_item).collect(),
        },
        Err(err) => HistoryResponse {
            ok: false,
            items: Vec::new(),
            message: format!("record_history failed: {err}"),
        },
    }
}

/// Renders the QR payload text for one record.
#[flutter_rust_bridge::frb(sync)]
pub fn record_label(id: i64) -> LabelResponse {
    match with_record_service(|service| service.label_payload(id).map_err(|err| err.to_string()))
    {
        Ok(payload) => LabelResponse {
            ok: true,
            payload: Some(payload),
            message: "Label ready.".to_string(),
        },
        Err(err) => LabelResponse {
            ok: false,
            payload: None,
            message: format!("record_label failed: {err}"),
        },
    }
}

/// Parses scanned QR text into shipment fields or raw text.
///
/// # FFI contract
/// - Pure call, no database access.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn label_scan(text: String) -> ScanResponse {
    match parse_label(&text) {
        Ok(ScannedPayload::Shipment(label)) => ScanResponse {
            ok: true,
            kind: "shipment".to_string(),
            record_id: Some(label.record_id),
            tracking_code: Some(label.tracking_code),
            fields: RecordFields::from_details(&label.details)
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            raw: None,
            message: format!("Shipment #{} scanned.", label.record_id),
        },
        Ok(ScannedPayload::Text { raw }) => ScanResponse {
            ok: true,
            kind: "text".to_string(),
            record_id: None,
            tracking_code: None,
            fields: HashMap::new(),
            raw: Some(raw),
            message: "Text payload scanned.".to_string(),
        },
        Err(err) => ScanResponse {
            ok: false,
            kind: String::new(),
            record_id: None,
            tracking_code: None,
            fields: HashMap::new(),
            raw: None,
            message: format!("label_scan failed: {err}"),
        },
    }
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn with_record_service<T>(
    f: impl FnOnce(&RecordService<SqliteRecordRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        warn!("event=ffi_bootstrap module=ffi status=error stage=db_open service=record");
        format!("entry DB open failed: {err}")
    })?;
    let repo = SqliteRecordRepository::try_new(&conn).map_err(|err| {
        warn!("event=ffi_bootstrap module=ffi status=error stage=repo_init service=record");
        format!("entry repo init failed: {err}")
    })?;
    let service = RecordService::new(repo);
    f(&service)
}

fn with_auth_service<T>(
    f: impl FnOnce(&AuthService<SqliteUserRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| {
        warn!("event=ffi_bootstrap module=ffi status=error stage=db_open service=auth");
        format!("entry DB open failed: {err}")
    })?;
    let repo = SqliteUserRepository::try_new(&conn).map_err(|err| {
        warn!("event=ffi_bootstrap module=ffi status=error stage=repo_init service=auth");
        format!("entry repo init failed: {err}")
    })?;
    let service = AuthService::new(repo);
    f(&service)
}

fn to_record_item(record: &ShipmentRecord) -> RecordItem {
    let details = &record.details;
    RecordItem {
        id: record.id,
        name_exp: details.name_exp.clone(),
        city_exp: details.city_exp.clone(),
        phone_exp: details.phone_exp.clone(),
        name_dest: details.name_dest.clone(),
        phone_dest: details.phone_dest.clone(),
        city_dest: details.city_dest.clone(),
        nmbr_package: details.nmbr_package,
        gender_package: details.gender_package.clone(),
        value_package: details.value_package,
        kilos: details.kilos,
        price: details.price,
        created_at: format_timestamp(&record.created_at),
        modified_at: record.modified_at.as_ref().map(format_timestamp),
        status: record.status.clone(),
    }
}

fn to_history_item(entry: &ModificationSummary) -> HistoryItem {
    HistoryItem {
        action_type: entry.action_type.clone(),
        modified_at: entry.modified_at.as_ref().map(format_timestamp),
    }
}
