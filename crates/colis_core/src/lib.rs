//! Core domain logic for the colis shipment desk.
//! This crate is the single source of truth for record, audit and account
//! invariants.

pub mod db;
pub mod label;
pub mod logging;
pub mod model;
pub mod print;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use label::{parse_label, render_label, LabelError, ScannedPayload, ShipmentLabel};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::audit::{ModificationLogEntry, ModificationSummary};
pub use model::record::{
    validate_record_fields, RecordField, RecordFields, RecordId, RecordValidationError,
    ShipmentDetails, ShipmentRecord,
};
pub use model::user::{User, UserId};
pub use print::{PrintDocument, PrintOutcome, Printer, PrinterRegistry, SpoolPrinter};
pub use repo::audit_repo::{AuditRepository, SqliteAuditRepository};
pub use repo::record_repo::{RecordRepository, SqliteRecordRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{AuthError, AuthService};
pub use service::record_service::{RecordService, RecordServiceError, RecordServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
