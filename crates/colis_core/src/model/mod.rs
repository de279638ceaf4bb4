//! Domain model for users, shipment records and their modification history.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Own the record field-map validator that gates every record write.
//!
//! # Invariants
//! - Records and log entries are identified by SQLite row ids, never reused.
//! - Users are immutable after signup.

pub mod audit;
pub mod record;
pub mod timestamp;
pub mod user;
