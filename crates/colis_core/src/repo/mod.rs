//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Record writes enforce `ShipmentDetails::validate()` before persistence.
//! - Every write runs in its own immediate transaction; a dropped
//!   transaction rolls back.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod audit_repo;
pub mod error;
pub mod record_repo;
mod schema;
pub mod user_repo;

pub use error::{RepoError, RepoResult};
