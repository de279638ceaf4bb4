//! Shipment record use-case service.
//!
//! # Responsibility
//! - Accept raw form field maps and run the validator before any write.
//! - Expose the record operations consumed by the presentation layer.
//! - Map repository failures to validation / not-found / store errors.
//!
//! # Invariants
//! - A rejected field map never reaches the repository.
//! - Empty or whitespace-only search text is rejected before querying.

use crate::label::render_label;
use crate::model::audit::ModificationSummary;
use crate::model::record::{
    RecordFields, RecordId, RecordValidationError, ShipmentDetails, ShipmentRecord,
};
use crate::repo::record_repo::RecordRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RecordServiceResult<T> = Result<T, RecordServiceError>;

/// Service error for record use-cases.
#[derive(Debug)]
pub enum RecordServiceError {
    /// Input rejected; nothing was written.
    Validation(RecordValidationError),
    /// Target record does not exist.
    NotFound(RecordId),
    /// Search text was empty after trimming.
    EmptySearch,
    /// Persistence-layer failure; the write was rolled back.
    Store(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for RecordServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid record: {err}"),
            Self::NotFound(id) => write!(f, "record #{id} not found"),
            Self::EmptySearch => write!(f, "search text cannot be empty"),
            Self::Store(err) => write!(f, "storage error: {err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent record state: {details}"),
        }
    }
}

impl Error for RecordServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RecordServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

impl From<RecordValidationError> for RecordServiceError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Record service facade over repository implementations.
pub struct RecordService<R: RecordRepository> {
    repo: R,
}

impl<R: RecordRepository> RecordService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates a form submission and stores it as a new record.
    pub fn create_record(&self, fields: &RecordFields) -> RecordServiceResult<ShipmentRecord> {
        let details = ShipmentDetails::from_fields(fields).inspect_err(|err| {
            warn!("event=record_create module=service status=rejected reason={err}");
        })?;
        let id = self.repo.insert_record(&details)?;
        info!("event=record_create module=service status=ok record_id={id}");

        self.repo
            .get_record(id)?
            .ok_or(RecordServiceError::InconsistentState(
                "created record not found in read-back",
            ))
    }

    pub fn get_record(&self, id: RecordId) -> RecordServiceResult<Option<ShipmentRecord>> {
        Ok(self.repo.get_record(id)?)
    }

    /// Lists every record, most recent first.
    pub fn list_records(&self) -> RecordServiceResult<Vec<ShipmentRecord>> {
        Ok(self.repo.list_records()?)
    }

    /// Searches by id or sender name; text is trimmed first.
    pub fn search_records(&self, text: &str) -> RecordServiceResult<Vec<ShipmentRecord>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RecordServiceError::EmptySearch);
        }
        let hits = self.repo.search_records(trimmed)?;
        info!(
            "event=record_search module=service status=ok hits={}",
            hits.len()
        );
        Ok(hits)
    }

    /// Validates a form submission and applies it to an existing record.
    ///
    /// On success the record carries the new values, a fresh `modified_at`
    /// and a new modification log entry.
    pub fn update_record(
        &self,
        id: RecordId,
        fields: &RecordFields,
    ) -> RecordServiceResult<ShipmentRecord> {
        let details = ShipmentDetails::from_fields(fields).inspect_err(|err| {
            warn!("event=record_update module=service status=rejected record_id={id} reason={err}");
        })?;
        self.repo.update_record(id, &details)?;
        info!("event=record_update module=service status=ok record_id={id}");

        self.repo
            .get_record(id)?
            .ok_or(RecordServiceError::InconsistentState(
                "updated record not found in read-back",
            ))
    }

    /// Hard-deletes one record. Its modification history is kept.
    pub fn delete_record(&self, id: RecordId) -> RecordServiceResult<()> {
        self.repo.delete_record(id)?;
        info!("event=record_delete module=service status=ok record_id={id}");
        Ok(())
    }

    pub fn modification_history(
        &self,
        id: RecordId,
    ) -> RecordServiceResult<Vec<ModificationSummary>> {
        Ok(self.repo.modification_history(id)?)
    }

    /// Renders the QR payload text for one record.
    pub fn label_payload(&self, id: RecordId) -> RecordServiceResult<String> {
        let record = self
            .repo
            .get_record(id)?
            .ok_or(RecordServiceError::NotFound(id))?;
        Ok(render_label(&record))
    }
}
