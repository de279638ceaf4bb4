//! Printer contract and print job types.

use crate::label::{render_label, tracking_code};
use crate::model::record::ShipmentRecord;
use serde::Serialize;

/// One document handed to a printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrintDocument {
    pub title: String,
    pub body: String,
}

impl PrintDocument {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Builds the shipping label document for one record.
    pub fn shipping_label(record: &ShipmentRecord) -> Self {
        Self::new(
            format!("Colis #{} {}", record.id, tracking_code(record.id)),
            render_label(record),
        )
    }
}

/// Result of one print job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrintOutcome {
    /// Job accepted; `reference` identifies it on the printer side.
    Printed {
        printer_id: String,
        reference: String,
    },
    Failed {
        printer_id: String,
        reason: String,
    },
}

impl PrintOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, Self::Printed { .. })
    }
}

/// Output device contract.
///
/// Implementations report device failures through [`PrintOutcome::Failed`]
/// instead of panicking.
pub trait Printer: Send + Sync {
    /// Stable printer id used for registration and selection.
    fn printer_id(&self) -> &str;

    fn print(&self, document: &PrintDocument) -> PrintOutcome;
}
