//! Printer seam for shipping labels.
//!
//! # Responsibility
//! - Define the printer contract used by front ends.
//! - Keep printer registration and active selection in one place.
//!
//! # Invariants
//! - Printer ids are unique, lowercase `[a-z0-9_-]+`.
//! - Printing without an active printer is an error, never a silent no-op.

pub mod printer;
pub mod registry;
pub mod spool;

pub use printer::{PrintDocument, PrintOutcome, Printer};
pub use registry::{PrinterRegistry, PrinterRegistryError};
pub use spool::SpoolPrinter;
