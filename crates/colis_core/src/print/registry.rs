//! In-process printer registry and active selection.

use crate::print::printer::{PrintDocument, PrintOutcome, Printer};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Printer registration/selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterRegistryError {
    InvalidPrinterId(String),
    DuplicatePrinterId(String),
    PrinterNotFound(String),
    NoActivePrinter,
}

impl Display for PrinterRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrinterId(value) => write!(f, "printer id is invalid: {value}"),
            Self::DuplicatePrinterId(value) => {
                write!(f, "printer id already registered: {value}")
            }
            Self::PrinterNotFound(value) => write!(f, "printer not found: {value}"),
            Self::NoActivePrinter => write!(f, "no active printer selected"),
        }
    }
}

impl Error for PrinterRegistryError {}

/// Runtime printer registry.
#[derive(Default)]
pub struct PrinterRegistry {
    printers: BTreeMap<String, Arc<dyn Printer>>,
    active_printer_id: Option<String>,
}

impl PrinterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one printer.
    pub fn register(&mut self, printer: Arc<dyn Printer>) -> Result<(), PrinterRegistryError> {
        let printer_id = printer.printer_id().trim().to_string();
        if !is_valid_printer_id(&printer_id) {
            return Err(PrinterRegistryError::InvalidPrinterId(printer_id));
        }
        if self.printers.contains_key(printer_id.as_str()) {
            return Err(PrinterRegistryError::DuplicatePrinterId(printer_id));
        }

        self.printers.insert(printer_id, printer);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.printers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.printers.is_empty()
    }

    /// Returns sorted printer ids.
    pub fn printer_ids(&self) -> Vec<String> {
        self.printers.keys().cloned().collect()
    }

    /// Selects the printer used by [`Self::print_active`].
    pub fn select_active(&mut self, printer_id: &str) -> Result<(), PrinterRegistryError> {
        let normalized = printer_id.trim();
        if !self.printers.contains_key(normalized) {
            return Err(PrinterRegistryError::PrinterNotFound(normalized.to_string()));
        }
        self.active_printer_id = Some(normalized.to_string());
        Ok(())
    }

    pub fn clear_active(&mut self) {
        self.active_printer_id = None;
    }

    pub fn active_printer_id(&self) -> Option<&str> {
        self.active_printer_id.as_deref()
    }

    pub fn get(&self, printer_id: &str) -> Option<Arc<dyn Printer>> {
        self.printers.get(printer_id.trim()).cloned()
    }

    /// Sends one document to the active printer.
    pub fn print_active(
        &self,
        document: &PrintDocument,
    ) -> Result<PrintOutcome, PrinterRegistryError> {
        let printer = self
            .active_printer_id()
            .and_then(|id| self.get(id))
            .ok_or(PrinterRegistryError::NoActivePrinter)?;

        let started_at = Instant::now();
        let outcome = printer.print(document);
        let duration_ms = started_at.elapsed().as_millis();
        match &outcome {
            PrintOutcome::Printed { printer_id, .. } => info!(
                "event=print_job module=print status=ok printer_id={printer_id} duration_ms={duration_ms}"
            ),
            PrintOutcome::Failed { printer_id, .. } => warn!(
                "event=print_job module=print status=error printer_id={printer_id} duration_ms={duration_ms}"
            ),
        }

        Ok(outcome)
    }
}

fn is_valid_printer_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::{PrinterRegistry, PrinterRegistryError};
    use crate::print::printer::{PrintDocument, PrintOutcome, Printer};
    use std::sync::{Arc, Mutex};

    struct MockPrinter {
        printer_id: String,
        jobs: Mutex<Vec<String>>,
    }

    impl MockPrinter {
        fn new(printer_id: &str) -> Self {
            Self {
                printer_id: printer_id.to_string(),
                jobs: Mutex::new(Vec::new()),
            }
        }
    }

    impl Printer for MockPrinter {
        fn printer_id(&self) -> &str {
            &self.printer_id
        }

        fn print(&self, document: &PrintDocument) -> PrintOutcome {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.push(document.title.clone());
            PrintOutcome::Printed {
                printer_id: self.printer_id.clone(),
                reference: format!("job-{}", jobs.len()),
            }
        }
    }

    #[test]
    fn registers_selects_and_prints_through_active_printer() {
        let printer = Arc::new(MockPrinter::new("counter_printer"));
        let mut registry = PrinterRegistry::new();
        registry
            .register(printer.clone())
            .expect("printer should register");
        assert_eq!(registry.len(), 1);
        assert!(registry.active_printer_id().is_none());

        registry
            .select_active(" counter_printer ")
            .expect("printer should be selectable");
        assert_eq!(registry.active_printer_id(), Some("counter_printer"));

        let outcome = registry
            .print_active(&PrintDocument::new("Colis #1", "ID: 1"))
            .expect("active printer should print");
        assert_eq!(
            outcome,
            PrintOutcome::Printed {
                printer_id: "counter_printer".to_string(),
                reference: "job-1".to_string(),
            }
        );
        assert_eq!(printer.jobs.lock().unwrap().as_slice(), ["Colis #1"]);
    }

    #[test]
    fn rejects_invalid_or_duplicate_printer_id() {
        let mut registry = PrinterRegistry::new();
        let invalid = registry.register(Arc::new(MockPrinter::new("Front Desk")));
        assert!(matches!(
            invalid,
            Err(PrinterRegistryError::InvalidPrinterId(_))
        ));

        registry
            .register(Arc::new(MockPrinter::new("front_desk")))
            .expect("first registration should succeed");
        let duplicate = registry.register(Arc::new(MockPrinter::new("front_desk")));
        assert_eq!(
            duplicate,
            Err(PrinterRegistryError::DuplicatePrinterId(
                "front_desk".to_string()
            ))
        );
    }

    #[test]
    fn printing_without_selection_fails() {
        let mut registry = PrinterRegistry::new();
        registry
            .register(Arc::new(MockPrinter::new("front_desk")))
            .expect("registration should succeed");

        let result = registry.print_active(&PrintDocument::new("t", "b"));
        assert_eq!(result, Err(PrinterRegistryError::NoActivePrinter));
        assert_eq!(
            registry.select_active("missing"),
            Err(PrinterRegistryError::PrinterNotFound("missing".to_string()))
        );
    }
}
