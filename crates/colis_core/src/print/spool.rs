//! File-spool printer.
//!
//! Writes each document as one UTF-8 text file in a spool directory. A print
//! server or a person picks the files up from there.

use crate::model::timestamp;
use crate::print::printer::{PrintDocument, PrintOutcome, Printer};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const MAX_TITLE_SLUG_CHARS: usize = 40;

/// Printer writing jobs to `<spool_dir>/<millis>-<seq>-<title>.txt`.
pub struct SpoolPrinter {
    printer_id: String,
    spool_dir: PathBuf,
    next_job: AtomicU64,
}

impl SpoolPrinter {
    pub fn new(printer_id: impl Into<String>, spool_dir: impl Into<PathBuf>) -> Self {
        Self {
            printer_id: printer_id.into(),
            spool_dir: spool_dir.into(),
            next_job: AtomicU64::new(1),
        }
    }

    pub fn spool_dir(&self) -> &Path {
        &self.spool_dir
    }

    fn write_job(&self, document: &PrintDocument) -> std::io::Result<PathBuf> {
        fs::create_dir_all(&self.spool_dir)?;
        let sequence = self.next_job.fetch_add(1, Ordering::Relaxed);
        let file_name = format!(
            "{}-{sequence:04}-{}.txt",
            timestamp::now().timestamp_millis(),
            title_slug(&document.title)
        );
        let path = self.spool_dir.join(file_name);
        fs::write(&path, format!("{}\n\n{}", document.title, document.body))?;
        Ok(path)
    }
}

impl Printer for SpoolPrinter {
    fn printer_id(&self) -> &str {
        &self.printer_id
    }

    fn print(&self, document: &PrintDocument) -> PrintOutcome {
        match self.write_job(document) {
            Ok(path) => PrintOutcome::Printed {
                printer_id: self.printer_id.clone(),
                reference: path.display().to_string(),
            },
            Err(err) => PrintOutcome::Failed {
                printer_id: self.printer_id.clone(),
                reason: format!(
                    "cannot write to spool `{}`: {err}",
                    self.spool_dir.display()
                ),
            },
        }
    }
}

fn title_slug(title: &str) -> String {
    let slug = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let slug = slug.chars().take(MAX_TITLE_SLUG_CHARS).collect::<String>();
    if slug.is_empty() {
        "document".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::{title_slug, SpoolPrinter};
    use crate::print::printer::{PrintDocument, PrintOutcome, Printer};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn title_slug_keeps_ascii_alphanumerics() {
        assert_eq!(title_slug("Colis #12 TR000012"), "colis-12-tr000012");
        assert_eq!(title_slug("###"), "document");
    }

    #[test]
    fn print_writes_one_file_per_job() {
        let dir = TempDir::new().unwrap();
        let printer = SpoolPrinter::new("spool", dir.path().join("jobs"));

        let document = PrintDocument::new("Colis #1", "ID: 1\nSuivi: TR000001\n");
        let first = printer.print(&document);
        let second = printer.print(&document);

        let PrintOutcome::Printed { reference, .. } = first else {
            panic!("expected printed outcome, got {first:?}");
        };
        let content = std::fs::read_to_string(PathBuf::from(&reference)).unwrap();
        assert_eq!(content, "Colis #1\n\nID: 1\nSuivi: TR000001\n");
        assert!(second.is_printed());

        let files = std::fs::read_dir(printer.spool_dir()).unwrap().count();
        assert_eq!(files, 2);
    }

    #[test]
    fn unwritable_spool_reports_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();
        let printer = SpoolPrinter::new("spool", &blocker);

        let outcome = printer.print(&PrintDocument::new("t", "b"));
        assert!(matches!(
            outcome,
            PrintOutcome::Failed { ref printer_id, .. } if printer_id == "spool"
        ));
    }
}
