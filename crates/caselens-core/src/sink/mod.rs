//! Tabular output of extraction records.
//!
//! Records are flattened into a [`Sheet`] (one row per document, columns in
//! first-seen order) and handed to a [`SheetWriter`]. [`ResultSink`] adds the
//! retry and fallback policy used for the final artifact of a batch.

mod plain;
mod xlsx;

use std::path::Path;
use std::thread;
use std::time::Duration;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::SinkError;
use crate::models::{ExtractionRecord, ExtractorOutcome, FieldValue};

pub use plain::PlainXlsxWriter;
pub use xlsx::XlsxSheetWriter;

/// Largest number of characters a spreadsheet cell holds.
pub const MAX_CELL_CHARS: usize = 32_767;

/// First column of every sheet.
pub const FILE_NAME_COLUMN: &str = "File Name";

/// Cell text for an extractor that returned nothing.
pub const EMPTY_RESULT: &str = "Empty result";

/// One cell of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Blank,
    Text(String),
    Bool(bool),
}

impl Cell {
    /// A text cell, truncated to [`MAX_CELL_CHARS`].
    pub fn text(value: &str) -> Self {
        match value.char_indices().nth(MAX_CELL_CHARS) {
            Some((idx, _)) => {
                warn!(
                    "Truncating cell text from {} to {} characters",
                    value.chars().count(),
                    MAX_CELL_CHARS
                );
                Cell::Text(value[..idx].to_string())
            }
            None => Cell::Text(value.to_string()),
        }
    }
}

impl From<&FieldValue> for Cell {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Text(text) => Cell::text(text),
            FieldValue::Flag(flag) => Cell::Bool(*flag),
        }
    }
}

/// Records flattened to rows under a shared header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Union of all record columns, in first-seen order after "File Name".
    /// Cells a record does not have are blank.
    pub fn from_records(records: &[ExtractionRecord]) -> Self {
        let flattened: Vec<IndexMap<String, Cell>> = records.iter().map(flatten).collect();

        let mut header: IndexMap<String, ()> = IndexMap::new();
        header.insert(FILE_NAME_COLUMN.to_string(), ());
        for row in &flattened {
            for column in row.keys() {
                header.entry(column.clone()).or_insert(());
            }
        }
        let columns: Vec<String> = header.into_keys().collect();

        let rows = flattened
            .into_iter()
            .map(|mut row| {
                columns
                    .iter()
                    .map(|c| row.swap_remove(c).unwrap_or(Cell::Blank))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` under the named column.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        self.rows.get(row)?.get(self.column_index(column)?)
    }
}

fn flatten(record: &ExtractionRecord) -> IndexMap<String, Cell> {
    let mut row = IndexMap::new();
    row.insert(FILE_NAME_COLUMN.to_string(), Cell::text(&record.document));

    for section in &record.sections {
        let label = section.extractor.label();
        match &section.outcome {
            ExtractorOutcome::Fields(fields) => {
                for (name, value) in fields {
                    row.insert(format!("{label}: {name}"), Cell::from(value));
                }
            }
            ExtractorOutcome::Empty => {
                row.insert(format!("{label}: Error"), Cell::text(EMPTY_RESULT));
            }
            ExtractorOutcome::Failed(message) => {
                row.insert(format!("{label}: Error"), Cell::text(message));
            }
        }
    }
    row
}

/// Serializes a sheet to a file.
pub trait SheetWriter {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Write the whole sheet to `path`, replacing any existing file.
    fn write(&self, sheet: &Sheet, path: &Path) -> Result<(), SinkError>;
}

/// Retry policy for the final write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts with the primary writer.
    pub attempts: u32,
    /// Pause after a contention failure.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

/// Which writer produced the final artifact, and after how many primary attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub writer: &'static str,
    pub attempts: u32,
}

/// Primary writer, fallback writer and retry policy.
pub struct ResultSink {
    primary: Box<dyn SheetWriter>,
    fallback: Box<dyn SheetWriter>,
    retry: RetryPolicy,
}

impl ResultSink {
    pub fn new(primary: Box<dyn SheetWriter>, fallback: Box<dyn SheetWriter>) -> Self {
        Self {
            primary,
            fallback,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Write the batch so far with the primary writer. No retries.
    pub fn write_snapshot(&self, records: &[ExtractionRecord], path: &Path) -> Result<(), SinkError> {
        self.primary.write(&Sheet::from_records(records), path)?;
        debug!("Intermediate results saved to {}", path.display());
        Ok(())
    }

    /// Write the complete batch.
    ///
    /// The primary writer gets up to `attempts` tries, pausing after each
    /// contention failure except the last. If the last failure was not
    /// contention, the fallback writer gets one try with the same sheet.
    pub fn write_final(&self, records: &[ExtractionRecord], path: &Path) -> Result<WriteReport, SinkError> {
        let sheet = Sheet::from_records(records);
        let attempts = self.retry.attempts.max(1);

        let mut attempt = 1;
        let last_error = loop {
            info!(
                "Saving {} with {} (attempt {attempt})",
                path.display(),
                self.primary.name()
            );
            let err = match self.primary.write(&sheet, path) {
                Ok(()) => {
                    return Ok(WriteReport {
                        writer: self.primary.name(),
                        attempts: attempt,
                    });
                }
                Err(err) => err,
            };

            if err.is_contention() {
                warn!("Permission denied on attempt {attempt} for {}: {err}", path.display());
            } else {
                warn!("Unexpected error on attempt {attempt} for {}: {err}", path.display());
            }

            if attempt >= attempts {
                break err;
            }
            if err.is_contention() {
                info!("Retrying in {:?}", self.retry.backoff);
                thread::sleep(self.retry.backoff);
            }
            attempt += 1;
        };

        if last_error.is_contention() {
            warn!("Max retries reached for {}", path.display());
            return Err(last_error);
        }

        info!("Falling back to the {} writer for {}", self.fallback.name(), path.display());
        match self.fallback.write(&sheet, path) {
            Ok(()) => Ok(WriteReport {
                writer: self.fallback.name(),
                attempts,
            }),
            Err(err) => {
                warn!("Fallback writer failed for {}: {err}", path.display());
                Err(err)
            }
        }
    }
}

impl Default for ResultSink {
    fn default() -> Self {
        Self::new(Box::new(XlsxSheetWriter::new()), Box::new(PlainXlsxWriter::new()))
    }
}

/// Spreadsheet column letters: 0 is "A", 26 is "AA".
pub(crate) fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtractorId, FieldMap};
    use pretty_assertions::assert_eq;
    use std::cell::{Cell as Counter, RefCell};
    use std::io::{Error, ErrorKind};
    use std::path::PathBuf;
    use std::rc::Rc;

    fn record(name: &str, extractor: ExtractorId, fields: &[(&str, FieldValue)]) -> ExtractionRecord {
        let mut map = FieldMap::new();
        for (k, v) in fields {
            map.insert(k.to_string(), v.clone());
        }
        let mut record = ExtractionRecord::new(name);
        record.push(extractor, ExtractorOutcome::Fields(map));
        record
    }

    #[test]
    fn test_sheet_union_with_blanks() {
        let a = record("a.pdf", ExtractorId::Acts, &[("List of Acts", "IPC".into())]);
        let mut b = record("b.pdf", ExtractorId::CrimeInfo, &[("Crime against women", true.into())]);
        b.push(ExtractorId::Citation, ExtractorOutcome::Failed("no text".to_string()));

        let sheet = Sheet::from_records(&[a, b]);
        assert_eq!(
            sheet.columns,
            vec![
                "File Name",
                "Acts: List of Acts",
                "Crime Info: Crime against women",
                "Citation: Error"
            ]
        );
        assert_eq!(sheet.cell(0, "Crime Info: Crime against women"), Some(&Cell::Blank));
        assert_eq!(sheet.cell(1, "Acts: List of Acts"), Some(&Cell::Blank));
        assert_eq!(sheet.cell(1, "Crime Info: Crime against women"), Some(&Cell::Bool(true)));
        assert_eq!(sheet.cell(1, "Citation: Error"), Some(&Cell::Text("no text".to_string())));
    }

    #[test]
    fn test_empty_marker() {
        let mut r = ExtractionRecord::new("c.pdf");
        r.push(ExtractorId::Background, ExtractorOutcome::Empty);
        let sheet = Sheet::from_records(&[r]);
        assert_eq!(sheet.cell(0, "Background: Error"), Some(&Cell::Text(EMPTY_RESULT.to_string())));
    }

    #[test]
    fn test_long_text_is_truncated() {
        let long = "é".repeat(MAX_CELL_CHARS + 10);
        match Cell::text(&long) {
            Cell::Text(t) => assert_eq!(t.chars().count(), MAX_CELL_CHARS),
            other => panic!("unexpected cell {other:?}"),
        }
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    /// Fails with the scripted errors in order, then succeeds.
    struct ScriptedWriter {
        name: &'static str,
        failures: RefCell<Vec<ErrorKind>>,
        calls: Counter<u32>,
    }

    impl ScriptedWriter {
        fn new(name: &'static str, failures: &[ErrorKind]) -> Self {
            Self {
                name,
                failures: RefCell::new(failures.iter().rev().copied().collect()),
                calls: Counter::new(0),
            }
        }
    }

    impl SheetWriter for Rc<ScriptedWriter> {
        fn name(&self) -> &'static str {
            self.name
        }

        fn write(&self, _sheet: &Sheet, path: &Path) -> Result<(), SinkError> {
            self.calls.set(self.calls.get() + 1);
            match self.failures.borrow_mut().pop() {
                Some(kind) => Err(SinkError::from_io(path, Error::from(kind))),
                None => Ok(()),
            }
        }
    }

    fn sink(primary: &Rc<ScriptedWriter>, fallback: &Rc<ScriptedWriter>) -> ResultSink {
        ResultSink::new(Box::new(Rc::clone(primary)), Box::new(Rc::clone(fallback))).with_retry_policy(RetryPolicy {
            attempts: 3,
            backoff: Duration::ZERO,
        })
    }

    #[test]
    fn test_retries_after_contention() {
        let primary = Rc::new(ScriptedWriter::new("primary", &[ErrorKind::PermissionDenied, ErrorKind::PermissionDenied]));
        let fallback = Rc::new(ScriptedWriter::new("fallback", &[]));

        let report = sink(&primary, &fallback).write_final(&[], &PathBuf::from("out.xlsx")).unwrap();
        assert_eq!(report, WriteReport { writer: "primary", attempts: 3 });
        assert_eq!(fallback.calls.get(), 0);
    }

    #[test]
    fn test_contention_exhaustion_skips_fallback() {
        let primary = Rc::new(ScriptedWriter::new("primary", &[ErrorKind::PermissionDenied; 3]));
        let fallback = Rc::new(ScriptedWriter::new("fallback", &[]));

        let err = sink(&primary, &fallback).write_final(&[], &PathBuf::from("out.xlsx")).unwrap_err();
        assert!(err.is_contention());
        assert_eq!(primary.calls.get(), 3);
        assert_eq!(fallback.calls.get(), 0);
    }

    #[test]
    fn test_fallback_after_other_failures() {
        let primary = Rc::new(ScriptedWriter::new("primary", &[ErrorKind::Other; 3]));
        let fallback = Rc::new(ScriptedWriter::new("fallback", &[]));

        let report = sink(&primary, &fallback).write_final(&[], &PathBuf::from("out.xlsx")).unwrap();
        assert_eq!(report, WriteReport { writer: "fallback", attempts: 3 });
        assert_eq!(fallback.calls.get(), 1);
    }
}
