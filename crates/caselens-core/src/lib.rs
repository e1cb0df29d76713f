//! Core library for court-judgment metadata extraction.
//!
//! This crate provides:
//! - PDF text extraction, per page and shared across extractors
//! - Ten rule-based judgment extractors (case details, parties, citations, outcomes, ...)
//! - Spreadsheet output with retry and fallback writers
//! - A resumable batch driver with a progress ledger

pub mod batch;
pub mod error;
pub mod judgment;
pub mod models;
pub mod pdf;
pub mod sink;

pub use batch::{BatchDriver, BatchJob, BatchObserver, BatchOutcome, BatchSummary, SilentObserver, WorkPlan};
pub use error::{CaseLensError, Result};
pub use judgment::{default_extractors, Extractor, NOT_FOUND};
pub use models::{CaseLensConfig, ExtractionRecord, ExtractorId, ExtractorOutcome, FieldMap, FieldValue};
pub use pdf::{CaseDocument, PdfExtractor, PdfProcessor};
pub use sink::{ResultSink, RetryPolicy, Sheet, SheetWriter};
