//! The resumable batch loop.

use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use tracing::{debug, error, info, warn};

use super::ledger::ProgressLedger;
use super::naming::ArtifactNames;
use super::preflight::{check_output_dir, DiskSpace, SystemDiskSpace};
use crate::error::{CaseLensError, Result, SinkError};
use crate::judgment::{default_extractors, Extractor};
use crate::models::{BatchConfig, CaseLensConfig, ExtractionConfig, ExtractionRecord, ExtractorOutcome};
use crate::pdf::CaseDocument;
use crate::sink::{ResultSink, RetryPolicy, SheetWriter};

/// One invocation's input, output and bounds.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input_dir: PathBuf,
    /// Template for artifact names: `out/results.xlsx` gives `out/results_batch_<N>.xlsx`.
    pub output_file: PathBuf,
    pub batch_size: usize,
    pub max_documents: usize,
    /// Ledger file name, placed in the output directory.
    pub ledger_file: String,
}

impl BatchJob {
    pub fn new(input_dir: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self::from_config(input_dir, output_file, &BatchConfig::default())
    }

    pub fn from_config(input_dir: impl Into<PathBuf>, output_file: impl Into<PathBuf>, config: &BatchConfig) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_file: output_file.into(),
            batch_size: config.batch_size,
            max_documents: config.max_documents,
            ledger_file: config.ledger_file.clone(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = max_documents;
        self
    }

    pub fn names(&self) -> ArtifactNames {
        ArtifactNames::from_template(&self.output_file)
    }

    pub fn ledger(&self) -> ProgressLedger {
        ProgressLedger::new(self.names().dir().join(&self.ledger_file))
    }
}

/// What is left to do for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPlan {
    /// Input PDFs considered, after the document cap.
    pub discovered: usize,
    /// How many of those are already in the ledger.
    pub processed: usize,
    /// Unprocessed PDFs, in listing order.
    pub remaining: Vec<PathBuf>,
    /// Number the next final artifact will get.
    pub next_batch: u32,
}

/// Result of one completed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub batch_number: u32,
    pub artifact: PathBuf,
    pub documents: usize,
    /// Extractor failure and empty markers across all rows.
    pub failed_extractions: usize,
    /// Unprocessed documents left for later invocations.
    pub remaining: usize,
    /// Writer that produced the artifact.
    pub writer: &'static str,
    /// Primary writer attempts used.
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every discovered document is already in the ledger. Nothing was written.
    AllProcessed { discovered: usize },
    Completed(BatchSummary),
}

/// Progress hooks. All methods default to doing nothing.
pub trait BatchObserver {
    fn batch_started(&self, _batch_number: u32, _documents: usize) {}

    fn document_started(&self, _index: usize, _document: &str) {}

    /// Called once the record is in the temp artifact and the ledger.
    fn document_recorded(&self, _record: &ExtractionRecord, _temp_path: &Path) {}

    fn snapshot_failed(&self, _document: &str, _error: &SinkError) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl BatchObserver for SilentObserver {}

/// Runs extractors over one batch of documents per invocation.
pub struct BatchDriver {
    extractors: Vec<Box<dyn Extractor>>,
    sink: ResultSink,
    disk_space: Box<dyn DiskSpace>,
}

impl BatchDriver {
    /// Driver with the default extractors, writers and system disk space.
    pub fn new() -> Self {
        Self::with_extraction_config(&ExtractionConfig::default())
    }

    pub fn from_config(config: &CaseLensConfig) -> Self {
        Self::with_extraction_config(&config.extraction)
    }

    fn with_extraction_config(config: &ExtractionConfig) -> Self {
        Self {
            extractors: default_extractors(config),
            sink: ResultSink::default(),
            disk_space: Box::new(SystemDiskSpace),
        }
    }

    pub fn with_extractors(mut self, extractors: Vec<Box<dyn Extractor>>) -> Self {
        self.extractors = extractors;
        self
    }

    pub fn with_writers(mut self, primary: Box<dyn SheetWriter>, fallback: Box<dyn SheetWriter>) -> Self {
        let retry = self.sink.retry_policy();
        self.sink = ResultSink::new(primary, fallback).with_retry_policy(retry);
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.sink = self.sink.with_retry_policy(retry);
        self
    }

    pub fn with_disk_space(mut self, disk_space: Box<dyn DiskSpace>) -> Self {
        self.disk_space = disk_space;
        self
    }

    /// Discover input PDFs and subtract the ledger. Nothing is written.
    pub fn plan(&self, job: &BatchJob) -> Result<WorkPlan> {
        if job.batch_size < 1 {
            return Err(CaseLensError::Config("batch size must be at least 1".to_string()));
        }

        let discovered = discover_pdfs(&job.input_dir, job.max_documents)?;
        if discovered.is_empty() {
            return Err(CaseLensError::NoInput {
                dir: job.input_dir.clone(),
            });
        }

        let processed_names = job.ledger().load_all()?;
        let (processed, remaining): (Vec<PathBuf>, Vec<PathBuf>) = discovered
            .iter()
            .cloned()
            .partition(|path| processed_names.contains(&document_name(path)));

        Ok(WorkPlan {
            discovered: discovered.len(),
            processed: processed.len(),
            remaining,
            next_batch: job.names().next_batch_number(),
        })
    }

    /// Process the next batch of unprocessed documents and write its artifact.
    pub fn run(&self, job: &BatchJob, observer: &dyn BatchObserver) -> Result<BatchOutcome> {
        let names = job.names();
        check_output_dir(names.dir(), self.disk_space.as_ref())?;

        let plan = self.plan(job)?;
        if plan.remaining.is_empty() {
            info!("All PDFs have been processed");
            return Ok(BatchOutcome::AllProcessed {
                discovered: plan.discovered,
            });
        }

        let batch = &plan.remaining[..job.batch_size.min(plan.remaining.len())];
        let batch_number = plan.next_batch;
        let temp_path = names.temp_path(batch_number);
        let final_path = names.final_path(batch_number);
        let ledger = job.ledger();
        info!(
            "Starting batch {batch_number}: {} of {} unprocessed PDF(s)",
            batch.len(),
            plan.remaining.len()
        );
        observer.batch_started(batch_number, batch.len());

        let mut records = Vec::with_capacity(batch.len());
        for (idx, path) in batch.iter().enumerate() {
            let name = document_name(path);
            info!("Processing {name}");
            observer.document_started(idx, &name);

            records.push(self.process_document(path));

            if let Err(e) = self.sink.write_snapshot(&records, &temp_path) {
                error!("Failed to save intermediate results for {name}: {e}");
                observer.snapshot_failed(&name, &e);
            }
            ledger.mark(&name)?;
            observer.document_recorded(&records[idx], &temp_path);
        }

        let failed_extractions = records.iter().map(ExtractionRecord::marker_count).sum();

        let report = match self.sink.write_final(&records, &final_path) {
            Ok(report) => report,
            Err(source) => {
                error!(
                    "Data was not saved to {}. Intermediate results remain in {}",
                    final_path.display(),
                    temp_path.display()
                );
                return Err(CaseLensError::FinalWrite {
                    path: final_path,
                    temp: temp_path,
                    source,
                });
            }
        };

        if temp_path.exists() {
            if let Err(e) = fs::remove_file(&temp_path) {
                warn!("Could not remove {}: {e}", temp_path.display());
            }
        }
        info!(
            "Batch {batch_number} processed. Results saved to {} using {}",
            final_path.display(),
            report.writer
        );

        Ok(BatchOutcome::Completed(BatchSummary {
            batch_number,
            artifact: final_path,
            documents: records.len(),
            failed_extractions,
            remaining: plan.remaining.len() - batch.len(),
            writer: report.writer,
            attempts: report.attempts,
        }))
    }

    /// Run every extractor on one document. Failures and panics become markers.
    pub fn process_document(&self, path: &Path) -> ExtractionRecord {
        let doc = CaseDocument::open(path);
        let mut record = ExtractionRecord::new(doc.name());

        for extractor in &self.extractors {
            let id = extractor.id();
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| extractor.extract(&doc))) {
                Ok(Ok(fields)) if fields.is_empty() => {
                    warn!("{id} returned empty result for {}", doc.name());
                    ExtractorOutcome::Empty
                }
                Ok(Ok(fields)) => {
                    debug!("{id} extracted {} field(s) from {}", fields.len(), doc.name());
                    ExtractorOutcome::Fields(fields)
                }
                Ok(Err(e)) => {
                    error!("Error in {id} for {}: {e}", doc.name());
                    ExtractorOutcome::Failed(e.to_string())
                }
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("{id} panicked on {}: {message}", doc.name());
                    ExtractorOutcome::Failed(message)
                }
            };
            record.push(id, outcome);
        }
        record
    }
}

impl Default for BatchDriver {
    fn default() -> Self {
        Self::new()
    }
}

/// Regular files with a `.pdf` extension (any case), in name order, capped.
fn discover_pdfs(dir: &Path, max_documents: usize) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", Pattern::escape(&dir.to_string_lossy()));
    let paths = glob(&pattern).map_err(|e| CaseLensError::Config(format!("invalid input directory: {e}")))?;

    let pdfs: Vec<PathBuf> = paths
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .take(max_documents)
        .collect();

    debug!("Found {} PDF(s) in {}", pdfs.len(), dir.display());
    Ok(pdfs)
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("extractor panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("extractor panicked: {s}")
    } else {
        "extractor panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"%PDF-1.4").unwrap();
    }

    #[test]
    fn test_discover_filters_and_caps() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf"] {
            touch(dir.path(), name);
        }
        fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        let found = discover_pdfs(dir.path(), 2).unwrap();
        let names: Vec<String> = found.iter().map(|p| document_name(p)).collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_plan_subtracts_ledger() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            touch(input.path(), name);
        }
        fs::write(output.path().join("processed_files.txt"), "b.pdf\n").unwrap();
        fs::write(output.path().join("res_batch_4.xlsx"), b"").unwrap();

        let job = BatchJob::new(input.path(), output.path().join("res.xlsx"));
        let plan = BatchDriver::new().plan(&job).unwrap();
        assert_eq!(plan.discovered, 3);
        assert_eq!(plan.processed, 1);
        assert_eq!(plan.remaining, vec![input.path().join("a.pdf"), input.path().join("c.pdf")]);
        assert_eq!(plan.next_batch, 5);
    }

    #[test]
    fn test_zero_batch_size_is_config_error() {
        let job = BatchJob::new("in", "out/res.xlsx").with_batch_size(0);
        assert!(matches!(BatchDriver::new().plan(&job), Err(CaseLensError::Config(_))));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "extractor panicked: boom");
    }
}
