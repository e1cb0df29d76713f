//! Resumable batch processing.
//!
//! Each invocation runs one bounded batch of unprocessed PDFs through the
//! extractors, keeps a temp artifact and the progress ledger current after
//! every document, then writes the final `<base>_batch_<N>.xlsx`.

mod driver;
mod ledger;
mod naming;
mod preflight;

pub use driver::{BatchDriver, BatchJob, BatchObserver, BatchOutcome, BatchSummary, SilentObserver, WorkPlan};
pub use ledger::ProgressLedger;
pub use naming::ArtifactNames;
pub use preflight::{check_output_dir, DiskSpace, FixedDiskSpace, SystemDiskSpace, MIN_FREE_MB};
