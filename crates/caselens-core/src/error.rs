//! Error types for the caselens-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the caselens library.
#[derive(Error, Debug)]
pub enum CaseLensError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Output directory failed the preflight checks.
    #[error("preflight failed: {0}")]
    Preflight(#[from] PreflightError),

    /// Progress ledger could not be read or appended.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The input directory holds no PDF files.
    #[error("no PDF files found in {}", dir.display())]
    NoInput { dir: PathBuf },

    /// The final artifact could not be written after all retries and the fallback writer.
    #[error(
        "failed to save {}: {source}. Close the file if it is open elsewhere, check write permissions and free space. \
         Intermediate results are in {}",
        path.display(),
        temp.display()
    )]
    FinalWrite {
        path: PathBuf,
        temp: PathBuf,
        #[source]
        source: SinkError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised by a single extractor. The driver records them inline and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The document text could not be loaded.
    #[error("failed to read document: {0}")]
    Document(String),

    /// The document loaded but produced no text.
    #[error("no text extracted from PDF")]
    NoText,

    /// The region the extractor reads from is empty.
    #[error("no text extracted from {0}")]
    MissingRegion(&'static str),
}

/// Errors from the output directory checks run before any document is touched.
#[derive(Error, Debug)]
pub enum PreflightError {
    /// The output directory cannot be created or written to.
    #[error("output directory {} is not writable: {source}. Check permissions", dir.display())]
    NotWritable {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Free space in the output directory is below the minimum.
    #[error(
        "low disk space in {}: {available_mb:.2} MB available, {required_mb} MB required. Free up space and retry",
        dir.display()
    )]
    LowDiskSpace {
        dir: PathBuf,
        available_mb: f64,
        required_mb: u64,
    },

    /// Free space could not be determined.
    #[error("cannot query free space for {}: {source}", dir.display())]
    SpaceQuery {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the progress ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("failed to read ledger {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append to ledger {}: {source}", path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from writing a tabular artifact.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The target file is locked or not writable right now. Worth retrying.
    #[error("{} is in use or not writable: {source}", path.display())]
    Contention {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other I/O failure.
    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The writer rejected the content or failed to serialize it.
    #[error("{writer} writer failed: {message}")]
    Serialize {
        writer: &'static str,
        message: String,
    },
}

impl SinkError {
    /// Classify an I/O error raised while writing `path`.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if is_contention(&source) {
            SinkError::Contention { path, source }
        } else {
            SinkError::Io { path, source }
        }
    }

    /// Whether the failure is transient file contention.
    pub fn is_contention(&self) -> bool {
        matches!(self, SinkError::Contention { .. })
    }
}

#[cfg(windows)]
fn is_contention(err: &std::io::Error) -> bool {
    // ERROR_SHARING_VIOLATION, ERROR_LOCK_VIOLATION
    err.kind() == std::io::ErrorKind::PermissionDenied || matches!(err.raw_os_error(), Some(32 | 33))
}

#[cfg(not(windows))]
fn is_contention(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::PermissionDenied
}

/// Result type for the caselens library.
pub type Result<T> = std::result::Result<T, CaseLensError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_permission_denied_is_contention() {
        let err = SinkError::from_io("out.xlsx", Error::from(ErrorKind::PermissionDenied));
        assert!(err.is_contention());
    }

    #[test]
    fn test_other_io_is_not_contention() {
        let err = SinkError::from_io("out.xlsx", Error::from(ErrorKind::NotFound));
        assert!(!err.is_contention());
    }

    #[test]
    fn test_low_disk_space_message_states_shortfall() {
        let err = PreflightError::LowDiskSpace {
            dir: PathBuf::from("out"),
            available_mb: 50.0,
            required_mb: 100,
        };
        let message = err.to_string();
        assert!(message.contains("50.00 MB available"));
        assert!(message.contains("100 MB required"));
    }
}
