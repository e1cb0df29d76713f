//! A judgment document with lazily loaded page texts.

use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{PdfExtractor, PdfProcessor};
use crate::error::ExtractError;

/// One input PDF. Page texts are read on first use and shared by every extractor.
pub struct CaseDocument {
    name: String,
    path: Option<PathBuf>,
    pages: OnceCell<Result<Vec<String>, String>>,
    text: OnceCell<String>,
}

impl CaseDocument {
    /// Open a document on disk. Nothing is read until text is requested.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            name,
            path: Some(path.to_path_buf()),
            pages: OnceCell::new(),
            text: OnceCell::new(),
        }
    }

    /// Build a document from already extracted page texts.
    pub fn from_pages(name: impl Into<String>, pages: Vec<String>) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Ok(pages));
        Self {
            name: name.into(),
            path: None,
            pages: cell,
            text: OnceCell::new(),
        }
    }

    /// Document identifier (file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path on disk, if the document was opened from a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Page texts, in page order.
    pub fn pages(&self) -> Result<&[String], ExtractError> {
        match self.pages.get_or_init(|| self.load()) {
            Ok(pages) => Ok(pages.as_slice()),
            Err(message) => Err(ExtractError::Document(message.clone())),
        }
    }

    /// Full text, pages joined by newlines. Blank text is an error.
    pub fn text(&self) -> Result<&str, ExtractError> {
        let pages = self.pages()?;
        let text = self.text.get_or_init(|| pages.join("\n"));
        if text.trim().is_empty() {
            return Err(ExtractError::NoText);
        }
        Ok(text)
    }

    /// Text of the first page.
    pub fn first_page(&self) -> Result<&str, ExtractError> {
        self.pages()?
            .first()
            .map(String::as_str)
            .filter(|p| !p.trim().is_empty())
            .ok_or(ExtractError::MissingRegion("first page"))
    }

    /// Number of pages.
    pub fn page_count(&self) -> Result<usize, ExtractError> {
        Ok(self.pages()?.len())
    }

    fn load(&self) -> Result<Vec<String>, String> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };

        let data = std::fs::read(path).map_err(|e| e.to_string())?;
        let mut extractor = PdfExtractor::new();
        let pages = extractor
            .load(&data)
            .and_then(|_| extractor.extract_pages())
            .map_err(|e| {
                warn!("Failed to read {}: {}", self.name, e);
                e.to_string()
            })?;

        debug!("Loaded {} page(s) from {}", pages.len(), self.name);
        Ok(pages)
    }
}

impl std::fmt::Debug for CaseDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaseDocument")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("loaded", &self.pages.get().is_some())
            .finish()
    }
}
