//! PDF text extraction.
//!
//! Handlers depend on the [`PdfExtractor`] trait so tests can swap in a stub;
//! [`LopdfExtractor`] is the production backend.

mod lopdf_backend;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use lopdf_backend::LopdfExtractor;

#[cfg(test)]
pub(crate) use lopdf_backend::test_pdf;

/// Separator appended after every page's text.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("Failed to extract text from page {page}: {message}")]
    Page { page: u32, message: String },

    #[error("Extraction task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text and page count of a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Text of every page in order, each followed by [`PAGE_SEPARATOR`].
    pub text: String,
    pub page_count: u32,
}

impl Extraction {
    /// True when no page yielded any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extracts plain text from a PDF file on disk.
#[async_trait]
pub trait PdfExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<Extraction, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_extraction() {
        let blank = Extraction {
            text: "\n\n \n\n".to_string(),
            page_count: 2,
        };
        assert!(blank.is_blank());

        let text = Extraction {
            text: "Chapter 1\n\n".to_string(),
            page_count: 1,
        };
        assert!(!text.is_blank());
    }
}
