//! Document extraction — turns a file path into best-effort plain text.
//!
//! Dispatch is by file extension through the closed [`DocumentFormat`] set;
//! adding a format means adding one variant and one implementation. There is
//! no layout-fidelity guarantee: column order, tables, and headers may come
//! out scrambled, but the text is there.

pub mod docx;
pub mod pdf;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("PDF document error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF text extraction error: {0}")]
    PdfText(String),

    #[error("DOCX package error: {0}")]
    DocxArchive(#[from] zip::result::ZipError),

    #[error("DOCX content error: {0}")]
    DocxXml(#[from] quick_xml::Error),

    #[error("no text could be extracted from {}", .0.display())]
    NoText(PathBuf),
}

impl ExtractError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ExtractError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The closed set of formats the extractor dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
    Unsupported,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("pdf") => DocumentFormat::Pdf,
            Some("docx") => DocumentFormat::Docx,
            Some("txt") => DocumentFormat::PlainText,
            _ => DocumentFormat::Unsupported,
        }
    }
}

#[derive(Debug, Default)]
pub struct DocumentExtractor;

impl DocumentExtractor {
    /// Reports which extensions this extractor claims to support.
    ///
    /// Known gap: `.doc`, `.odt` and `.pptx` are listed here but `extract`
    /// rejects them; `supports_format` is the intake-side advertisement and
    /// has drifted from what the dispatch actually implements. Callers must
    /// not treat a `true` here as a promise that extraction will succeed.
    #[allow(dead_code)] // intake-side helper for the API layer above this crate
    pub fn supports_format(ext: &str) -> bool {
        const SUPPORTED: [&str; 6] = [".pdf", ".docx", ".doc", ".txt", ".odt", ".pptx"];
        SUPPORTED.contains(&ext.to_ascii_lowercase().as_str())
    }

    /// Extracts plain text from `path`, choosing a strategy by extension.
    /// Returns an error, never partial text, when the file is unreadable
    /// or the extension is not implemented.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let format = DocumentFormat::from_path(path);
        debug!(file = %path.display(), ?format, "dispatching extraction");
        match format {
            DocumentFormat::Pdf => pdf::extract(path),
            DocumentFormat::Docx => docx::extract(path),
            DocumentFormat::PlainText => read_plain_text(path),
            DocumentFormat::Unsupported => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| format!(".{}", e.to_ascii_lowercase()))
                    .unwrap_or_default();
                Err(ExtractError::UnsupportedFormat(ext))
            }
        }
    }
}

/// Plain text passes through verbatim. Decoding is lossy so a stray byte
/// degrades to U+FFFD instead of failing the whole read.
fn read_plain_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::io(path, source))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
