//! Text loading for files whose content is already plain text.
//!
//! Binary formats (PDF, DOCX) are extracted upstream; this only reads what
//! can be read as UTF-8.

use deped_core::Result;
use std::path::Path;

/// Supported file types for text loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Markdown,
    Pdf,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Self::PlainText,
            "md" | "markdown" => Self::Markdown,
            "pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    /// Check if this is a text-based file type.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::PlainText | Self::Markdown)
    }
}

/// Read text content from a file. `Ok(None)` means nothing usable.
pub fn extract_text(path: &Path) -> Result<Option<String>> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let file_type = FileType::from_extension(ext);

    if file_type.is_text() {
        return Ok(Some(std::fs::read_to_string(path)?));
    }

    match file_type {
        FileType::Pdf => {
            tracing::warn!(
                "PDF text must be extracted before import, skipping: {}",
                path.display()
            );
            Ok(None)
        }
        _ => match std::fs::read_to_string(path) {
            Ok(content) => {
                let control = content
                    .chars()
                    .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
                    .count();
                if control > content.len() / 10 {
                    Ok(None) // Likely binary
                } else {
                    Ok(Some(content))
                }
            }
            Err(_) => Ok(None), // Not UTF-8
        },
    }
}
