//! Document loading and text extraction.

use crate::types::Document;
use brandrag_core::{AppError, AppResult};
use std::fs;
use std::path::Path;
use std::process::Command;
use walkdir::WalkDir;

/// Supported document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Markdown,
    PlainText,
    Pdf,
}

impl DocumentKind {
    /// Detect the kind from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "md" => Some(Self::Markdown),
            "txt" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// Load every supported document from a flat directory.
///
/// Subdirectories are not descended into and unrecognized extensions are
/// skipped silently. A PDF that cannot be extracted is logged and skipped.
/// Documents are returned sorted by file name.
pub fn load_documents(dir: &Path) -> AppResult<Vec<Document>> {
    if !dir.is_dir() {
        tracing::warn!("Documents directory {:?} does not exist", dir);
        return Ok(Vec::new());
    }

    let mut documents = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(kind) = DocumentKind::from_path(path) else {
            continue;
        };

        let raw = match read_document(path, kind) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        let text = clean_text(&raw);
        if text.is_empty() {
            tracing::debug!("Skipping {:?}: no text", path);
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        tracing::debug!("Loaded {} ({} chars)", filename, text.chars().count());
        documents.push(Document::new(filename, text));
    }

    tracing::info!("Loaded {} documents from {:?}", documents.len(), dir);
    Ok(documents)
}

/// Read raw text from a document.
pub fn read_document(path: &Path, kind: DocumentKind) -> AppResult<String> {
    match kind {
        DocumentKind::Markdown | DocumentKind::PlainText => {
            let bytes = fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        DocumentKind::Pdf => extract_pdf_text(path),
    }
}

/// Extract text from a PDF with the `pdftotext` binary (poppler-utils).
fn extract_pdf_text(path: &Path) -> AppResult<String> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(path)
        .arg("-")
        .output()
        .map_err(|e| {
            AppError::Other(format!(
                "Failed to run pdftotext: {} (is poppler installed?)",
                e
            ))
        })?;

    if !output.status.success() {
        return Err(AppError::Other(format!(
            "pdftotext failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Collapse every whitespace run to a single space and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_document_kind_detection() {
        assert_eq!(
            DocumentKind::from_path(Path::new("voice.md")),
            Some(DocumentKind::Markdown)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("NOTES.TXT")),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("deck.pdf")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(DocumentKind::from_path(Path::new("logo.png")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(
            clean_text("  # Voice\n\nPlayful,\t warm.\r\n"),
            "# Voice Playful, warm."
        );
        assert_eq!(clean_text(" \n\t "), "");
    }

    #[test]
    fn test_load_documents_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.txt"), "Second\n\nfile").unwrap();
        fs::write(temp.path().join("a.md"), "# First\nfile").unwrap();
        fs::write(temp.path().join("image.png"), [0u8, 1, 2]).unwrap();
        fs::write(temp.path().join("empty.md"), "   \n").unwrap();
        fs::create_dir(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("nested").join("c.md"), "hidden").unwrap();

        let docs = load_documents(temp.path()).unwrap();

        assert_eq!(
            docs,
            vec![
                Document::new("a.md", "# First file"),
                Document::new("b.txt", "Second file"),
            ]
        );
    }

    #[test]
    fn test_invalid_utf8_is_read_lossily() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("odd.txt"), b"brand \xff voice").unwrap();

        let docs = load_documents(temp.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].text.starts_with("brand "));
        assert!(docs[0].text.ends_with(" voice"));
    }

    #[test]
    fn test_missing_directory_yields_nothing() {
        let temp = TempDir::new().unwrap();
        let docs = load_documents(&temp.path().join("nope")).unwrap();
        assert!(docs.is_empty());
    }
}
