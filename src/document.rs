//! PDF text loading.
//!
//! Only the leading [`MAX_TEXT_CHARS`] characters of a document are kept;
//! that is all the classifier ever sees.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{DocclassError, Result};

/// Characters of extracted text passed on to the classifier.
pub const MAX_TEXT_CHARS: usize = 1000;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Text extracted from a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    /// Leading text, at most [`MAX_TEXT_CHARS`] characters.
    pub text: String,
}

impl Document {
    /// Extract and truncate the text of the PDF at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let full = extract_text(path)?;
        let text = truncate_chars(&full, MAX_TEXT_CHARS).to_string();

        debug!(
            path = %path.display(),
            extracted_chars = full.chars().count(),
            kept_chars = text.chars().count(),
            "loaded document"
        );

        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// True when there is nothing but whitespace to classify.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Extract all embedded text from the PDF at `path`.
pub fn extract_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| DocclassError::io(path, e))?;
    extract_text_from_mem(&bytes).map_err(|e| match e {
        DocclassError::InvalidPdf(_) => DocclassError::InvalidPdf(path.to_path_buf()),
        other => other,
    })
}

/// Extract all embedded text from an in-memory PDF.
pub fn extract_text_from_mem(bytes: &[u8]) -> Result<String> {
    if !is_pdf(bytes) {
        return Err(DocclassError::InvalidPdf(PathBuf::from("<memory>")));
    }

    // pdf-extract panics on some malformed files instead of returning an error.
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DocclassError::Extraction(e.to_string())),
        Err(payload) => Err(DocclassError::Extraction(panic_message(payload.as_ref()))),
    }
}

/// Whether the PDF header appears in the first kilobyte, where readers accept it.
pub fn is_pdf(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// The first `max` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "malformed PDF".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_text_unchanged() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let text = "é".repeat(1500);
        let truncated = truncate_chars(&text, MAX_TEXT_CHARS);
        assert_eq!(truncated.chars().count(), MAX_TEXT_CHARS);
        assert_eq!(truncated.len(), 2 * MAX_TEXT_CHARS);
    }

    #[test]
    fn truncate_exact_length() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcd", 3), "abc");
    }

    #[test]
    fn magic_bytes() {
        assert!(is_pdf(b"%PDF-1.7\n..."));
        assert!(is_pdf(b"\xef\xbb\xbf%PDF-1.4"));
        assert!(!is_pdf(b"PK\x03\x04"));
        assert!(!is_pdf(b""));
    }

    #[test]
    fn non_pdf_bytes_rejected() {
        let err = extract_text_from_mem(b"plain text").unwrap_err();
        assert!(matches!(err, DocclassError::InvalidPdf(_)));
    }

    #[test]
    fn truncated_pdf_is_extraction_error() {
        let err = extract_text_from_mem(b"%PDF-1.4\n1 0 obj\n<<").unwrap_err();
        assert!(matches!(err, DocclassError::Extraction(_)));
    }

    #[test]
    fn blank_document() {
        let doc = Document {
            path: PathBuf::from("x.pdf"),
            text: " \n\t ".to_string(),
        };
        assert!(doc.is_blank());
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = Document::load("/nonexistent/file.pdf").unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("/nonexistent/file.pdf"));
    }
}
