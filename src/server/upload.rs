//! Multipart upload parsing.

use std::io::Write;

use axum::extract::Multipart;

use crate::document::is_pdf;
use crate::{DocclassError, Result};

/// Form field carrying the document.
const FILE_FIELD: &str = "file";

/// An uploaded file with its data and metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Accepted when declared as `application/pdf` or carrying the PDF header.
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some("application/pdf") || is_pdf(&self.data)
    }

    /// Write the upload to a temp file that is deleted on drop.
    pub fn persist_temp(&self) -> Result<tempfile::NamedTempFile> {
        let mut temp = tempfile::Builder::new()
            .prefix("docclass-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| DocclassError::io(std::env::temp_dir(), e))?;
        temp.write_all(&self.data)
            .map_err(|e| DocclassError::io(temp.path(), e))?;
        Ok(temp)
    }
}

/// Pull the `file` field out of a multipart form; other fields are skipped.
pub async fn parse_multipart(mut multipart: Multipart) -> std::result::Result<Option<UploadedFile>, String> {
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {e}"))?
    {
        if field.name() != Some(FILE_FIELD) {
            let _ = field.bytes().await;
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| format!("Failed to read file data: {e}"))?
            .to_vec();

        file = Some(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    Ok(file)
}
