//! The single JSON object printed per invocation.

use serde::{Deserialize, Serialize};

use super::ClassificationResult;
use crate::DocclassError;

/// Outcome of one classification run: a result or an error message, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Report {
    Classified(ClassificationResult),
    Error { error: String },
}

impl Report {
    /// Error report with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Render as one line of JSON (no trailing newline).
    pub fn to_json_line(&self) -> String {
        // Unreachable for these variants.
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                "{{\"error\":{}}}",
                serde_json::Value::String(e.to_string())
            )
        })
    }
}

impl From<ClassificationResult> for Report {
    fn from(result: ClassificationResult) -> Self {
        Self::Classified(result)
    }
}

impl From<DocclassError> for Report {
    fn from(err: DocclassError) -> Self {
        Self::error(err.to_string())
    }
}

impl From<crate::Result<ClassificationResult>> for Report {
    fn from(result: crate::Result<ClassificationResult>) -> Self {
        match result {
            Ok(r) => r.into(),
            Err(e) => e.into(),
        }
    }
}
