//! Provider trait for zero-shot classification backends.
//!
//! The classifier only talks to a `ClassifyProvider`, so the local ONNX
//! model, the HuggingFace Inference API, and test doubles are interchangeable.
//!
//! # Example
//!
//! ```ignore
//! struct AlwaysHealth;
//!
//! #[async_trait]
//! impl ClassifyProvider for AlwaysHealth {
//!     fn name(&self) -> &str { "always-health" }
//!
//!     async fn classify_zero_shot(&self, _text: &str, labels: &[&str]) -> Result<Classification> {
//!         let scores: Vec<f32> = labels.iter().map(|l| if *l == "Health" { 1.0 } else { 0.0 }).collect();
//!         Ok(Classification::from_scores(labels, &scores, "always-health"))
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::types::Classification;

/// Provider for zero-shot text classification.
#[async_trait]
pub trait ClassifyProvider: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Score `text` against every candidate label.
    ///
    /// Returns all labels ranked by descending score.
    async fn classify_zero_shot(&self, text: &str, labels: &[&str]) -> Result<Classification>;
}

#[async_trait]
impl<T: ClassifyProvider + ?Sized> ClassifyProvider for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn classify_zero_shot(&self, text: &str, labels: &[&str]) -> Result<Classification> {
        (**self).classify_zero_shot(text, labels).await
    }
}
