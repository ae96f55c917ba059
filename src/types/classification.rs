//! Zero-shot classification output types.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::Category;
use crate::{DocclassError, Result};

/// A label with confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Label name.
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// All candidate labels for one text, ranked by descending score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub predictions: Vec<Prediction>,
    /// Model that produced the scores.
    pub model: String,
}

impl Classification {
    /// Pair labels with scores and rank them, highest first.
    ///
    /// Extra labels or scores beyond the shorter of the two are dropped.
    /// Ties keep the input order.
    pub fn from_scores<S: AsRef<str>>(
        labels: &[S],
        scores: &[f32],
        model: impl Into<String>,
    ) -> Self {
        let mut predictions: Vec<Prediction> = labels
            .iter()
            .zip(scores.iter())
            .map(|(label, &score)| Prediction {
                label: label.as_ref().to_string(),
                score,
            })
            .collect();
        predictions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        Self {
            predictions,
            model: model.into(),
        }
    }

    /// Highest-ranked prediction, if any.
    pub fn top(&self) -> Option<&Prediction> {
        self.predictions.first()
    }

    /// Score for a label, if it was ranked.
    pub fn score(&self, label: &str) -> Option<f32> {
        self.predictions
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.score)
    }
}

/// The reported outcome of a successful classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub confidence: f32,
}

impl TryFrom<&Classification> for ClassificationResult {
    type Error = DocclassError;

    fn try_from(classification: &Classification) -> Result<Self> {
        let top = classification.top().ok_or(DocclassError::EmptyResponse)?;
        if !top.score.is_finite() {
            return Err(DocclassError::Inference(format!(
                "non-finite score for label {}",
                top.label
            )));
        }

        Ok(Self {
            category: top.label.parse()?,
            confidence: top.score.clamp(0.0, 1.0),
        })
    }
}
