//! HuggingFace Inference API client for zero-shot classification.
//!
//! This client uses HuggingFace's serverless inference endpoints.
//! See: <https://huggingface.co/docs/api-inference/index>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::ClassifyProvider;
use crate::types::Classification;
use crate::{DocclassError, Result};

/// Default base URL for HuggingFace Inference API
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// Default hosted zero-shot model.
pub const DEFAULT_MODEL: &str = "typeform/distilbert-base-uncased-mnli";

/// Client for the HuggingFace zero-shot classification pipeline.
#[derive(Clone)]
pub struct HuggingFaceClient {
    api_key: String,
    http: Client,
    base_url: String,
    model: String,
    hypothesis_template: Option<String>,
}

impl HuggingFaceClient {
    /// Create a new HuggingFace client with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| DocclassError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            hypothesis_template: None,
        })
    }

    /// Override the hypothesis template sent with each request (e.g. `"This example is {}."`).
    pub fn hypothesis_template(mut self, template: impl Into<String>) -> Self {
        self.hypothesis_template = Some(template.into());
        self
    }

    /// Model ID requests are sent to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Perform zero-shot classification.
    ///
    /// # Arguments
    /// * `text` - Text to classify
    /// * `labels` - Candidate labels
    pub async fn classify(&self, text: &str, labels: &[&str]) -> Result<Classification> {
        let url = format!("{}/models/{}", self.base_url, self.model);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&ZeroShotRequest {
                inputs: text,
                parameters: ZeroShotParameters {
                    candidate_labels: labels.to_vec(),
                    hypothesis_template: self.hypothesis_template.as_deref(),
                },
            })
            .send()
            .await
            .map_err(|e| DocclassError::Http(e.to_string()))?;

        self.handle_response_errors(&response)?;

        let result: ZeroShotResponse = response
            .json()
            .await
            .map_err(|e| DocclassError::Http(e.to_string()))?;

        if result.labels.is_empty() || result.labels.len() != result.scores.len() {
            return Err(DocclassError::EmptyResponse);
        }

        debug!(
            model = %self.model,
            top = %result.labels[0],
            "zero-shot response received"
        );

        Ok(Classification::from_scores(
            &result.labels,
            &result.scores,
            self.model.clone(),
        ))
    }

    /// Check response status and map to appropriate error.
    fn handle_response_errors(&self, response: &reqwest::Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        match status.as_u16() {
            401 => Err(DocclassError::AuthenticationFailed),
            404 => Err(DocclassError::ModelNotFound(self.model.clone())),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(DocclassError::RateLimited { retry_after })
            }
            503 => Err(DocclassError::Api {
                status: 503,
                message: "Model is loading, please retry".to_string(),
            }),
            code => Err(DocclassError::Api {
                status: code,
                message: format!("HuggingFace API error: {}", status),
            }),
        }
    }
}

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hypothesis_template: Option<&'a str>,
}

#[derive(Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

#[async_trait]
impl ClassifyProvider for HuggingFaceClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    async fn classify_zero_shot(&self, text: &str, labels: &[&str]) -> Result<Classification> {
        HuggingFaceClient::classify(self, text, labels).await
    }
}
