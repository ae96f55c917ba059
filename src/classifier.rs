//! Document classification: load a PDF, score it against the fixed
//! categories, report the top one.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::config::{Backend, Config, Secrets};
use crate::document::Document;
use crate::providers::ClassifyProvider;
use crate::telemetry;
use crate::types::{Category, Classification, ClassificationResult, Report};
use crate::{DocclassError, Result};

#[cfg(feature = "local-inference")]
use crate::model::{Device, ModelSource};
#[cfg(feature = "local-inference")]
use crate::providers::{LocalZeroShotModel, OnnxZeroShotProvider};

/// Classifies documents into one of the [`Category`] labels.
///
/// Cheap to clone; clones share the loaded model.
#[derive(Clone)]
pub struct DocumentClassifier {
    provider: Arc<dyn ClassifyProvider>,
    labels: Vec<&'static str>,
}

impl std::fmt::Debug for DocumentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentClassifier")
            .field("provider", &self.provider.name())
            .field("labels", &self.labels)
            .finish()
    }
}

impl DocumentClassifier {
    /// Create a new builder for configuring the classifier.
    pub fn builder() -> DocumentClassifierBuilder {
        DocumentClassifierBuilder::new()
    }

    /// Classifier over an already constructed provider.
    pub fn new(provider: Arc<dyn ClassifyProvider>) -> Self {
        Self {
            provider,
            labels: Category::labels().to_vec(),
        }
    }

    /// Build the classifier selected by `config`, loading the model.
    #[cfg_attr(not(feature = "huggingface"), allow(unused_variables))]
    pub fn from_config(config: &Config, secrets: &Secrets) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(template) = &config.classifier.hypothesis_template {
            builder = builder.hypothesis_template(template.clone());
        }

        match config.classifier.backend {
            Backend::Local => {
                #[cfg(feature = "local-inference")]
                {
                    let local = &config.local;
                    let source = match &local.model_dir {
                        Some(dir) => ModelSource::local(dir),
                        None => ModelSource::huggingface_cached(&local.repo, local.cache_dir()),
                    };
                    let model = LocalZeroShotModel {
                        source,
                        onnx_file: local.onnx_file.clone(),
                        tokenizer_file: local.tokenizer_file.clone(),
                        config_file: local.config_file.clone(),
                        max_length: local.max_length,
                    };
                    builder = builder.local(model).device(local.device.parse()?);
                }
                #[cfg(not(feature = "local-inference"))]
                return Err(DocclassError::Configuration(
                    "backend \"local\" requires the `local-inference` feature".to_string(),
                ));
            }
            Backend::HuggingFace => {
                #[cfg(feature = "huggingface")]
                {
                    let api_key = secrets.huggingface_api_key().ok_or_else(|| {
                        DocclassError::Configuration(format!(
                            "no HuggingFace API key (set {} or add it to secrets.toml)",
                            crate::config::HF_API_KEY_ENV_VAR
                        ))
                    })?;
                    builder = builder.huggingface(
                        api_key,
                        &config.huggingface.model,
                        &config.huggingface.base_url,
                    );
                }
                #[cfg(not(feature = "huggingface"))]
                return Err(DocclassError::Configuration(
                    "backend \"huggingface\" requires the `huggingface` feature".to_string(),
                ));
            }
        }

        builder.build()
    }

    /// Name of the backing provider.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Candidate labels, in the order they are sent to the model.
    pub fn labels(&self) -> &[&'static str] {
        &self.labels
    }

    /// All label scores for `text`, highest first.
    pub async fn rank(&self, text: &str) -> Result<Classification> {
        if text.trim().is_empty() {
            return Err(DocclassError::NoText);
        }

        let start = Instant::now();
        let result = self.provider.classify_zero_shot(text, &self.labels).await;
        record_classification(self.provider.name(), start, result.is_ok());
        result
    }

    /// Top category and its score for `text`.
    #[instrument(skip(self, text), fields(provider = self.provider.name(), chars = text.chars().count()))]
    pub async fn classify_text(&self, text: &str) -> Result<ClassificationResult> {
        let classification = self.rank(text).await?;
        let result = ClassificationResult::try_from(&classification)?;
        info!(
            category = %result.category,
            confidence = result.confidence,
            model = %classification.model,
            "classified"
        );
        Ok(result)
    }

    /// Classify already loaded document text.
    pub async fn classify_loaded(&self, document: &Document) -> Result<ClassificationResult> {
        if document.is_blank() {
            return Err(DocclassError::NoText);
        }
        metrics::histogram!(telemetry::EXTRACTED_CHARS).record(document.text.chars().count() as f64);
        self.classify_text(&document.text).await
    }

    /// Load, classify and report on the PDF at `path`. Never fails: every
    /// error becomes [`Report::Error`].
    pub async fn classify_document(&self, path: impl AsRef<Path>) -> Report {
        let path = path.as_ref().to_path_buf();
        let loaded = tokio::task::spawn_blocking(move || Document::load(&path))
            .await
            .map_err(|e| DocclassError::Extraction(format!("loader task failed: {e}")));

        let document = match loaded {
            Ok(Ok(document)) => document,
            Ok(Err(e)) | Err(e) => {
                debug!(error = %e, "document load failed");
                return e.into();
            }
        };

        self.classify_loaded(&document).await.into()
    }
}

fn record_classification(provider: &str, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::CLASSIFICATIONS_TOTAL,
        "provider" => provider.to_owned(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::CLASSIFY_DURATION_SECONDS,
        "provider" => provider.to_owned(),
    )
    .record(start.elapsed().as_secs_f64());
}

/// Builder for [`DocumentClassifier`].
///
/// An explicit provider wins over a local model, which wins over the
/// HuggingFace API.
#[derive(Default)]
pub struct DocumentClassifierBuilder {
    provider: Option<Arc<dyn ClassifyProvider>>,
    hypothesis_template: Option<String>,
    #[cfg(feature = "huggingface")]
    huggingface: Option<HuggingFaceSettings>,
    #[cfg(feature = "local-inference")]
    local_model: Option<LocalZeroShotModel>,
    #[cfg(feature = "local-inference")]
    device: Device,
}

#[cfg(feature = "huggingface")]
struct HuggingFaceSettings {
    api_key: String,
    model: String,
    base_url: String,
}

impl DocumentClassifierBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom provider (e.g. a test double).
    pub fn provider(mut self, provider: Arc<dyn ClassifyProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Override the NLI hypothesis template. `{}` marks where the label goes.
    pub fn hypothesis_template(mut self, template: impl Into<String>) -> Self {
        self.hypothesis_template = Some(template.into());
        self
    }

    /// Classify through the HuggingFace Inference API.
    #[cfg(feature = "huggingface")]
    pub fn huggingface(
        mut self,
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        self.huggingface = Some(HuggingFaceSettings {
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        });
        self
    }

    /// Classify locally with ONNX Runtime.
    #[cfg(feature = "local-inference")]
    pub fn local(mut self, model: LocalZeroShotModel) -> Self {
        self.local_model = Some(model);
        self
    }

    /// Set the device for local inference (default: CPU).
    #[cfg(feature = "local-inference")]
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Set the cache directory for model downloads.
    #[cfg(feature = "local-inference")]
    pub fn cache_dir(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        let model = self.local_model.take().unwrap_or_default();
        let source = match model.source {
            ModelSource::HuggingFace { repo_id, .. } => {
                ModelSource::huggingface_cached(repo_id, path)
            }
            local @ ModelSource::Local { .. } => local,
        };
        self.local_model = Some(LocalZeroShotModel { source, ..model });
        self
    }

    /// Build the classifier. Loads the local model, if one is configured.
    pub fn build(self) -> Result<DocumentClassifier> {
        if let Some(provider) = self.provider {
            return Ok(DocumentClassifier::new(provider));
        }

        #[cfg(feature = "local-inference")]
        if let Some(model) = self.local_model {
            let mut provider = OnnxZeroShotProvider::new(model, self.device)?;
            if let Some(template) = &self.hypothesis_template {
                provider = provider.with_hypothesis_template(template.clone());
            }
            return Ok(DocumentClassifier::new(Arc::new(provider)));
        }

        #[cfg(feature = "huggingface")]
        if let Some(hf) = self.huggingface {
            let mut client =
                crate::providers::HuggingFaceClient::with_base_url(hf.api_key, hf.model, hf.base_url)?;
            if let Some(template) = &self.hypothesis_template {
                client = client.hypothesis_template(template.clone());
            }
            return Ok(DocumentClassifier::new(Arc::new(client)));
        }

        Err(DocclassError::Configuration(
            "no classifier backend configured".to_string(),
        ))
    }
}
