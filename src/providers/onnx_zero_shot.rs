//! Local zero-shot classification via ONNX Runtime.
//!
//! Uses an NLI cross-encoder the same way the `transformers` zero-shot
//! pipeline does: each candidate label becomes a hypothesis
//! (`"This example is {label}."`), the document text is the premise, and the
//! entailment logits of all hypotheses are softmaxed into label scores.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use serde::Deserialize;
use tokenizers::{Tokenizer, TruncationParams, TruncationStrategy};
use tracing::{debug, info, warn};

use super::traits::ClassifyProvider;
use crate::error::{DocclassError, Result};
use crate::model::{Device, ModelSource};
use crate::types::Classification;

/// ONNX export of `typeform/distilbert-base-uncased-mnli`.
pub const DEFAULT_REPO: &str = "Xenova/distilbert-base-uncased-mnli";

/// Hypothesis template; `{}` is replaced by the candidate label.
pub const DEFAULT_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// Maximum sequence length of the BERT-family NLI models.
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Model types whose ONNX exports take a `token_type_ids` input.
const TOKEN_TYPE_MODELS: &[&str] = &[
    "bert",
    "albert",
    "electra",
    "mobilebert",
    "deberta",
    "deberta-v2",
];

/// Files making up a local zero-shot model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalZeroShotModel {
    pub source: ModelSource,
    pub onnx_file: String,
    pub tokenizer_file: String,
    pub config_file: String,
    pub max_length: usize,
}

impl LocalZeroShotModel {
    /// Standard file layout for `source`.
    pub fn new(source: ModelSource) -> Self {
        Self {
            source,
            onnx_file: "onnx/model.onnx".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            config_file: "config.json".to_string(),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Name for display and results.
    pub fn name(&self) -> String {
        self.source.name()
    }
}

impl Default for LocalZeroShotModel {
    fn default() -> Self {
        Self::new(ModelSource::huggingface(DEFAULT_REPO))
    }
}

/// Layout of the NLI classification head, read from the model's `config.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NliHead {
    /// Logit index of the entailment class.
    pub entailment_id: usize,
    /// Number of output logits.
    pub num_labels: usize,
    /// Whether the ONNX graph takes `token_type_ids`.
    pub uses_token_type_ids: bool,
}

#[derive(Deserialize)]
struct RawModelConfig {
    #[serde(default)]
    model_type: Option<String>,
    #[serde(default)]
    id2label: HashMap<String, String>,
}

impl Default for NliHead {
    /// MNLI head without a config: entailment / neutral / contradiction.
    fn default() -> Self {
        Self {
            entailment_id: 0,
            num_labels: 3,
            uses_token_type_ids: false,
        }
    }
}

impl NliHead {
    /// Parse a HuggingFace `config.json`.
    ///
    /// The entailment class is the label starting with "entail"
    /// (case-insensitive); when none does, the last logit is used.
    pub fn from_config_json(json: &str) -> Result<Self> {
        let raw: RawModelConfig = serde_json::from_str(json)?;

        let num_labels = if raw.id2label.is_empty() {
            3
        } else {
            raw.id2label.len()
        };

        let mut entailment_id = None;
        for (id, label) in &raw.id2label {
            if label.to_lowercase().starts_with("entail") {
                let id = id.parse::<usize>().map_err(|_| {
                    DocclassError::Configuration(format!("invalid id2label key: {id}"))
                })?;
                entailment_id = Some(id);
            }
        }
        let entailment_id = entailment_id.unwrap_or(num_labels - 1);
        if entailment_id >= num_labels {
            return Err(DocclassError::Configuration(format!(
                "entailment id {entailment_id} out of range for {num_labels} labels"
            )));
        }

        let uses_token_type_ids = raw
            .model_type
            .as_deref()
            .is_some_and(|t| TOKEN_TYPE_MODELS.contains(&t));

        Ok(Self {
            entailment_id,
            num_labels,
            uses_token_type_ids,
        })
    }
}

/// Local zero-shot provider using ONNX Runtime.
///
/// The session needs exclusive access to run, so concurrent callers are
/// serialized on a mutex and inference runs on tokio's blocking pool.
#[derive(Clone)]
pub struct OnnxZeroShotProvider {
    inner: Arc<Mutex<NliSession>>,
    model_name: String,
    hypothesis_template: String,
}

struct NliSession {
    session: Session,
    tokenizer: Tokenizer,
    head: NliHead,
}

impl OnnxZeroShotProvider {
    /// Load the model, downloading files if not cached locally.
    pub fn new(model: LocalZeroShotModel, device: Device) -> Result<Self> {
        let model_name = model.name();
        info!(model = %model_name, device = device.name(), "loading zero-shot model");

        let model_path = model.source.resolve_file(&model.onnx_file)?;
        let tokenizer_path = model.source.resolve_file(&model.tokenizer_file)?;
        let head = match model.source.try_resolve_file(&model.config_file)? {
            Some(path) => {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| DocclassError::io(&path, e))?;
                NliHead::from_config_json(&content)?
            }
            None => {
                warn!(
                    model = %model_name,
                    file = %model.config_file,
                    "no model config; assuming MNLI head with entailment at index 0"
                );
                NliHead::default()
            }
        };
        debug!(?head, "NLI head");

        let session = build_session(&model_path, &device)?;
        let tokenizer = load_tokenizer(&tokenizer_path, model.max_length)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(NliSession {
                session,
                tokenizer,
                head,
            })),
            model_name,
            hypothesis_template: DEFAULT_HYPOTHESIS_TEMPLATE.to_string(),
        })
    }

    /// Override the hypothesis template. `{}` marks where the label goes.
    pub fn with_hypothesis_template(mut self, template: impl Into<String>) -> Self {
        self.hypothesis_template = template.into();
        self
    }

    /// Model name for display.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Classify on the current thread.
    pub fn classify_blocking(&self, text: &str, labels: &[&str]) -> Result<Classification> {
        if labels.is_empty() {
            return Err(DocclassError::InvalidInput(
                "at least one candidate label is required".to_string(),
            ));
        }

        let mut nli = self
            .inner
            .lock()
            .map_err(|e| DocclassError::Inference(format!("session lock poisoned: {e}")))?;

        let mut entailment_logits = Vec::with_capacity(labels.len());
        for label in labels {
            let hypothesis = hypothesis(&self.hypothesis_template, label);
            let logits = nli.infer_pair(text, &hypothesis)?;
            entailment_logits.push(logits[nli.head.entailment_id]);
        }

        let scores = softmax(&entailment_logits);
        Ok(Classification::from_scores(
            labels,
            &scores,
            self.model_name.clone(),
        ))
    }
}

impl NliSession {
    /// Logits for one premise-hypothesis pair.
    fn infer_pair(&mut self, premise: &str, hypothesis: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask, token_type_ids) = self.encode_pair(premise, hypothesis)?;
        let type_ids = self
            .head
            .uses_token_type_ids
            .then_some(token_type_ids.as_slice());

        let mut outputs = self.run_inference(&input_ids, &attention_mask, type_ids)?;
        let logits = outputs.pop().ok_or(DocclassError::EmptyResponse)?;
        if logits.len() != self.head.num_labels {
            return Err(DocclassError::Inference(format!(
                "Expected {} logits, got {}",
                self.head.num_labels,
                logits.len()
            )));
        }
        Ok(logits)
    }

    /// Encode a premise-hypothesis pair for the model.
    fn encode_pair(
        &self,
        premise: &str,
        hypothesis: &str,
    ) -> Result<(Vec<i64>, Vec<i64>, Vec<i64>)> {
        let encoding = self
            .tokenizer
            .encode((premise, hypothesis), true)
            .map_err(|e| DocclassError::Tokenization(e.to_string()))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding
            .get_type_ids()
            .iter()
            .map(|&t| t as i64)
            .collect();

        Ok((input_ids, attention_mask, token_type_ids))
    }

    /// Run the ONNX session, returning one logits row per batch entry.
    fn run_inference(
        &mut self,
        input_ids: &[i64],
        attention_mask: &[i64],
        token_type_ids: Option<&[i64]>,
    ) -> Result<Vec<Vec<f32>>> {
        use ort::value::TensorRef;

        let seq_len = input_ids.len();
        let shape = [1_usize, seq_len];

        let input_ids_tensor = TensorRef::from_array_view((shape, input_ids)).map_err(|e| {
            DocclassError::Inference(format!("Failed to create input_ids tensor: {}", e))
        })?;

        let attention_mask_tensor =
            TensorRef::from_array_view((shape, attention_mask)).map_err(|e| {
                DocclassError::Inference(format!("Failed to create attention_mask tensor: {}", e))
            })?;

        let outputs = if let Some(type_ids) = token_type_ids {
            let token_type_ids_tensor =
                TensorRef::from_array_view((shape, type_ids)).map_err(|e| {
                    DocclassError::Inference(format!(
                        "Failed to create token_type_ids tensor: {}",
                        e
                    ))
                })?;
            self.session
                .run(ort::inputs![
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor,
                ])
                .map_err(|e| DocclassError::Inference(format!("ONNX inference failed: {}", e)))?
        } else {
            self.session
                .run(ort::inputs![
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                ])
                .map_err(|e| DocclassError::Inference(format!("ONNX inference failed: {}", e)))?
        };

        let logits = outputs
            .get("logits")
            .ok_or_else(|| DocclassError::Inference("No logits output found".to_string()))?;

        // try_extract_tensor returns (&Shape, &[T])
        let (tensor_shape, logits_data) = logits.try_extract_tensor::<f32>().map_err(|e| {
            DocclassError::Inference(format!("Failed to extract logits: {}", e))
        })?;

        let batch_size = tensor_shape[0] as usize;
        let num_labels = tensor_shape[1] as usize;

        let mut results = Vec::with_capacity(batch_size);
        for i in 0..batch_size {
            let start = i * num_labels;
            let end = start + num_labels;
            results.push(logits_data[start..end].to_vec());
        }

        Ok(results)
    }
}

#[async_trait]
impl ClassifyProvider for OnnxZeroShotProvider {
    fn name(&self) -> &str {
        "onnx"
    }

    async fn classify_zero_shot(&self, text: &str, labels: &[&str]) -> Result<Classification> {
        let provider = self.clone();
        let text = text.to_string();
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();

        tokio::task::spawn_blocking(move || {
            let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
            provider.classify_blocking(&text, &labels)
        })
        .await
        .map_err(|e| DocclassError::Inference(format!("inference task failed: {e}")))?
    }
}

/// Turn a label into an NLI hypothesis.
fn hypothesis(template: &str, label: &str) -> String {
    if template.contains("{}") {
        template.replacen("{}", label, 1)
    } else {
        format!("{template} {label}")
    }
}

/// Softmax function.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

fn load_tokenizer(path: &Path, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
        DocclassError::Configuration(format!("Failed to load tokenizer from {:?}: {}", path, e))
    })?;

    // Long documents lose the tail of the premise, never the hypothesis.
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            strategy: TruncationStrategy::OnlyFirst,
            ..Default::default()
        }))
        .map_err(|e| DocclassError::Configuration(format!("Invalid truncation: {}", e)))?;
    tokenizer.with_padding(None);

    Ok(tokenizer)
}

/// Build an ONNX session with the appropriate execution provider.
fn build_session(model_path: &Path, device: &Device) -> Result<Session> {
    let builder = Session::builder()
        .map_err(|e| {
            DocclassError::Configuration(format!("Failed to create session builder: {}", e))
        })?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| {
            DocclassError::Configuration(format!("Failed to set optimization level: {}", e))
        })?;

    let mut builder = match device {
        Device::Cpu => builder,
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::CUDAExecutionProvider;
            builder
                .with_execution_providers([CUDAExecutionProvider::default()
                    .with_device_id(*device_id as i32)
                    .build()])
                .map_err(|e| {
                    DocclassError::Configuration(format!("Failed to configure CUDA: {}", e))
                })?
        }
    };

    builder
        .commit_from_file(model_path)
        .map_err(|e| DocclassError::Configuration(format!("Failed to load ONNX model: {}", e)))
}
