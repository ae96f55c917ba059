//! Model source and download logic.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DocclassError, Result};

/// Where model files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Download from a HuggingFace Hub repository (cached).
    HuggingFace {
        /// Repository ID (e.g., "Xenova/distilbert-base-uncased-mnli").
        repo_id: String,
        /// Download cache directory; hf-hub's default when unset.
        cache_dir: Option<PathBuf>,
    },

    /// Read from a local directory laid out like the hub repository.
    Local {
        /// Directory holding the model files.
        dir: PathBuf,
    },
}

impl ModelSource {
    /// Create a HuggingFace source.
    pub fn huggingface(repo_id: impl Into<String>) -> Self {
        Self::HuggingFace {
            repo_id: repo_id.into(),
            cache_dir: None,
        }
    }

    /// Create a HuggingFace source with an explicit cache directory.
    pub fn huggingface_cached(repo_id: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self::HuggingFace {
            repo_id: repo_id.into(),
            cache_dir: Some(cache_dir.into()),
        }
    }

    /// Create a local source.
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self::Local { dir: dir.into() }
    }

    /// Name used in logs and classification results.
    pub fn name(&self) -> String {
        match self {
            Self::HuggingFace { repo_id, .. } => repo_id.clone(),
            Self::Local { dir } => dir
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("local")
                .to_string(),
        }
    }

    /// Resolve one file of the model to a local path, downloading if needed.
    pub fn resolve_file(&self, file: &str) -> Result<PathBuf> {
        match self {
            Self::HuggingFace { repo_id, cache_dir } => {
                let api = hub_api(cache_dir.as_deref())?;
                let path = api.model(repo_id.clone()).get(file).map_err(|e| {
                    DocclassError::Configuration(format!(
                        "Failed to download {} from {}: {}",
                        file, repo_id, e
                    ))
                })?;
                debug!(repo = %repo_id, file, path = %path.display(), "resolved model file");
                Ok(path)
            }
            Self::Local { dir } => {
                let path = dir.join(file);
                if !local_file_exists(&path)? {
                    return Err(DocclassError::Configuration(format!(
                        "Local model file does not exist: {}",
                        path.display()
                    )));
                }
                Ok(path)
            }
        }
    }

    /// Like [`resolve_file`](Self::resolve_file), but a file the source does
    /// not have is `Ok(None)`. Network, permission and cache failures are
    /// still errors.
    pub fn try_resolve_file(&self, file: &str) -> Result<Option<PathBuf>> {
        match self {
            Self::HuggingFace { repo_id, cache_dir } => {
                let cache = match cache_dir {
                    Some(dir) => hf_hub::Cache::new(dir.clone()),
                    None => hf_hub::Cache::default(),
                };
                if let Some(path) = cache.model(repo_id.clone()).get(file) {
                    return Ok(Some(path));
                }

                let info = hub_api(cache_dir.as_deref())?
                    .model(repo_id.clone())
                    .info()
                    .map_err(|e| {
                        DocclassError::Configuration(format!(
                            "Failed to list files of {}: {}",
                            repo_id, e
                        ))
                    })?;
                if !info.siblings.iter().any(|s| s.rfilename == file) {
                    debug!(repo = %repo_id, file, "file not in repository");
                    return Ok(None);
                }
                self.resolve_file(file).map(Some)
            }
            Self::Local { dir } => {
                let path = dir.join(file);
                Ok(local_file_exists(&path)?.then_some(path))
            }
        }
    }
}

/// `false` only when the file is genuinely absent.
fn local_file_exists(path: &Path) -> Result<bool> {
    path.try_exists().map_err(|e| DocclassError::io(path, e))
}

fn hub_api(cache_dir: Option<&Path>) -> Result<hf_hub::api::sync::Api> {
    let mut builder = hf_hub::api::sync::ApiBuilder::new().with_progress(false);
    if let Some(dir) = cache_dir {
        builder = builder.with_cache_dir(dir.to_path_buf());
    }
    builder.build().map_err(|e| {
        DocclassError::Configuration(format!("Failed to initialize HF API: {}", e))
    })
}
