//! Configuration loading.
//!
//! Configuration is loaded from a TOML file with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `$DOCCLASS_CONFIG`
//! 3. `~/.docclass/config.toml` (user)
//! 4. `/etc/docclass/config.toml` (system)
//!
//! When none exists the built-in defaults are used, so the CLI works without
//! any setup.
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.docclass/secrets.toml` (user, must be 0600)
//! 2. `/etc/docclass/secrets.toml` (system, must be 0600)

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{DocclassError, Result};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "DOCCLASS_CONFIG";

/// Environment variable overriding the model download cache.
pub const CACHE_DIR_ENV_VAR: &str = "DOCCLASS_CACHE_DIR";

/// Environment variable holding the HuggingFace API key.
pub const HF_API_KEY_ENV_VAR: &str = "HF_API_KEY";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which backend scores documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local ONNX Runtime inference.
    Local,
    /// HuggingFace Inference API.
    HuggingFace,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(feature = "local-inference") {
            Self::Local
        } else {
            Self::HuggingFace
        }
    }
}

/// Classifier settings shared by all backends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub backend: Backend,
    /// NLI hypothesis template; `{}` is replaced by the label.
    #[serde(default)]
    pub hypothesis_template: Option<String>,
}

/// Local inference configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    /// HuggingFace repository to download the model from.
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_onnx_file")]
    pub onnx_file: String,
    #[serde(default = "default_tokenizer_file")]
    pub tokenizer_file: String,
    #[serde(default = "default_config_file")]
    pub config_file: String,
    /// Load model files from this directory instead of the hub.
    #[serde(default)]
    pub model_dir: Option<PathBuf>,
    /// Directory for model downloads.
    #[serde(default)]
    pub models_dir: Option<PathBuf>,
    /// Device to use: "cpu" or "cuda" (default: "cpu").
    #[serde(default = "default_device")]
    pub device: String,
    /// Maximum tokens per premise-hypothesis pair.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            onnx_file: default_onnx_file(),
            tokenizer_file: default_tokenizer_file(),
            config_file: default_config_file(),
            model_dir: None,
            models_dir: None,
            device: default_device(),
            max_length: default_max_length(),
        }
    }
}

impl LocalConfig {
    /// Download cache: `models_dir`, then `$DOCCLASS_CACHE_DIR`, then the
    /// user cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.models_dir {
            return dir.clone();
        }
        std::env::var(CACHE_DIR_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::cache_dir()
                    .unwrap_or_else(|| PathBuf::from(".cache"))
                    .join("docclass")
                    .join("models")
            })
    }
}

fn default_repo() -> String {
    "Xenova/distilbert-base-uncased-mnli".to_string()
}

fn default_onnx_file() -> String {
    "onnx/model.onnx".to_string()
}

fn default_tokenizer_file() -> String {
    "tokenizer.json".to_string()
}

fn default_config_file() -> String {
    "config.json".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

fn default_max_length() -> usize {
    512
}

/// HuggingFace Inference API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HuggingFaceConfig {
    #[serde(default = "default_hf_model")]
    pub model: String,
    #[serde(default = "default_hf_base_url")]
    pub base_url: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            model: default_hf_model(),
            base_url: default_hf_base_url(),
        }
    }
}

fn default_hf_model() -> String {
    "typeform/distilbert-base-uncased-mnli".to_string()
}

fn default_hf_base_url() -> String {
    "https://api-inference.huggingface.co".to_string()
}

/// Upload server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3001).
    #[serde(default = "default_address")]
    pub address: String,
    /// Largest accepted upload, in megabytes (default: 50).
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl ServerConfig {
    /// Upload limit in bytes; saturates instead of overflowing.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn default_address() -> String {
    "127.0.0.1:3001".to_string()
}

fn default_max_upload_mb() -> usize {
    50
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub huggingface: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Config {
    /// Load configuration from the standard locations, or defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Secrets needed by the configured backend. Only the HuggingFace
    /// backend reads any; the local backend never touches the secrets file.
    pub fn load_secrets(&self) -> Result<Secrets> {
        match self.classifier.backend {
            Backend::HuggingFace => Secrets::load(),
            Backend::Local => Ok(Secrets::default()),
        }
    }

    /// Load configuration from one file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DocclassError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            DocclassError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path; `None` means use defaults.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(DocclassError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(DocclassError::Configuration(format!(
                "Config file from ${CONFIG_ENV_VAR} not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".docclass").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/docclass/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (the API key may come from the
    /// environment).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".docclass").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/docclass/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DocclassError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            DocclassError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    pub fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            DocclassError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(DocclassError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    pub fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// HuggingFace API key, falling back to `$HF_API_KEY`.
    pub fn huggingface_api_key(&self) -> Option<String> {
        self.huggingface
            .as_ref()
            .map(|s| s.api_key.clone())
            .or_else(|| std::env::var(HF_API_KEY_ENV_VAR).ok())
            .filter(|k| !k.trim().is_empty())
    }
}
