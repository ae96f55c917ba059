//! docclass - zero-shot PDF document classifier
//!
//! Extracts the leading text of a PDF and assigns it to one of a fixed set
//! of [`Category`] labels with a pretrained NLI model, run locally through
//! ONNX Runtime or remotely through the HuggingFace Inference API.
//!
//! # Example
//!
//! ```rust,no_run
//! use docclass::{Config, DocumentClassifier, Secrets};
//!
//! #[tokio::main]
//! async fn main() -> docclass::Result<()> {
//!     let config = Config::load(None)?;
//!     let classifier = DocumentClassifier::from_config(&config, &Secrets::load()?)?;
//!
//!     let report = classifier.classify_document("report.pdf").await;
//!     println!("{}", report.to_json_line());
//!     Ok(())
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
#[cfg(feature = "local-inference")]
pub mod model;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use classifier::{DocumentClassifier, DocumentClassifierBuilder};
pub use config::{Backend, Config, Secrets};
pub use document::{Document, MAX_TEXT_CHARS};
pub use error::{DocclassError, Result};
pub use providers::ClassifyProvider;
pub use types::{Category, Classification, ClassificationResult, Prediction, Report};
pub use version::{BUILD_TIMESTAMP, GIT_BRANCH, GIT_SHA, PKG_VERSION, git_dirty, version_string};

#[cfg(feature = "local-inference")]
pub use model::{Device, ModelSource};
