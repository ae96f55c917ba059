//! Zero-shot classification backends.

pub mod traits;

#[cfg(feature = "huggingface")]
pub mod huggingface;
#[cfg(feature = "local-inference")]
pub mod onnx_zero_shot;

pub use traits::ClassifyProvider;

#[cfg(feature = "huggingface")]
pub use huggingface::HuggingFaceClient;
#[cfg(feature = "local-inference")]
pub use onnx_zero_shot::{LocalZeroShotModel, NliHead, OnnxZeroShotProvider};
