//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (e.g. prometheus, statsd);
//! without a recorder installed, all metric calls are no-ops.
//!
//! All metrics are prefixed with `docclass_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider` — classify provider name ("onnx", "huggingface")
//! - `status` — outcome: "ok" or "error"

/// Total classification requests sent to a provider.
///
/// Labels: `provider`, `status` ("ok" | "error").
pub const CLASSIFICATIONS_TOTAL: &str = "docclass_classifications_total";

/// Classification duration in seconds.
///
/// Labels: `provider`.
pub const CLASSIFY_DURATION_SECONDS: &str = "docclass_classify_duration_seconds";

/// Characters of document text handed to the classifier (after truncation).
pub const EXTRACTED_CHARS: &str = "docclass_extracted_chars";
