//! Public types for the docclass API.

mod category;
mod classification;
mod report;

pub use category::Category;
pub use classification::{Classification, ClassificationResult, Prediction};
pub use report::Report;
