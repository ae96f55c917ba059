//! Model location and device selection for local inference.

pub mod device;
pub mod source;

pub use device::Device;
pub use source::ModelSource;
