//! Compute device for local inference.

use std::str::FromStr;

use crate::DocclassError;

/// Compute device for local inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// CPU execution (default).
    #[default]
    Cpu,

    /// CUDA GPU execution.
    #[cfg(feature = "cuda")]
    Cuda {
        /// GPU device ID (0-indexed).
        device_id: u32,
    },
}

impl Device {
    /// Create CPU device.
    pub fn cpu() -> Self {
        Self::Cpu
    }

    /// Create CUDA device with the given device ID.
    #[cfg(feature = "cuda")]
    pub fn cuda(device_id: u32) -> Self {
        Self::Cuda { device_id }
    }

    /// Get the device name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            #[cfg(feature = "cuda")]
            Self::Cuda { .. } => "CUDA",
        }
    }
}

impl FromStr for Device {
    type Err = DocclassError;

    /// Parses `cpu`, `cuda`, or `cuda:<id>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "cpu" => Ok(Self::Cpu),
            #[cfg(feature = "cuda")]
            "cuda" => Ok(Self::Cuda { device_id: 0 }),
            #[cfg(feature = "cuda")]
            other if other.starts_with("cuda:") => {
                let id = other["cuda:".len()..].parse().map_err(|_| {
                    DocclassError::Configuration(format!("invalid CUDA device: {other}"))
                })?;
                Ok(Self::Cuda { device_id: id })
            }
            other if other.starts_with("cuda") => Err(DocclassError::Configuration(format!(
                "device '{other}' requires the `cuda` feature"
            ))),
            other => Err(DocclassError::Configuration(format!(
                "unknown device '{other}' (expected \"cpu\" or \"cuda\")"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_cpu() {
        assert_eq!(Device::default(), Device::Cpu);
        assert_eq!(Device::cpu().name(), "CPU");
    }

    #[test]
    fn parse_cpu() {
        assert_eq!("CPU".parse::<Device>().unwrap(), Device::Cpu);
    }

    #[test]
    fn parse_unknown_device() {
        assert!("tpu".parse::<Device>().is_err());
    }

    #[cfg(not(feature = "cuda"))]
    #[test]
    fn cuda_requires_feature() {
        let err = "cuda".parse::<Device>().unwrap_err();
        assert!(err.to_string().contains("cuda"));
    }

    #[cfg(feature = "cuda")]
    #[test]
    fn parse_cuda_with_id() {
        assert_eq!("cuda:1".parse::<Device>().unwrap(), Device::cuda(1));
        assert_eq!("cuda".parse::<Device>().unwrap().name(), "CUDA");
    }
}
