//! Target compute devices understood by DLR.

use std::fmt;
use std::str::FromStr;

use crate::error::{DlrError, Result};

/// Device specification for model inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    /// CPU device.
    #[default]
    Cpu,
    /// GPU device with index.
    Gpu(usize),
    /// OpenCL device with index.
    OpenCl(usize),
}

impl Device {
    /// Create a CPU device.
    pub fn cpu() -> Self {
        Self::Cpu
    }

    /// Create a GPU device with the given index.
    pub fn gpu(index: usize) -> Self {
        Self::Gpu(index)
    }

    /// Device type code passed to `CreateDLRModel`.
    pub fn dlr_type(&self) -> i32 {
        match self {
            Self::Cpu => 1,
            Self::Gpu(_) => 2,
            Self::OpenCl(_) => 4,
        }
    }

    /// Device index passed to `CreateDLRModel`.
    ///
    /// Fails if the index does not fit in a C `int`.
    pub fn dlr_id(&self) -> Result<i32> {
        match self {
            Self::Cpu => Ok(0),
            Self::Gpu(idx) | Self::OpenCl(idx) => i32::try_from(*idx)
                .map_err(|_| DlrError::config(format!("Device index out of range: {}", idx))),
        }
    }
}

fn parse_index(kind: &str, idx: &str) -> Result<usize> {
    let index: u32 = idx
        .parse()
        .map_err(|_| DlrError::config(format!("Invalid {} index: {}", kind, idx)))?;
    if i32::try_from(index).is_err() {
        return Err(DlrError::config(format!(
            "{} index out of range: {}",
            kind, idx
        )));
    }
    Ok(index as usize)
}

impl FromStr for Device {
    type Err = DlrError;

    /// Parse a device string like "cpu", "gpu", "gpu:1", "cuda:0", "opencl".
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        let (kind, idx) = match s.split_once(':') {
            Some((kind, idx)) => (kind, Some(idx)),
            None => (s.as_str(), None),
        };
        match kind {
            "cpu" if idx.is_none() => Ok(Self::Cpu),
            "gpu" | "cuda" => Ok(Self::Gpu(idx.map_or(Ok(0), |i| parse_index("GPU", i))?)),
            "opencl" => Ok(Self::OpenCl(
                idx.map_or(Ok(0), |i| parse_index("OpenCL", i))?,
            )),
            _ => Err(DlrError::config(format!("Invalid device: {}", s))),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Gpu(idx) => write!(f, "gpu:{}", idx),
            Self::OpenCl(idx) => write!(f, "opencl:{}", idx),
        }
    }
}
