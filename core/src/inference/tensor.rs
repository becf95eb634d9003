//! Tensor and data type definitions passed across the runtime boundary.

use ndarray::ArrayD;
use std::fmt;
use std::str::FromStr;

use crate::error::{DlrError, Result};

/// Element data types a model may be asked to use.
///
/// DLR itself only executes `Float32` models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    /// 32-bit float.
    #[default]
    Float32,
    /// 16-bit float.
    Float16,
    /// 64-bit float.
    Float64,
    /// Unsigned 8-bit integer.
    Uint8,
    /// Signed 8-bit integer.
    Int8,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
}

impl FromStr for DataType {
    type Err = DlrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "float32" | "f32" => Ok(Self::Float32),
            "float16" | "f16" => Ok(Self::Float16),
            "float64" | "f64" => Ok(Self::Float64),
            "uint8" | "u8" => Ok(Self::Uint8),
            "int8" | "i8" => Ok(Self::Int8),
            "int32" | "i32" => Ok(Self::Int32),
            "int64" | "i64" => Ok(Self::Int64),
            other => Err(DlrError::config(format!("Invalid data type: {}", other))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Float32 => "float32",
            Self::Float16 => "float16",
            Self::Float64 => "float64",
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
        };
        f.write_str(name)
    }
}

/// Tensor data handed to or returned from the model.
#[derive(Debug, Clone)]
pub struct TensorData {
    /// Input or output name, when known.
    pub name: Option<String>,
    /// The tensor data as a dynamic-dimensional array.
    pub data: ArrayD<f32>,
}

impl TensorData {
    /// Wrap an array without a name.
    pub fn new(data: ArrayD<f32>) -> Self {
        Self { name: None, data }
    }

    /// Wrap an array bound to a named model input.
    pub fn named(name: impl Into<String>, data: ArrayD<f32>) -> Self {
        Self {
            name: Some(name.into()),
            data,
        }
    }

    /// Get the shape of the tensor.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Get the number of dimensions.
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Get the total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the tensor is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Result of model inference.
#[derive(Debug)]
pub struct InferenceResult {
    /// Output tensors in model output order.
    pub outputs: Vec<TensorData>,
    /// Inference latency in milliseconds.
    pub latency_ms: f64,
}
