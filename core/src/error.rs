//! Error types for dlr-rs.

use std::path::PathBuf;
use thiserror::Error;

use crate::inference::ArtifactKind;

/// Result type alias for dlr-rs operations.
pub type Result<T> = std::result::Result<T, DlrError>;

/// Errors that can occur while loading or running a DLR model.
#[derive(Debug, Error)]
pub enum DlrError {
    /// Model loading failed.
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    /// Inference failed.
    #[error("Inference failed: {0}")]
    Inference(String),

    /// Invalid tensor.
    #[error("Invalid tensor: {0}")]
    Tensor(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation the DLR runtime does not offer.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// One of the compiled model artifacts is absent or not a regular file.
    #[error("{kind} is missing")]
    ArtifactMissing {
        /// Which artifact failed the check.
        kind: ArtifactKind,
        /// The path that was checked.
        path: PathBuf,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DlrError {
    /// Create a model load error.
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create an inference error.
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a tensor error.
    pub fn tensor(msg: impl Into<String>) -> Self {
        Self::Tensor(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unsupported operation error.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Whether this error reports a missing artifact file.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ArtifactMissing { .. } => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DlrError::model_load("failed to load");
        assert_eq!(format!("{}", err), "Model loading failed: failed to load");

        let err = DlrError::config("invalid device");
        assert_eq!(format!("{}", err), "Configuration error: invalid device");

        let err = DlrError::unsupported("Not supported for DlrModel");
        assert_eq!(
            format!("{}", err),
            "Unsupported operation: Not supported for DlrModel"
        );

        let err = DlrError::ArtifactMissing {
            kind: ArtifactKind::Params,
            path: PathBuf::from("/models/resnet/resnet.params"),
        };
        assert_eq!(format!("{}", err), "params file(.params) is missing");

        let err = DlrError::ArtifactMissing {
            kind: ArtifactKind::Module,
            path: PathBuf::from("/models/resnet/resnet.so"),
        };
        assert_eq!(
            format!("{}", err),
            "module file(.so/.dylib/.dll) is missing"
        );
    }

    #[test]
    fn test_is_not_found() {
        let err = DlrError::ArtifactMissing {
            kind: ArtifactKind::Graph,
            path: PathBuf::from("model.json"),
        };
        assert!(err.is_not_found());

        let err = DlrError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(err.is_not_found());

        assert!(!DlrError::inference("boom").is_not_found());
    }
}
