//! Model loading and inference.
//!
//! This module checks compiled model artifacts, wraps the DLR library behind
//! the [`DlrRuntime`] trait and exposes [`DlrModel`] on top of it. The FFI
//! bindings to `libdlr` are only built with the `native` feature.

mod artifacts;
mod device;
#[cfg(feature = "native")]
mod ffi;
mod model;
#[cfg(feature = "native")]
mod native;
mod predictor;
mod runtime;
mod tensor;

pub use artifacts::{ArtifactKind, ModelArtifacts};
pub use device::Device;
pub use model::{DlrModel, ModelRunner, Trainer};
#[cfg(feature = "native")]
pub use native::NativeRuntime;
pub use predictor::Predictor;
pub use runtime::{DlrRuntime, NativeModel};
pub use tensor::{DataType, InferenceResult, TensorData};
