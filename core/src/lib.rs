//! dlr-rs: Load and run models compiled for the DLR runtime from Rust.
//!
//! A compiled model is a directory holding three files that share a name
//! prefix: the operator library (`<prefix>.so`, `.dylib` or `.dll`), the
//! parameters (`<prefix>.params`) and the graph (`<prefix>.json`). This crate
//! checks that layout, asks `libdlr` to create the model and owns the native
//! handle until the model is closed. Training and data type casts are not
//! offered by DLR and are refused.
//!
//! # Features
//!
//! - **native**: Link against `libdlr` and enable [`inference::NativeRuntime`]
//!   and the `dlr-rs` binary.
//!
//! # Example
//!
//! ```ignore
//! use dlr_rs::config::LoadOptions;
//! use dlr_rs::inference::{DlrModel, Device, NativeRuntime, TensorData};
//! use ndarray::{ArrayD, IxDyn};
//!
//! // Load model
//! let mut model = DlrModel::new("resnet50", Device::cpu());
//! model.load(&NativeRuntime::new(), "models/resnet50", None, &LoadOptions::default())?;
//!
//! // Run inference
//! let input = TensorData::named("data", ArrayD::zeros(IxDyn(&[1, 3, 224, 224])));
//! let result = model.new_predictor()?.predict(&[input])?;
//! println!("Got {} outputs in {:.2}ms", result.outputs.len(), result.latency_ms);
//! ```
//!
//! # Building
//!
//! The `native` feature needs `libdlr` at link time. The build script looks
//! for it in `DLR_LIB_DIR`, then `$DLR_HOME/lib`, then the installed `dlr`
//! Python package.
//!
//! ```bash
//! pip install dlr
//! cargo build --release --features native
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod inference;

// Re-export commonly used types
pub use error::{DlrError, Result};
pub use inference::{DataType, Device, DlrModel, InferenceResult, TensorData};
