//! The boundary between the adapter and the DLR library.
//!
//! `DlrModel` only talks to the library through these traits. The
//! `native` feature provides the implementation backed by `libdlr`.

use ndarray::ArrayD;
use std::path::Path;

use super::Device;
use crate::error::Result;

/// Entry point into a DLR library.
pub trait DlrRuntime {
    /// Create a native model from a directory of compiled artifacts.
    ///
    /// Called once per model load. The returned handle owns the native
    /// resources and releases them when dropped.
    fn create_model(&self, model_dir: &Path, device: &Device) -> Result<Box<dyn NativeModel>>;

    /// Version string reported by the library.
    fn version(&self) -> Result<String>;
}

/// A model created by a DLR library.
pub trait NativeModel: Send {
    /// Name of the execution backend (e.g. "tvm", "treelite").
    fn backend(&self) -> Result<String>;

    /// Input names in model order.
    fn input_names(&self) -> Result<Vec<String>>;

    /// Number of model outputs.
    fn num_outputs(&self) -> Result<usize>;

    /// Limit the number of threads used for execution.
    fn set_num_threads(&mut self, threads: usize) -> Result<()>;

    /// Enable or disable CPU affinity for execution threads.
    fn use_cpu_affinity(&mut self, enabled: bool) -> Result<()>;

    /// Copy `data` into the named input.
    fn set_input(&mut self, name: &str, data: &ArrayD<f32>) -> Result<()>;

    /// Execute the model on the current inputs.
    fn run(&mut self) -> Result<()>;

    /// Copy out the output at `index` after a run.
    fn output(&self, index: usize) -> Result<ArrayD<f32>>;
}
