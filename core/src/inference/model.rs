//! DLR model adapter.
//!
//! `DlrModel` validates the compiled artifacts, asks the runtime for a
//! native model and owns the returned handle until it is closed or dropped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use super::artifacts::ModelArtifacts;
use super::predictor::Predictor;
use super::runtime::{DlrRuntime, NativeModel};
use super::tensor::{DataType, InferenceResult, TensorData};
use super::Device;
use crate::config::LoadOptions;
use crate::error::{DlrError, Result};

const NOT_SUPPORTED: &str = "Not supported for DlrModel";

/// Report a failed load option as a load failure.
fn load_option_error(model: &str, option: &str, err: DlrError) -> DlrError {
    DlrError::model_load(format!(
        "Failed to set {} for model '{}': {}",
        option, model, err
    ))
}

/// Trainer for a DLR model.
///
/// DLR models are inference-only, so this type has no values.
#[derive(Debug)]
pub enum Trainer {}

/// Model compiled for the DLR runtime.
///
/// # Example
///
/// ```ignore
/// use dlr_rs::config::LoadOptions;
/// use dlr_rs::inference::{DlrModel, Device, NativeRuntime, TensorData};
/// use ndarray::{ArrayD, IxDyn};
///
/// let mut model = DlrModel::new("resnet50", Device::cpu());
/// model.load(&NativeRuntime::new(), "models/resnet50", None, &LoadOptions::default())?;
///
/// let input = TensorData::named("data", ArrayD::zeros(IxDyn(&[1, 3, 224, 224])));
/// let result = model.new_predictor()?.predict(&[input])?;
/// println!("Got {} outputs in {:.2}ms", result.outputs.len(), result.latency_ms);
/// ```
pub struct DlrModel {
    name: String,
    device: Device,
    data_type: DataType,
    model_dir: Option<PathBuf>,
    artifacts: Option<ModelArtifacts>,
    handle: Option<Box<dyn NativeModel>>,
}

impl DlrModel {
    /// Create an unloaded model that will run on `device`.
    pub fn new(name: impl Into<String>, device: Device) -> Self {
        Self {
            name: name.into(),
            device,
            // DLR only supports float32
            data_type: DataType::Float32,
            model_dir: None,
            artifacts: None,
            handle: None,
        }
    }

    /// Load compiled artifacts from `model_path`.
    ///
    /// The artifacts are `<prefix>.so` (or `.dylib`/`.dll`), `<prefix>.params`
    /// and `<prefix>.json`. `prefix` defaults to the model name.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactMissing` if an artifact is absent, `Unsupported` if
    /// this model already holds a native handle, and `ModelLoad` if the
    /// runtime rejects the artifacts.
    pub fn load(
        &mut self,
        runtime: &dyn DlrRuntime,
        model_path: impl AsRef<Path>,
        prefix: Option<&str>,
        options: &LoadOptions,
    ) -> Result<()> {
        if self.handle.is_some() {
            return Err(DlrError::unsupported(format!(
                "DLR model '{}' is already loaded; close it before loading new artifacts",
                self.name
            )));
        }

        let model_dir = std::path::absolute(model_path.as_ref())?;
        let prefix = prefix.unwrap_or(&self.name).to_string();
        let artifacts = ModelArtifacts::locate(&model_dir, &prefix)?;

        info!(
            "Loading DLR model '{}' from {} on {}",
            self.name,
            model_dir.display(),
            self.device
        );
        let mut handle = runtime.create_model(&model_dir, &self.device)?;

        if let Some(threads) = options.num_threads {
            debug!("Setting DLR thread count to {}", threads);
            handle
                .set_num_threads(threads)
                .map_err(|e| load_option_error(&self.name, "thread count", e))?;
        }
        if let Some(enabled) = options.use_cpu_affinity {
            debug!("Setting DLR CPU affinity to {}", enabled);
            handle
                .use_cpu_affinity(enabled)
                .map_err(|e| load_option_error(&self.name, "CPU affinity", e))?;
        }

        self.model_dir = Some(model_dir);
        self.artifacts = Some(artifacts);
        self.handle = Some(handle);
        Ok(())
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the device this model is loaded on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Element type the model computes in. Always `Float32`.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Absolute model directory, once loaded.
    pub fn model_dir(&self) -> Option<&Path> {
        self.model_dir.as_deref()
    }

    /// Validated artifacts, once loaded.
    pub fn artifacts(&self) -> Option<&ModelArtifacts> {
        self.artifacts.as_ref()
    }

    /// Whether a native handle is held.
    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Names of additional artifacts bundled with the model. DLR has none.
    pub fn artifact_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Execution backend reported by the runtime.
    pub fn backend(&self) -> Result<String> {
        self.native()?.backend()
    }

    /// Input names in model order.
    pub fn input_names(&self) -> Result<Vec<String>> {
        self.native()?.input_names()
    }

    /// Number of model outputs.
    pub fn num_outputs(&self) -> Result<usize> {
        self.native()?.num_outputs()
    }

    /// Create a predictor running on this model.
    pub fn new_predictor(&mut self) -> Result<Predictor<'_>> {
        self.native()?;
        Ok(Predictor::new(self))
    }

    /// DLR models cannot be trained; always fails.
    pub fn new_trainer(&self) -> Result<Trainer> {
        Err(DlrError::unsupported(NOT_SUPPORTED))
    }

    /// DLR models cannot change data type; always fails.
    pub fn cast(&mut self, _data_type: DataType) -> Result<()> {
        Err(DlrError::unsupported(NOT_SUPPORTED))
    }

    /// Release the native handle. Safe to call more than once.
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            info!("Closed DLR model '{}'", self.name);
        }
    }

    /// Bind inputs, run the model and collect every output.
    ///
    /// Named inputs bind to the model input of the same name; unnamed ones
    /// bind to the input at the same position.
    pub fn infer(&mut self, inputs: &[TensorData]) -> Result<InferenceResult> {
        let name = self.name.clone();
        let handle = self.native_mut()?;

        let input_names = handle.input_names()?;
        if inputs.len() > input_names.len() {
            return Err(DlrError::tensor(format!(
                "Model '{}' takes {} inputs, got {}",
                name,
                input_names.len(),
                inputs.len()
            )));
        }

        // Resolve every binding before touching the native inputs.
        let mut bound: HashSet<&str> = HashSet::with_capacity(inputs.len());
        let mut bindings = Vec::with_capacity(inputs.len());
        for (position, input) in inputs.iter().enumerate() {
            let input_name = match &input.name {
                Some(n) if input_names.contains(n) => n.as_str(),
                Some(n) => {
                    return Err(DlrError::tensor(format!(
                        "Unknown input '{}' for model '{}'",
                        n, name
                    )))
                }
                None => input_names[position].as_str(),
            };
            if !bound.insert(input_name) {
                return Err(DlrError::tensor(format!(
                    "Input '{}' of model '{}' is bound more than once",
                    input_name, name
                )));
            }
            bindings.push((input_name, input));
        }

        for (input_name, input) in bindings {
            debug!("Setting input '{}' with shape {:?}", input_name, input.shape());
            handle.set_input(input_name, &input.data)?;
        }

        let start = Instant::now();
        handle.run()?;

        let num_outputs = handle.num_outputs()?;
        let outputs = (0..num_outputs)
            .map(|i| handle.output(i).map(TensorData::new))
            .collect::<Result<Vec<_>>>()?;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        debug!(
            "Model '{}' produced {} outputs in {:.2}ms",
            name, num_outputs, latency_ms
        );
        Ok(InferenceResult {
            outputs,
            latency_ms,
        })
    }

    fn native(&self) -> Result<&dyn NativeModel> {
        self.handle
            .as_deref()
            .ok_or_else(|| DlrError::model_load(format!("Model '{}' is not loaded", self.name)))
    }

    fn native_mut(&mut self) -> Result<&mut (dyn NativeModel + 'static)> {
        match self.handle.as_deref_mut() {
            Some(handle) => Ok(handle),
            None => Err(DlrError::model_load(format!(
                "Model '{}' is not loaded",
                self.name
            ))),
        }
    }
}

impl std::fmt::Debug for DlrModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DlrModel")
            .field("name", &self.name)
            .field("device", &self.device)
            .field("data_type", &self.data_type)
            .field("model_dir", &self.model_dir)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Trait for types that can run model inference.
pub trait ModelRunner {
    /// Run inference on a set of input tensors.
    fn infer(&mut self, inputs: &[TensorData]) -> Result<InferenceResult>;

    /// Get the device this runner uses.
    fn device(&self) -> &Device;
}

impl ModelRunner for DlrModel {
    fn infer(&mut self, inputs: &[TensorData]) -> Result<InferenceResult> {
        DlrModel::infer(self, inputs)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
