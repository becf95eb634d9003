//! Predictor over a loaded model.

use tracing::debug;

use super::model::ModelRunner;
use super::tensor::{InferenceResult, TensorData};
use super::Device;
use crate::error::Result;

/// Runs inference through a borrowed model.
///
/// Created by [`DlrModel::new_predictor`](super::DlrModel::new_predictor).
pub struct Predictor<'a> {
    runner: &'a mut dyn ModelRunner,
    calls: usize,
}

impl<'a> Predictor<'a> {
    /// Wrap a runner.
    pub fn new(runner: &'a mut dyn ModelRunner) -> Self {
        Self { runner, calls: 0 }
    }

    /// Run the model once on `inputs`.
    pub fn predict(&mut self, inputs: &[TensorData]) -> Result<InferenceResult> {
        let result = self.runner.infer(inputs)?;
        self.calls += 1;
        Ok(result)
    }

    /// Run the model once per batch, in order. Stops at the first failure.
    pub fn batch_predict(&mut self, batches: &[Vec<TensorData>]) -> Result<Vec<InferenceResult>> {
        debug!("Running {} batches on {}", batches.len(), self.runner.device());
        batches.iter().map(|inputs| self.predict(inputs)).collect()
    }

    /// Device the underlying model runs on.
    pub fn device(&self) -> &Device {
        self.runner.device()
    }

    /// Number of successful predictions made through this predictor.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DlrError;
    use ndarray::{ArrayD, IxDyn};

    /// Echoes inputs back; fails on empty input lists.
    struct EchoRunner {
        device: Device,
    }

    impl ModelRunner for EchoRunner {
        fn infer(&mut self, inputs: &[TensorData]) -> Result<InferenceResult> {
            if inputs.is_empty() {
                return Err(DlrError::inference("no inputs"));
            }
            Ok(InferenceResult {
                outputs: inputs.to_vec(),
                latency_ms: 0.0,
            })
        }

        fn device(&self) -> &Device {
            &self.device
        }
    }

    fn tensor(v: f32) -> TensorData {
        TensorData::new(ArrayD::from_elem(IxDyn(&[2]), v))
    }

    #[test]
    fn test_predict_counts_calls() {
        let mut runner = EchoRunner {
            device: Device::Gpu(0),
        };
        let mut predictor = Predictor::new(&mut runner);

        let result = predictor.predict(&[tensor(1.0)]).unwrap();
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(predictor.calls(), 1);
        assert_eq!(*predictor.device(), Device::Gpu(0));
    }

    #[test]
    fn test_batch_predict_in_order() {
        let mut runner = EchoRunner {
            device: Device::Cpu,
        };
        let mut predictor = Predictor::new(&mut runner);

        let results = predictor
            .batch_predict(&[vec![tensor(1.0)], vec![tensor(2.0)]])
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].outputs[0].data[[0]], 2.0);
        assert_eq!(predictor.calls(), 2);
    }

    #[test]
    fn test_batch_predict_stops_on_error() {
        let mut runner = EchoRunner {
            device: Device::Cpu,
        };
        let mut predictor = Predictor::new(&mut runner);

        let err = predictor
            .batch_predict(&[vec![tensor(1.0)], vec![], vec![tensor(3.0)]])
            .unwrap_err();
        assert!(matches!(err, DlrError::Inference(_)));
        assert_eq!(predictor.calls(), 1);
    }
}
