//! Configuration types for dlr-rs.

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::Result;
use crate::inference::Device;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Model configuration.
    #[serde(default)]
    pub model: ModelConfig,

    /// Runtime options applied when the model is loaded.
    #[serde(default)]
    pub runtime: LoadOptions,
}

/// Model configuration.
#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// Model name. Also the artifact prefix when `prefix` is not set.
    #[serde(default = "default_name")]
    pub name: String,

    /// Directory holding the compiled artifacts.
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Artifact name prefix.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Device to load model on.
    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            dir: None,
            prefix: None,
            device: default_device(),
        }
    }
}

impl ModelConfig {
    /// Parse the configured device.
    pub fn device(&self) -> Result<Device> {
        self.device.parse()
    }
}

/// Options passed to the runtime after the native model is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoadOptions {
    /// Number of execution threads. Library default when unset.
    #[serde(default)]
    pub num_threads: Option<usize>,

    /// Pin execution threads to CPU cores. Library default when unset.
    #[serde(default)]
    pub use_cpu_affinity: Option<bool>,
}

fn default_name() -> String {
    "model".to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model.name, "model");
        assert_eq!(config.model.device().unwrap(), Device::Cpu);
        assert!(config.model.dir.is_none());
        assert_eq!(config.runtime, LoadOptions::default());
    }

    #[test]
    fn test_from_yaml_str() {
        let yaml = r#"
model:
  name: resnet50
  dir: /opt/models/resnet50
  device: gpu:1
runtime:
  num_threads: 4
  use_cpu_affinity: true
"#;
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.model.name, "resnet50");
        assert_eq!(config.model.dir, Some(PathBuf::from("/opt/models/resnet50")));
        assert!(config.model.prefix.is_none());
        assert_eq!(config.model.device().unwrap(), Device::Gpu(1));
        assert_eq!(config.runtime.num_threads, Some(4));
        assert_eq!(config.runtime.use_cpu_affinity, Some(true));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml_str("model:\n  prefix: compiled\n").unwrap();
        assert_eq!(config.model.prefix.as_deref(), Some("compiled"));
        assert_eq!(config.model.device, "cpu");
        assert!(config.runtime.num_threads.is_none());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(Config::from_yaml_str("model: [unclosed").is_err());
    }
}
