//! Command-line interface for dlr-rs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Load and run DLR-compiled models from Rust.
#[derive(Parser, Debug)]
#[command(name = "dlr-rs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to optional YAML config file. Command-line flags take precedence.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Model location shared by every subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct ModelArgs {
    /// Directory holding the compiled artifacts.
    #[arg(short, long)]
    pub model_dir: Option<PathBuf>,

    /// Artifact name prefix (defaults to the model name).
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Model name.
    #[arg(short, long)]
    pub name: Option<String>,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the compiled artifacts are present without loading them.
    Check {
        #[command(flatten)]
        model: ModelArgs,
    },

    /// Load the model and print runtime and model metadata.
    Info {
        #[command(flatten)]
        model: ModelArgs,

        /// Device to run on (cpu, gpu:0, opencl:0, etc).
        #[arg(short, long)]
        device: Option<String>,
    },

    /// Run inference on tensors read from a JSON file.
    Infer {
        #[command(flatten)]
        model: ModelArgs,

        /// Device to run on (cpu, gpu:0, opencl:0, etc).
        #[arg(short, long)]
        device: Option<String>,

        /// Path to input data file: `{ "name"?, "shape", "data" }` or an array of them.
        #[arg(short, long)]
        input: PathBuf,

        /// Output format (json, pretty).
        #[arg(short, long, default_value = "json")]
        format: String,
    },
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_infer() {
        let cli = Cli::try_parse_from([
            "dlr-rs",
            "infer",
            "--model-dir",
            "/models/resnet",
            "--prefix",
            "compiled",
            "--device",
            "gpu:0",
            "--input",
            "input.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Infer {
                model,
                device,
                input,
                format,
            } => {
                assert_eq!(model.model_dir, Some(PathBuf::from("/models/resnet")));
                assert_eq!(model.prefix.as_deref(), Some("compiled"));
                assert_eq!(device.as_deref(), Some("gpu:0"));
                assert_eq!(input, PathBuf::from("input.json"));
                assert_eq!(format, "json");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["dlr-rs", "check", "--config", "dlr.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("dlr.yaml")));
        assert!(matches!(cli.command, Commands::Check { .. }));
    }

    #[test]
    fn test_infer_requires_input() {
        assert!(Cli::try_parse_from(["dlr-rs", "infer", "-m", "/models"]).is_err());
    }
}
