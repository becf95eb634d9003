//! CLI entry point for dlr-rs.

use anyhow::{Context, Result};
use ndarray::{ArrayD, IxDyn};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use dlr_rs::cli::{Cli, Commands, ModelArgs};
use dlr_rs::config::Config;
use dlr_rs::inference::{DlrModel, DlrRuntime, ModelArtifacts, NativeRuntime, TensorData};
use dlr_rs::Device;

/// One tensor in an input file.
#[derive(Debug, Deserialize)]
struct InputTensor {
    #[serde(default)]
    name: Option<String>,
    shape: Vec<usize>,
    data: Vec<f32>,
}

/// Input file contents: a single tensor or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InputFile {
    One(InputTensor),
    Many(Vec<InputTensor>),
}

impl InputFile {
    fn into_tensors(self) -> Result<Vec<TensorData>> {
        let tensors = match self {
            Self::One(t) => vec![t],
            Self::Many(ts) => ts,
        };
        tensors
            .into_iter()
            .map(|t| {
                let data = ArrayD::from_shape_vec(IxDyn(&t.shape), t.data)
                    .context("Failed to create input tensor")?;
                Ok(TensorData { name: t.name, data })
            })
            .collect()
    }
}

/// Model location after merging flags over the config file.
struct ModelTarget {
    name: String,
    dir: PathBuf,
    prefix: String,
}

fn resolve_target(args: ModelArgs, config: &Config) -> Result<ModelTarget> {
    let name = args.name.unwrap_or_else(|| config.model.name.clone());
    let dir = args
        .model_dir
        .or_else(|| config.model.dir.clone())
        .context("No model directory given (use --model-dir or model.dir in the config)")?;
    let prefix = args
        .prefix
        .or_else(|| config.model.prefix.clone())
        .unwrap_or_else(|| name.clone());
    Ok(ModelTarget { name, dir, prefix })
}

fn resolve_device(flag: Option<String>, config: &Config) -> Result<Device> {
    let device = match flag {
        Some(d) => d.parse()?,
        None => config.model.device()?,
    };
    Ok(device)
}

fn load_model(target: &ModelTarget, device: Device, config: &Config) -> Result<DlrModel> {
    let mut model = DlrModel::new(target.name.clone(), device);
    model
        .load(
            &NativeRuntime::new(),
            &target.dir,
            Some(target.prefix.as_str()),
            &config.runtime,
        )
        .with_context(|| format!("Failed to load model from {}", target.dir.display()))?;
    Ok(model)
}

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cli = Cli::parse_args();

    let config = if let Some(config_path) = &cli.config {
        Config::from_yaml_file(config_path)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Check { model } => {
            let target = resolve_target(model, &config)?;
            let artifacts = ModelArtifacts::locate(&target.dir, &target.prefix).with_context(
                || format!("Artifact check failed in {}", target.dir.display()),
            )?;
            println!("module: {}", artifacts.module.display());
            println!("params: {}", artifacts.params.display());
            println!("graph:  {}", artifacts.graph.display());
            println!("Status: OK (all artifacts present)");
        }

        Commands::Info { model, device } => {
            let target = resolve_target(model, &config)?;
            let device = resolve_device(device, &config)?;

            println!("dlr-rs v{}", env!("CARGO_PKG_VERSION"));
            println!("libdlr: {}", NativeRuntime::new().version()?);
            println!();
            println!("Model: {} ({})", target.name, target.dir.display());
            println!("Device: {}", device);

            info!("Loading model...");
            let model = load_model(&target, device, &config)?;
            println!("Backend: {}", model.backend()?);
            println!("Inputs: {}", model.input_names()?.join(", "));
            println!("Outputs: {}", model.num_outputs()?);
            println!("Status: OK (model loaded successfully)");
        }

        Commands::Infer {
            model,
            device,
            input,
            format,
        } => {
            let target = resolve_target(model, &config)?;
            let device = resolve_device(device, &config)?;
            info!("Using device: {}", device);

            let mut model = load_model(&target, device, &config)?;
            info!("Model loaded successfully");

            // Load input data
            info!("Loading input: {}", input.display());
            let input_file: InputFile = serde_json::from_str(
                &fs::read_to_string(&input)
                    .with_context(|| format!("Failed to read input: {}", input.display()))?,
            )
            .context("Input must be a tensor object or an array of tensor objects")?;
            let inputs = input_file.into_tensors()?;

            // Run inference
            info!("Running inference...");
            let result = model.new_predictor()?.predict(&inputs)?;

            info!(
                "Inference complete: {} outputs in {:.2}ms",
                result.outputs.len(),
                result.latency_ms
            );

            // Format output
            let output = serde_json::json!({
                "num_outputs": result.outputs.len(),
                "latency_ms": result.latency_ms,
                "outputs": result.outputs.iter().enumerate().map(|(i, t)| {
                    serde_json::json!({
                        "index": i,
                        "shape": t.shape(),
                        "data": t.data.iter().copied().collect::<Vec<f32>>(),
                    })
                }).collect::<Vec<_>>()
            });

            if format == "pretty" {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", serde_json::to_string(&output)?);
            }

            model.close();
        }
    }

    Ok(())
}
