use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use lfilter_grad::config::{CoefficientList, FilterConfig, Parallelism};
use lfilter_grad::signal_processing::{DifferentiableFilter, LFilter, SignalBuffer};
use lfilter_grad::wav::{load_wav, save_wav};

#[derive(Parser, Debug)]
#[command(name = "lfilter-grad")]
#[command(about = "Filter WAV files through a linear recursive filter and back-propagate gradients", long_about = None)]
struct Args {
    /// Input WAV file
    input: PathBuf,

    /// Filtered output WAV file
    output: PathBuf,

    /// TOML filter description (b, a, parallelism)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Feedforward coefficients, b[0] weights x[n] (e.g. "0.5, 0.5")
    #[arg(long, allow_hyphen_values = true)]
    b: Option<CoefficientList>,

    /// Feedback coefficients, a[0] weights y[n] (e.g. "1.0, -0.9")
    #[arg(long, allow_hyphen_values = true)]
    a: Option<CoefficientList>,

    /// Channel scheduling
    #[arg(short = 'p', long, value_enum)]
    parallelism: Option<Parallelism>,

    /// Output-gradient WAV to back-propagate through the filter
    #[arg(long, requires = "grad_input")]
    grad_output: Option<PathBuf>,

    /// Where to write the resulting input-gradient WAV
    #[arg(long, requires = "grad_output")]
    grad_input: Option<PathBuf>,

    /// Summary format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    generated_at: String,
    input: String,
    output: String,
    sample_rate: u32,
    num_timesteps: usize,
    num_channels: usize,
    order: usize,
    b: Vec<f64>,
    a: Vec<f64>,
    parallelism: Parallelism,
    input_peak: f64,
    output_peak: f64,
    grad_input_peak: Option<f64>,
}

fn build_config(args: &Args) -> Result<FilterConfig> {
    let mut config = match args.config {
        Some(ref path) => FilterConfig::load(path).context("Failed to load filter config")?,
        None => FilterConfig::default(),
    };

    if let Some(ref b) = args.b {
        config.b = b.0.clone();
    }
    if let Some(ref a) = args.a {
        config.a = a.0.clone();
    }
    if let Some(parallelism) = args.parallelism {
        config.parallelism = parallelism;
    }

    Ok(config)
}

fn back_propagate(
    filter: &LFilter,
    grad_output_path: &Path,
    signal: &SignalBuffer,
) -> Result<SignalBuffer> {
    let (grad_output, _) =
        load_wav(grad_output_path).context("Failed to read output-gradient WAV")?;
    if grad_output.shape() != signal.shape() {
        anyhow::bail!(
            "Output gradient shape {:?} does not match signal shape {:?}",
            grad_output.shape(),
            signal.shape()
        );
    }
    filter.backward(&grad_output).context("Backward pass failed")
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = build_config(&args)?;
    let filter = LFilter::from_config(&config).context("Invalid filter coefficients")?;

    let (signal, sample_rate) = load_wav(&args.input).context("Failed to read input WAV")?;
    log::info!(
        "{}: {} timesteps x {} channels at {} Hz",
        args.input.display(),
        signal.num_timesteps(),
        signal.num_channels(),
        sample_rate
    );

    let filtered = filter.forward(&signal).context("Forward pass failed")?;
    save_wav(&args.output, &filtered, sample_rate).context("Failed to write output WAV")?;

    let grad_input_peak = match (&args.grad_output, &args.grad_input) {
        (Some(grad_output_path), Some(grad_input_path)) => {
            let grad_input = back_propagate(&filter, grad_output_path, &signal)?;
            save_wav(grad_input_path, &grad_input, sample_rate)
                .context("Failed to write input-gradient WAV")?;
            Some(grad_input.peak())
        }
        _ => None,
    };

    let summary = RunSummary {
        generated_at: chrono::Utc::now().to_rfc3339(),
        input: args.input.display().to_string(),
        output: args.output.display().to_string(),
        sample_rate,
        num_timesteps: signal.num_timesteps(),
        num_channels: signal.num_channels(),
        order: filter.order(),
        b: config.b.clone(),
        a: config.a.clone(),
        parallelism: config.parallelism,
        input_peak: signal.peak(),
        output_peak: filtered.peak(),
        grad_input_peak,
    };

    match args.format {
        OutputFormat::Text => print_text(&summary),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(())
}

fn print_text(summary: &RunSummary) {
    println!("=== lfilter-grad ===");
    println!("Input:  {} ({} Hz)", summary.input, summary.sample_rate);
    println!("Output: {}", summary.output);
    println!(
        "Signal: {} timesteps x {} channels",
        summary.num_timesteps, summary.num_channels
    );
    println!("Order:  {}", summary.order);
    println!("b = {}", CoefficientList(summary.b.clone()));
    println!("a = {}", CoefficientList(summary.a.clone()));
    println!("Parallelism: {:?}", summary.parallelism);
    println!(
        "Peak: input {:.6}, output {:.6}",
        summary.input_peak, summary.output_peak
    );
    if let Some(peak) = summary.grad_input_peak {
        println!("Peak input gradient: {:.6}", peak);
    }
}
