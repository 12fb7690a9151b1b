use anyhow::{Context, Result};
use clap::Parser;
use rand::RngExt;
use rolling_stats::Stats;
use serde::Serialize;

use lfilter_grad::config::{GradCheckConfig, Parallelism};
use lfilter_grad::signal_processing::{LFilter, check_input_gradient};
use lfilter_grad::simulation::{create_rng, gaussian_signal, random_stable_coefficients};

#[derive(Parser, Debug)]
#[command(name = "gradcheck")]
#[command(about = "Finite-difference check of lfilter input gradients on random stable filters", long_about = None)]
struct Args {
    /// Number of random filters to check
    #[arg(short = 't', long, default_value = "20")]
    trials: usize,

    /// Smallest filter order
    #[arg(long, default_value = "2")]
    min_order: usize,

    /// Largest filter order
    #[arg(long, default_value = "4")]
    max_order: usize,

    /// Shortest signal in timesteps
    #[arg(long, default_value = "10")]
    min_timesteps: usize,

    /// Longest signal in timesteps
    #[arg(long, default_value = "50")]
    max_timesteps: usize,

    /// Channels per signal
    #[arg(short = 'c', long, default_value = "2")]
    channels: usize,

    /// Base random seed
    #[arg(short = 's', long, default_value = "0")]
    seed: u64,

    /// Finite-difference step
    #[arg(long, default_value = "1e-6")]
    epsilon: f64,

    /// Relative tolerance
    #[arg(long, default_value = "1e-6")]
    tolerance: f64,

    /// Channel scheduling
    #[arg(short = 'p', long, value_enum, default_value = "sequential")]
    parallelism: Parallelism,

    /// Output format: text, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct TrialResult {
    trial: usize,
    seed: u64,
    order: usize,
    num_timesteps: usize,
    max_abs_error: Option<f64>,
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct Report {
    generated_at: String,
    passed: usize,
    failed: usize,
    max_abs_error: Option<StatsSummary>,
    trials: Vec<TrialResult>,
}

fn run_trial(
    trial: usize,
    seed: u64,
    args: &Args,
    check: &GradCheckConfig,
) -> Result<TrialResult> {
    let mut rng = create_rng(Some(seed));
    let order = rng.random_range(args.min_order..=args.max_order);
    let num_timesteps =
        rng.random_range(args.min_timesteps.max(order)..=args.max_timesteps.max(order));

    let coefficients = random_stable_coefficients(order, Some(rng.random()))
        .context("Failed to build coefficients")?;
    let filter = LFilter::new(coefficients).with_parallelism(args.parallelism, 1);
    let x = gaussian_signal(num_timesteps, args.channels, 1.0, Some(rng.random()));
    let weights = gaussian_signal(num_timesteps, args.channels, 1.0, Some(rng.random()));

    let result = check_input_gradient(&filter, &x, &weights, check);
    Ok(TrialResult {
        trial,
        seed,
        order,
        num_timesteps,
        max_abs_error: result.as_ref().ok().map(|r| r.max_abs_error),
        error: result.err().map(|e| e.to_string()),
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    if args.min_order == 0 || args.min_order > args.max_order {
        anyhow::bail!("Invalid order range {}..={}", args.min_order, args.max_order);
    }
    if args.min_timesteps > args.max_timesteps {
        anyhow::bail!(
            "Invalid timestep range {}..={}",
            args.min_timesteps,
            args.max_timesteps
        );
    }

    let check = GradCheckConfig {
        epsilon: args.epsilon,
        tolerance: args.tolerance,
    };

    let mut seeds = create_rng(Some(args.seed));
    let mut stats: Stats<f64> = Stats::new();
    let mut trials = Vec::with_capacity(args.trials);
    for trial in 0..args.trials {
        let result = run_trial(trial, seeds.random(), &args, &check)?;
        if let Some(err) = result.max_abs_error {
            stats.update(err);
        } else if let Some(ref msg) = result.error {
            log::warn!("trial {} failed: {}", trial, msg);
        }
        trials.push(result);
    }

    let failed = trials.iter().filter(|t| t.error.is_some()).count();
    let report = Report {
        generated_at: chrono::Utc::now().to_rfc3339(),
        passed: trials.len() - failed,
        failed,
        max_abs_error: StatsSummary::from_stats(&stats),
        trials,
    };

    match args.format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.failed > 0 {
        anyhow::bail!("{} of {} gradient checks failed", report.failed, args.trials);
    }
    Ok(())
}

fn print_text(report: &Report) {
    println!("trial,seed,order,timesteps,max_abs_error,status");
    for t in &report.trials {
        println!(
            "{},{},{},{},{},{}",
            t.trial,
            t.seed,
            t.order,
            t.num_timesteps,
            t.max_abs_error.map_or("-".to_string(), |e| format!("{:.3e}", e)),
            t.error.as_deref().unwrap_or("ok")
        );
    }
    println!();
    println!("Passed: {}  Failed: {}", report.passed, report.failed);
    if let Some(ref s) = report.max_abs_error {
        println!(
            "Max abs error: mean {:.3e}, std {:.3e}, min {:.3e}, max {:.3e}",
            s.mean, s.std_dev, s.min, s.max
        );
    }
}
