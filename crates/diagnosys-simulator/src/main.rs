//! CLI entry point for the asset telemetry simulator.

use anyhow::{Context, Result};
use clap::Parser;
use diagnosys_simulator::{Config, Scheduler};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_CONFIG_FILE: &str = "diagnosys.yml";

#[derive(Parser)]
#[command(name = "diagnosys-simulator")]
#[command(about = "Industrial asset telemetry simulator with fault injection")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the per-asset snapshots
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Sampling frequency in Hz
    #[arg(short, long)]
    frequency: Option<f64>,

    /// Number of motors
    #[arg(long)]
    motors: Option<usize>,

    /// Number of pumps
    #[arg(long)]
    pumps: Option<usize>,

    /// Number of valves
    #[arg(long)]
    valves: Option<usize>,

    /// Window length in seconds
    #[arg(short, long)]
    window: Option<f64>,

    /// Fault activations per minute
    #[arg(long)]
    fault_rate: Option<f64>,

    /// Mean fault duration in seconds
    #[arg(long)]
    fault_duration: Option<f64>,

    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Stop after this many steady-state ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Output file for the run report (markdown, plus a .json sibling)
    #[arg(short, long)]
    report: Option<String>,

    /// Write the default configuration to diagnosys.yml and exit
    #[arg(long)]
    generate_config: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(v) = self.frequency {
            config.frequency_hz = v;
        }
        if let Some(v) = self.motors {
            config.motors = v;
        }
        if let Some(v) = self.pumps {
            config.pumps = v;
        }
        if let Some(v) = self.valves {
            config.valves = v;
        }
        if let Some(v) = self.window {
            config.window_s = v;
        }
        if let Some(v) = self.fault_rate {
            config.fault_rate_per_min = v;
        }
        if let Some(v) = self.fault_duration {
            config.fault_duration_s = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.max_ticks.is_some() {
            config.max_ticks = self.max_ticks;
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if path.exists() {
                Config::from_file(&path)
                    .with_context(|| format!("failed to load configuration from {}", path.display()))?
            } else {
                Config::default()
            }
        }
    };
    cli.apply_overrides(&mut config);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.generate_config {
        Config::write_default(DEFAULT_CONFIG_FILE)?;
        println!("Generated default configuration: {}", DEFAULT_CONFIG_FILE);
        return Ok(());
    }

    let config = load_config(&cli)?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .with_target(config.logging.show_target)
        .with_thread_ids(config.logging.show_thread_ids)
        .with_file(config.logging.show_location)
        .with_line_number(config.logging.show_location)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting diagnosys-simulator v{}", env!("CARGO_PKG_VERSION"));

    let mut scheduler = match Scheduler::new(config) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("Startup failed: {}", e);
            return Err(anyhow::Error::new(e).context("startup failed"));
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => on_signal.cancel(),
            Err(e) => warn!("Failed to listen for ctrl-c: {}", e),
        }
    });

    let report = scheduler.run(cancel).await;

    report.print_summary();

    if let Some(output_path) = &cli.report {
        let md_path = if output_path.ends_with(".md") {
            output_path.clone()
        } else {
            format!("{}.md", output_path)
        };
        std::fs::write(&md_path, report.to_markdown())?;
        info!("Markdown report saved to: {}", md_path);

        let json_path = format!("{}.json", md_path.trim_end_matches(".md"));
        std::fs::write(&json_path, report.to_json())?;
        info!("JSON report saved to: {}", json_path);
    }

    Ok(())
}
