//! MomLab CLI — run, demo, and sweep commands.
//!
//! Commands:
//! - `run` — execute a backtest on a CSV bar file, print the summary, save artifacts
//! - `demo` — run the default strategy on seeded synthetic bars
//! - `sweep` — grid-search risk/stop/target fractions over a CSV bar file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use momlab_runner::{
    load_bars, render_summary, run, run_sweep, save_artifacts, synthetic_bars, BacktestConfig,
    ParamGrid,
};

#[derive(Parser)]
#[command(name = "momlab", about = "MomLab — momentum-voting backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a CSV bar file.
    Run {
        /// CSV file with date,open,high,low,close,volume + indicator columns.
        #[arg(long)]
        data: PathBuf,

        /// TOML config file. Defaults to the classic consensus variant.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Skip writing artifacts; print the summary only.
        #[arg(long, default_value_t = false)]
        no_artifacts: bool,
    },
    /// Run the default strategy on synthetic bars.
    Demo {
        /// Number of bars to generate.
        #[arg(long, default_value_t = 504)]
        bars: usize,

        /// RNG seed; same seed, same bars, same result.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Grid-search risk/stop/target fractions over a CSV bar file.
    Sweep {
        /// CSV file with date,open,high,low,close,volume + indicator columns.
        #[arg(long)]
        data: PathBuf,

        /// TOML config file used as the base for every grid point.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print at most this many leading rows.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn load_config(path: &Option<PathBuf>) -> Result<BacktestConfig> {
    match path {
        Some(p) => BacktestConfig::load(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(BacktestConfig::default()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            data,
            config,
            output_dir,
            no_artifacts,
        } => {
            let config = load_config(&config)?;
            let bars =
                load_bars(&data).with_context(|| format!("loading bars from {}", data.display()))?;
            let report = run(&config, &bars)?;
            print!("{}", render_summary(&report));
            if !no_artifacts {
                let paths = save_artifacts(&report, &output_dir)?;
                println!("artifacts: {}", paths.report_json.parent().unwrap().display());
            }
        }
        Commands::Demo { bars, seed } => {
            let config = BacktestConfig {
                symbol: Some("synthetic".into()),
                ..Default::default()
            };
            let series = synthetic_bars(bars, seed, 0.0008, 0.012);
            let report = run(&config, &series)?;
            print!("{}", render_summary(&report));
        }
        Commands::Sweep { data, config, top } => {
            let base = load_config(&config)?;
            let bars =
                load_bars(&data).with_context(|| format!("loading bars from {}", data.display()))?;
            let grid = ParamGrid::default_grid();
            let rows = run_sweep(&grid, &base, &bars);
            println!(
                "{} of {} grid points completed",
                rows.len(),
                grid.size()
            );
            println!("{:<10} {:<8} {:<8} {:>10} {:>8} {:>8}", "risk", "stop", "target", "return%", "dd%", "trades");
            for row in rows.iter().take(top) {
                println!(
                    "{:<10} {:<8} {:<8} {:>10.2} {:>8.2} {:>8}",
                    row.risk_fraction,
                    row.stop_fraction,
                    row.take_profit_fraction,
                    row.metrics.total_return_pct,
                    row.metrics.max_drawdown_pct,
                    row.metrics.total_trades,
                );
            }
        }
    }
    Ok(())
}
