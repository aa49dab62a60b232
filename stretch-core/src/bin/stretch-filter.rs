//! Filter a crawled muscle dataset down to stretching-relevant exercises.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stretch_core::config::seconds;
use stretch_core::dataset::{run_filter, FilterOptions, Selection};
use stretch_core::{BatchCoordinator, CancelToken, CheckerConfig, CheckerMode, FactChecker};

#[derive(Debug, Parser)]
#[command(name = "stretch-filter", version, about)]
struct Cli {
    /// Crawled muscle dataset (JSON)
    input: PathBuf,

    /// Where to write the filtered dataset
    output: PathBuf,

    /// Only process the first N muscles
    #[arg(long)]
    limit_muscles: Option<usize>,

    /// Only check the first N exercises of each muscle
    #[arg(long)]
    exercises_per_muscle: Option<usize>,

    /// Attempts per exercise
    #[arg(long)]
    max_retries: Option<u32>,

    /// Exercises per progress batch
    #[arg(long)]
    batch_size: Option<usize>,

    /// Fixed delay before each request, in seconds
    #[arg(long)]
    rate_limit_delay: Option<f64>,

    /// How requests are built
    #[arg(long, value_enum, default_value_t = Mode::FactCheck)]
    mode: Mode,

    /// Keep exercises on the endpoint's verdict alone, skipping the relevance policy
    #[arg(long)]
    verdict_only: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Embed the exercise in the service description and check a fixed claim
    FactCheck,
    /// Send the exercise itself as the claim
    Classify,
}

impl From<Mode> for CheckerMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::FactCheck => CheckerMode::FactCheck,
            Mode::Classify => CheckerMode::Classify,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("stretch_core=debug,stretch_filter=debug")
        } else {
            EnvFilter::new("stretch_core=info,stretch_filter=info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = CheckerConfig::from_env(cli.mode.into())
        .context("failed to load checker configuration")?;
    if let Some(n) = cli.max_retries {
        config = config.with_max_retries(n);
    }
    if let Some(n) = cli.batch_size {
        config = config.with_batch_size(n);
    }
    if let Some(secs) = cli.rate_limit_delay {
        config = config.with_rate_limit_delay(seconds(secs, "--rate-limit-delay")?);
    }

    let checker = FactChecker::from_config(&config).context("failed to build checker")?;
    spawn_interrupt_handler(checker.cancel_token().clone());
    let coordinator = BatchCoordinator::from_config(checker, &config);

    let options = FilterOptions::default()
        .with_limit_muscles(cli.limit_muscles)
        .with_exercises_per_muscle(cli.exercises_per_muscle)
        .with_selection(if cli.verdict_only {
            Selection::Verdict
        } else {
            Selection::Policy
        });

    let outcome = run_filter(&coordinator, &cli.input, &cli.output, &options).await;
    println!("{}", coordinator.stats().snapshot());

    let summary = outcome
        .with_context(|| format!("failed to filter {}", cli.input.display()))?;
    println!("{}", summary);
    Ok(())
}

fn spawn_interrupt_handler(cancel: CancelToken) {
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::warn!("received Ctrl+C, cancelling pending requests");
            cancel.cancel();
        }
    });
}
