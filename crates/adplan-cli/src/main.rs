mod plan;
mod report;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::plan::{AllocateArgs, MetricsArgs, RankArgs};

#[derive(Debug, Parser)]
#[command(name = "adplan")]
#[command(about = "Rank advertising locations and allocate a budget across them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rank eligible locations by cost efficiency
    Rank(RankArgs),
    /// Rank locations and distribute a budget proportionally to their scores
    Allocate(AllocateArgs),
    /// Show average demographics of the eligible locations
    Metrics(MetricsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = adplan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Rank(args) => plan::run_rank(&config, &args),
        Commands::Allocate(args) => plan::run_allocate(&config, &args),
        Commands::Metrics(args) => plan::run_metrics(&config, &args),
    }
}
