use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use worldmerge_core::{pipeline, MergeConfig, RunSummary};

#[derive(Parser, Debug)]
#[command(author, version, about = "Merge country-level indicator CSVs by iso3 and year", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Life expectancy and GDP per capita at each country's latest common year
    Latest(PathArgs),
    /// GDP, life expectancy, internet use and population for every country-year
    WorldMetrics(PathArgs),
    /// Run a merge described by a TOML config file
    Run(RunArgs),
}

#[derive(Args, Debug, Default)]
struct PathArgs {
    /// Directory holding the input CSVs
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Where to write the merged CSV
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Path to the merge config
    #[arg(long)]
    config: PathBuf,
}

impl PathArgs {
    fn apply(self, mut config: MergeConfig) -> MergeConfig {
        if let Some(dir) = self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(output) = self.output {
            config = config.with_output(output);
        }
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    let config = match cli.command {
        Command::Latest(args) => args.apply(MergeConfig::latest_snapshot()),
        Command::WorldMetrics(args) => args.apply(MergeConfig::world_metrics()),
        Command::Run(args) => MergeConfig::load(&args.config)
            .with_context(|| format!("failed to load config '{}'", args.config.display()))?,
    };

    info!(
        data_dir = %config.data_dir.display(),
        datasets = config.datasets.len(),
        policy = ?config.policy,
        "starting merge"
    );
    let summary = pipeline::run(&config)
        .with_context(|| format!("merge into '{}' failed", config.output.display()))?;
    print_summary(&summary);

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("\nSaved: {}", summary.output.display());
    println!("Rows: {}", summary.rows);
    println!("Columns: {:?}", summary.columns);
}
