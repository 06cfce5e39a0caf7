use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "TISC Contributors",
    version,
    about = "TISC CLI - Self-consistent Bogoliubov-de Gennes calculations for layered topological-insulator/superconductor heterostructures.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve the gap equation on every point of a momentum grid and write the results as CSV.
    Run(RunArgs),
    /// List the topological material variants and their orbital counts.
    Variants,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    // --- Core Arguments ---
    /// Path to the run configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Directory the CSV result files are written to. Created if missing.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    // --- Model Overrides ---
    /// Override the topological material variant (e.g., 'dirac-ti', 'tci-8').
    /// The variant's default model parameters are used when it differs from the file.
    #[arg(long, value_name = "TAG")]
    pub variant: Option<String>,

    // --- Solver Overrides ---
    /// Override the self-consistency iteration cap.
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    /// Override the convergence tolerance on the largest order-parameter change.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    /// Override the number of momentum points per axis.
    #[arg(long = "grid", value_name = "INT")]
    pub points_per_axis: Option<usize>,

    /// Override the number of workers the grid is partitioned over.
    #[arg(short = 'w', long, value_name = "INT")]
    pub workers: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S physics.temperature=2.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
