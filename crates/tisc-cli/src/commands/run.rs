use crate::cli::RunArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::output;
use crate::utils::progress::CliProgressHandler;
use tisc::{engine::progress::ProgressReporter, workflows};
use tracing::{info, warn};

pub fn run(args: RunArgs) -> Result<()> {
    let partial_config = PartialRunConfig::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;
    info!(
        variant = %config.physics.material.kind(),
        layers = config.physics.layers,
        sc_layers = config.physics.sc_layers,
        points = config.grid.len(),
        temperature = config.physics.temperature,
        "Configuration resolved."
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Starting self-consistent solve on {} momentum point(s)...",
        config.grid.len()
    );
    let results = workflows::grid::run(&config, &reporter)?;
    let counts = results.status_counts();

    let files = output::write_results(&results, &args.output)?;

    if counts.failed > 0 {
        warn!(failed = counts.failed, "Some momentum points have no results.");
        println!(
            "Warning: {} momentum point(s) failed to diagonalize; see {}.",
            counts.failed,
            output::STATUS_FILE
        );
    }
    println!(
        "✓ {} converged, {} reached the iteration cap, {} failed.",
        counts.converged, counts.exhausted, counts.failed
    );
    println!(
        "✓ {} result files written to: {}",
        files.len(),
        args.output.display()
    );

    Ok(())
}
