use crate::core::eigen::{EigenSolver, HermitianEigenSolver};
use crate::engine::config::SolverConfig;
use crate::engine::context::SolverContext;
use crate::engine::distribution::{LocalDistributor, WorkAssignment, WorkDistributor};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::{GlobalResultGrid, PointResult};
use tracing::{debug, info, instrument, warn};

/// Runs the self-consistent solve over the whole momentum grid with the
/// default eigensolver and local workers.
#[instrument(skip_all, name = "grid_workflow")]
pub fn run(config: &SolverConfig, reporter: &ProgressReporter) -> Result<GlobalResultGrid, EngineError> {
    let distributor = match config.workers {
        Some(workers) => LocalDistributor::new(workers),
        None => LocalDistributor::with_available_threads(),
    };
    run_with(config, &HermitianEigenSolver::default(), &distributor, reporter)
}

/// As [`run`], with an explicit eigensolver and work distributor.
pub fn run_with<S, D>(
    config: &SolverConfig,
    solver: &S,
    distributor: &D,
    reporter: &ProgressReporter,
) -> Result<GlobalResultGrid, EngineError>
where
    S: EigenSolver,
    D: WorkDistributor,
{
    // === Phase 0: Validation and partitioning ===
    reporter.report(Progress::PhaseStart { name: "Preparation" });
    config.validate()?;

    let total = config.grid.len();
    let assignments = distributor.partition(total);
    let parameters = distributor.broadcast_parameters(config);
    info!(
        points = total,
        workers = distributor.worker_count(),
        layers = config.physics.layers,
        variant = %config.physics.material.kind(),
        dimension = config.physics.hamiltonian_dimension(),
        "Starting grid workflow."
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 1: Self-consistency on every momentum point ===
    reporter.report(Progress::PhaseStart {
        name: "Self-Consistency",
    });
    reporter.report(Progress::TaskStart {
        total_steps: total as u64,
    });

    let per_worker = distributor.execute(assignments, parameters, |assignment, worker_config| {
        solve_assignment(assignment, worker_config, solver, reporter)
    });

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Gather ===
    reporter.report(Progress::PhaseStart { name: "Gathering" });
    let points = distributor.gather_results(total, per_worker)?;
    let grid = GlobalResultGrid {
        grid: config.grid,
        energies: config.observables.energy_window.energies(),
        points,
    };
    reporter.report(Progress::PhaseFinish);

    let counts = grid.status_counts();
    if counts.exhausted > 0 || counts.failed > 0 {
        warn!(
            exhausted = counts.exhausted,
            failed = counts.failed,
            "Some momentum points did not converge."
        );
        reporter.report(Progress::Message(format!(
            "{} of {} momentum points did not converge ({} capped, {} failed)",
            counts.exhausted + counts.failed,
            grid.len(),
            counts.exhausted,
            counts.failed
        )));
    }
    info!(
        converged = counts.converged,
        exhausted = counts.exhausted,
        failed = counts.failed,
        "Grid workflow complete."
    );
    Ok(grid)
}

fn solve_assignment(
    assignment: &WorkAssignment,
    config: &SolverConfig,
    solver: &dyn EigenSolver,
    reporter: &ProgressReporter,
) -> Result<Vec<PointResult>, EngineError> {
    debug!(
        worker = assignment.worker,
        points = assignment.indices.len(),
        "Worker starting."
    );
    let context = SolverContext::new(config, solver, reporter)?;
    assignment
        .indices
        .iter()
        .map(|&index| {
            let momentum = config.grid.point(index).ok_or_else(|| {
                EngineError::Internal(format!("grid index {index} has no momentum point"))
            })?;
            context.solve_point(index, momentum)
        })
        .collect()
}
