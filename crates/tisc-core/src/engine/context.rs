use super::config::{ConfigError, SolverConfig};
use super::error::EngineError;
use super::hamiltonian::HamiltonianBuilder;
use super::observables::ObservableExtractor;
use super::progress::ProgressReporter;
use super::scf::{LoopSettings, LoopState, SelfConsistencyLoop};
use super::state::{PointFailure, PointResult, PointStatus, SolvedPoint};
use crate::core::eigen::EigenSolver;
use crate::core::material::Heterostructure;
use crate::core::momentum::MomentumPoint;
use crate::core::pairing::{OrderParameterState, ProjectorSet};
use tracing::{debug, warn};

/// Per-worker state shared by every momentum point the worker owns.
///
/// Built once from the broadcast configuration; read-only afterwards.
pub struct SolverContext<'a> {
    pub config: &'a SolverConfig,
    pub solver: &'a dyn EigenSolver,
    pub reporter: &'a ProgressReporter<'a>,
    structure: Heterostructure,
    projectors: ProjectorSet,
}

impl<'a> SolverContext<'a> {
    pub fn new(
        config: &'a SolverConfig,
        solver: &'a dyn EigenSolver,
        reporter: &'a ProgressReporter<'a>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let structure = Heterostructure::new(&config.physics).map_err(ConfigError::from)?;
        let projectors = ProjectorSet::new(config.physics.orbital_count);
        Ok(Self {
            config,
            solver,
            reporter,
            structure,
            projectors,
        })
    }

    pub fn structure(&self) -> &Heterostructure {
        &self.structure
    }

    pub fn projectors(&self) -> &ProjectorSet {
        &self.projectors
    }

    /// Uniform gap `Δ0` on the superconducting layers.
    pub fn initial_state(&self) -> OrderParameterState {
        OrderParameterState::uniform_gap(
            &self.config.physics,
            self.config.iteration.initial_gap,
            &self.projectors,
        )
    }

    /// Solves one momentum point from the configured initial guess. A failed
    /// diagonalization is recorded as a failed point rather than an error.
    pub fn solve_point(&self, index: usize, momentum: MomentumPoint) -> Result<PointResult, EngineError> {
        let result = match self.solve_point_from(index, momentum, self.initial_state()) {
            Ok(point) => PointResult::Solved(Box::new(point)),
            Err(err @ EngineError::Diagonalization { .. }) => {
                warn!(index, error = %err, "Momentum point failed.");
                PointResult::Failed(PointFailure {
                    index,
                    momentum,
                    message: err.to_string(),
                })
            }
            Err(err) => return Err(err),
        };
        self.reporter.point_settled(index, result.status());
        Ok(result)
    }

    pub fn solve_point_from(
        &self,
        index: usize,
        momentum: MomentumPoint,
        initial: OrderParameterState,
    ) -> Result<SolvedPoint, EngineError> {
        let physics = &self.config.physics;
        let builder = HamiltonianBuilder::new(physics, &self.projectors, &self.config.pairing_channels);
        let settings = LoopSettings {
            max_iterations: self.config.iteration.max_iterations,
            tolerance: self.config.iteration.tolerance,
        };
        let scf = SelfConsistencyLoop::new(physics, &self.projectors, builder, self.solver, settings);

        let blocks = self.structure.build_cell_blocks(momentum);
        let outcome = scf.run(momentum, &blocks, initial)?;

        let status = match outcome.state {
            LoopState::Converged => PointStatus::Converged,
            LoopState::Exhausted => PointStatus::Exhausted,
            other => {
                return Err(EngineError::Internal(format!(
                    "self-consistency loop stopped in non-terminal state {other:?}"
                )));
            }
        };

        let extractor = ObservableExtractor::new(
            physics,
            &self.config.observables,
            &self.config.pairing_channels,
        );
        let observables = extractor.extract(&outcome.decomposition, &outcome.order_parameter);

        debug!(
            index,
            %status,
            iterations = outcome.iterations,
            ground_state = observables.energy.corrected,
            "Momentum point settled."
        );

        Ok(SolvedPoint {
            index,
            momentum,
            status,
            iterations: outcome.iterations,
            final_metric: outcome.final_metric,
            delta_trace: outcome.delta_trace,
            order_parameter: outcome.order_parameter,
            observables,
        })
    }
}
