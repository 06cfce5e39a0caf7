use super::error::EngineError;
use super::hamiltonian::HamiltonianBuilder;
use super::updater::OrderParameterUpdater;
use crate::core::eigen::{EigenDecomposition, EigenSolver};
use crate::core::material::HeterostructureBlocks;
use crate::core::momentum::MomentumPoint;
use crate::core::pairing::{ConvergenceMetric, OrderParameterState, ProjectorSet};
use crate::core::params::PhysicalParameters;
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Iterating,
    Converged,
    Exhausted,
}

impl LoopState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::Converged | LoopState::Exhausted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub max_iterations: usize,
    pub tolerance: f64,
}

/// Everything the loop leaves behind once it reaches a terminal state.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Either [`LoopState::Converged`] or [`LoopState::Exhausted`].
    pub state: LoopState,
    pub iterations: usize,
    pub order_parameter: OrderParameterState,
    /// Spectrum of the last Hamiltonian that was diagonalized.
    pub decomposition: EigenDecomposition,
    pub final_metric: Option<ConvergenceMetric>,
    pub delta_trace: Vec<f64>,
}

/// Drives build → diagonalize → update for one momentum point until the
/// order parameter settles or the iteration cap is reached.
pub struct SelfConsistencyLoop<'a> {
    params: &'a PhysicalParameters,
    projectors: &'a ProjectorSet,
    builder: HamiltonianBuilder<'a>,
    solver: &'a dyn EigenSolver,
    settings: LoopSettings,
}

impl<'a> SelfConsistencyLoop<'a> {
    pub fn new(
        params: &'a PhysicalParameters,
        projectors: &'a ProjectorSet,
        builder: HamiltonianBuilder<'a>,
        solver: &'a dyn EigenSolver,
        settings: LoopSettings,
    ) -> Self {
        Self {
            params,
            projectors,
            builder,
            solver,
            settings,
        }
    }

    pub fn run(
        &self,
        momentum: MomentumPoint,
        blocks: &HeterostructureBlocks,
        initial: OrderParameterState,
    ) -> Result<LoopOutcome, EngineError> {
        let mut state = LoopState::Initializing;
        let mut updater = OrderParameterUpdater::new(self.params, self.projectors, initial.clone());
        let mut current = initial;
        let mut iteration = 0;
        let mut last_metric = None;
        let mut delta_trace = Vec::new();
        let mut decomposition = None;

        trace!(kx = momentum.kx, ky = momentum.ky, "Initial order parameter prepared.");
        state = transition(state, LoopState::Iterating);

        while !state.is_terminal() {
            iteration += 1;

            let hamiltonian = self.builder.assemble(blocks, &current);
            let eigen = self
                .solver
                .decompose(hamiltonian)
                .map_err(|source| EngineError::Diagonalization {
                    momentum,
                    iteration,
                    source,
                })?;

            let (next, metric) = updater.update(&eigen, iteration)?;
            current = next;
            decomposition = Some(eigen);

            if let Some(metric) = metric {
                debug!(
                    iteration,
                    max_abs_delta = metric.max_abs_delta,
                    rms_delta = metric.rms_delta,
                    "Order parameter updated."
                );
                delta_trace.push(metric.max_abs_delta);
                last_metric = Some(metric);
            }

            if metric.is_some_and(|m| m.max_abs_delta <= self.settings.tolerance) {
                state = transition(state, LoopState::Converged);
            } else if iteration >= self.settings.max_iterations {
                warn!(
                    kx = momentum.kx,
                    ky = momentum.ky,
                    iterations = iteration,
                    max_abs_delta = ?last_metric.map(|m| m.max_abs_delta),
                    "Iteration cap reached before convergence."
                );
                state = transition(state, LoopState::Exhausted);
            }
        }

        let decomposition = decomposition
            .ok_or_else(|| EngineError::Internal("loop ended without a diagonalization".to_string()))?;

        Ok(LoopOutcome {
            state,
            iterations: iteration,
            order_parameter: current,
            decomposition,
            final_metric: last_metric,
            delta_trace,
        })
    }
}

fn transition(from: LoopState, to: LoopState) -> LoopState {
    trace!(?from, ?to, "Loop state transition.");
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::eigen::{EigenError, HermitianEigenSolver};
    use crate::core::linalg::CMatrix;
    use crate::core::material::{Heterostructure, MaterialKind, SuperconductorParams};
    use crate::core::pairing::PairingChannel;
    use crate::core::params::{RegionValues, ZeemanField};
    use crate::engine::config::WARM_UP_ITERATIONS;

    struct FailingSolver;

    impl EigenSolver for FailingSolver {
        fn decompose(&self, matrix: CMatrix) -> Result<EigenDecomposition, EigenError> {
            Err(EigenError::NoConvergence {
                dimension: matrix.nrows(),
            })
        }
    }

    fn parameters(interaction: f64) -> PhysicalParameters {
        PhysicalParameters {
            dirac_mass: 0.5,
            chemical_potential: RegionValues::new(0.0, -0.4),
            interaction: RegionValues::new(0.0, interaction),
            zeeman: ZeemanField::default(),
            temperature: 2.0,
            lattice_constant: 4.14,
            material: MaterialKind::DiracTi.default_variant(),
            superconductor: SuperconductorParams::default(),
            interface_hopping: 0.1,
            layers: 3,
            sc_layers: 1,
            orbital_count: 4,
        }
    }

    fn run_loop(
        params: &PhysicalParameters,
        solver: &dyn EigenSolver,
        settings: LoopSettings,
        initial_gap: f64,
    ) -> Result<LoopOutcome, EngineError> {
        let structure = Heterostructure::new(params).unwrap();
        let projectors = ProjectorSet::new(params.orbital_count);
        let builder = HamiltonianBuilder::new(params, &projectors, &PairingChannel::DEFAULT_ACTIVE);
        let scf = SelfConsistencyLoop::new(params, &projectors, builder, solver, settings);
        let k = MomentumPoint::new(0.4, 0.1);
        let initial = OrderParameterState::uniform_gap(params, initial_gap, &projectors);
        scf.run(k, &structure.build_cell_blocks(k), initial)
    }

    #[test]
    fn iterations_never_exceed_the_cap() {
        let params = parameters(-1.5);
        for cap in [1, 5, 12, 30] {
            let settings = LoopSettings {
                max_iterations: cap,
                tolerance: 1e-300,
            };
            let outcome = run_loop(&params, &HermitianEigenSolver::default(), settings, 0.2).unwrap();
            assert!(outcome.iterations <= cap);
            if cap <= WARM_UP_ITERATIONS {
                assert_eq!(outcome.state, LoopState::Exhausted);
                assert_eq!(outcome.iterations, cap);
            }
        }
    }

    #[test]
    fn convergence_is_never_declared_during_warm_up() {
        let params = parameters(0.0);
        let settings = LoopSettings {
            max_iterations: 100,
            tolerance: 1.0,
        };
        let outcome = run_loop(&params, &HermitianEigenSolver::default(), settings, 0.0).unwrap();
        assert_eq!(outcome.state, LoopState::Converged);
        assert_eq!(outcome.iterations, WARM_UP_ITERATIONS + 1);
        assert_eq!(outcome.delta_trace.len(), 1);
    }

    #[test]
    fn solver_failure_aborts_the_point() {
        let params = parameters(-1.0);
        let settings = LoopSettings {
            max_iterations: 20,
            tolerance: 1e-8,
        };
        match run_loop(&params, &FailingSolver, settings, 0.1) {
            Err(EngineError::Diagonalization { iteration, .. }) => assert_eq!(iteration, 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
