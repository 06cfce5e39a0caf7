use super::config::WARM_UP_ITERATIONS;
use super::error::EngineError;
use crate::core::eigen::EigenDecomposition;
use crate::core::linalg::{CMatrix, real};
use crate::core::pairing::{ConvergenceMetric, OrderParameterState, ProjectorSet};
use crate::core::params::PhysicalParameters;

/// Recomputes the order parameter from the eigenpairs of the current
/// Hamiltonian:
///
/// `Δ_l = −(V_l / 2) Σ_n tanh(E_n / 2kBT) · u_{n,l} v_{n,l}†`
///
/// where `u_{n,l}` and `v_{n,l}` are the electron and hole components of
/// eigenvector `n` on layer `l`. Layers with `V_l = 0` stay exactly zero.
///
/// The updater keeps the previous snapshot so that it can report how far the
/// order parameter moved in each iteration.
#[derive(Debug)]
pub struct OrderParameterUpdater<'a> {
    params: &'a PhysicalParameters,
    projectors: &'a ProjectorSet,
    previous: OrderParameterState,
}

impl<'a> OrderParameterUpdater<'a> {
    pub fn new(
        params: &'a PhysicalParameters,
        projectors: &'a ProjectorSet,
        initial: OrderParameterState,
    ) -> Self {
        Self {
            params,
            projectors,
            previous: initial,
        }
    }

    /// Returns the new state and, once past the warm-up iterations, its
    /// distance from the previous one.
    pub fn update(
        &mut self,
        eigen: &EigenDecomposition,
        iteration: usize,
    ) -> Result<(OrderParameterState, Option<ConvergenceMetric>), EngineError> {
        let n = self.params.orbital_count;
        let dim = eigen.eigenvectors.nrows();
        if dim != self.params.hamiltonian_dimension() || eigen.len() != dim {
            return Err(EngineError::Internal(format!(
                "eigen-decomposition of dimension {dim} does not match a Hamiltonian of dimension {}",
                self.params.hamiltonian_dimension()
            )));
        }

        let thermal = self.params.thermal_energy();
        let occupation: Vec<f64> = eigen
            .eigenvalues
            .iter()
            .map(|&e| (e / (2.0 * thermal)).tanh())
            .collect();

        let layers: Vec<CMatrix> = (0..self.params.layers)
            .map(|layer| {
                let interaction = self.params.interaction_for(layer);
                if interaction == 0.0 {
                    return CMatrix::zeros(n, n);
                }
                let row = layer * 2 * n;
                let u = eigen.eigenvectors.rows(row, n);
                let v = eigen.eigenvectors.rows(row + n, n);

                let mut weighted = u.into_owned();
                for (mut column, &w) in weighted.column_iter_mut().zip(&occupation) {
                    column *= real(-0.5 * interaction * w);
                }
                weighted * v.adjoint()
            })
            .collect();

        let current = OrderParameterState::from_layers(layers, self.projectors);
        let metric = if iteration > WARM_UP_ITERATIONS {
            Some(
                ConvergenceMetric::between(&self.previous, &current).ok_or_else(|| {
                    EngineError::Internal("order-parameter snapshots differ in shape".to_string())
                })?,
            )
        } else {
            None
        };

        self.previous = current.clone();
        Ok((current, metric))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::eigen::{EigenSolver, HermitianEigenSolver};
    use crate::core::linalg::identity;
    use crate::core::material::{MaterialKind, SuperconductorParams};
    use crate::core::params::{RegionValues, ZeemanField};

    fn single_layer(interaction: f64) -> PhysicalParameters {
        PhysicalParameters {
            dirac_mass: 0.5,
            chemical_potential: RegionValues::new(0.0, 0.0),
            interaction: RegionValues::new(0.0, interaction),
            zeeman: ZeemanField::default(),
            temperature: 1.0,
            lattice_constant: 4.14,
            material: MaterialKind::DiracTi.default_variant(),
            superconductor: SuperconductorParams::default(),
            interface_hopping: 0.0,
            layers: 1,
            sc_layers: 1,
            orbital_count: 4,
        }
    }

    /// BdG matrix of one layer with on-site energy `xi` and singlet gap `gap`.
    fn bcs_decomposition(xi: f64, gap: f64) -> EigenDecomposition {
        let mut h = CMatrix::zeros(8, 8);
        h.view_mut((0, 0), (4, 4)).copy_from(&(identity(4) * real(xi)));
        h.view_mut((4, 4), (4, 4)).copy_from(&(identity(4) * real(-xi)));
        h.view_mut((0, 4), (4, 4)).copy_from(&(identity(4) * real(gap)));
        h.view_mut((4, 0), (4, 4)).copy_from(&(identity(4) * real(gap)));
        HermitianEigenSolver::default().decompose(h).unwrap()
    }

    #[test]
    fn zero_temperature_gap_equation_is_reproduced() {
        let params = single_layer(-1.0);
        let projectors = ProjectorSet::new(4);
        let mut updater = OrderParameterUpdater::new(&params, &projectors, OrderParameterState::zeros(1, 4));

        let (xi, gap) = (0.2, 0.3);
        let (state, metric) = updater.update(&bcs_decomposition(xi, gap), 1).unwrap();
        assert!(metric.is_none());

        // Δ' = −(V/2) Σ_n tanh(E_n/2kT) u v* = Δ/(2E) · (−V) at T → 0.
        let energy = (xi * xi + gap * gap).sqrt();
        let expected = gap / (2.0 * energy);
        assert!((&state.layers[0] - identity(4) * real(expected)).norm() < 1e-9);
        assert!((state.projections[0].a_site.singlet.re - expected).abs() < 1e-9);
    }

    #[test]
    fn vanishing_interaction_keeps_the_layer_exactly_zero() {
        let params = single_layer(0.0);
        let projectors = ProjectorSet::new(4);
        let mut updater = OrderParameterUpdater::new(&params, &projectors, OrderParameterState::zeros(1, 4));
        let (state, _) = updater.update(&bcs_decomposition(0.1, 0.4), 1).unwrap();
        assert_eq!(state.layers[0].norm(), 0.0);
    }

    #[test]
    fn metric_appears_only_after_warm_up() {
        let params = single_layer(-1.0);
        let projectors = ProjectorSet::new(4);
        let mut updater = OrderParameterUpdater::new(&params, &projectors, OrderParameterState::zeros(1, 4));
        let eigen = bcs_decomposition(0.2, 0.3);

        for iteration in 1..=WARM_UP_ITERATIONS {
            let (_, metric) = updater.update(&eigen, iteration).unwrap();
            assert!(metric.is_none(), "iteration {iteration}");
        }
        let (_, metric) = updater.update(&eigen, WARM_UP_ITERATIONS + 1).unwrap();
        let metric = metric.unwrap();
        assert!(metric.max_abs_delta < 1e-12);
    }

    #[test]
    fn mismatched_decomposition_is_an_internal_error() {
        let mut params = single_layer(-1.0);
        params.layers = 2;
        let projectors = ProjectorSet::new(4);
        let mut updater = OrderParameterUpdater::new(&params, &projectors, OrderParameterState::zeros(2, 4));
        assert!(matches!(
            updater.update(&bcs_decomposition(0.2, 0.3), 1),
            Err(EngineError::Internal(_))
        ));
    }
}
