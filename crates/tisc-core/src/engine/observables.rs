use super::config::ObservableConfig;
use crate::core::eigen::EigenDecomposition;
use crate::core::linalg::{CMatrix, Pauli, pseudospin_operator, spin_operator};
use crate::core::pairing::{OrderParameterState, PairingChannel};
use crate::core::params::PhysicalParameters;
use itertools::Itertools;
use nalgebra::DMatrix;
use serde::Serialize;
use std::f64::consts::PI;

/// Local density of states on a `layers × energy samples` grid.
///
/// `spin[i]` is weighted by `u† (1 ⊗ σ_i) u` and `orbital[i]` by
/// `u† (τ_i ⊗ 1) u`, with `i` running over x, y, z.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LdosSpectra {
    pub total: DMatrix<f64>,
    pub spin: [DMatrix<f64>; 3],
    pub orbital: [DMatrix<f64>; 3],
}

impl LdosSpectra {
    fn zeros(layers: usize, samples: usize) -> Self {
        let zero = || DMatrix::zeros(layers, samples);
        Self {
            total: zero(),
            spin: [zero(), zero(), zero()],
            orbital: [zero(), zero(), zero()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundStateEnergy {
    /// Sum of the strictly negative BdG eigenvalues.
    pub raw: f64,
    pub chemical_potential_term: f64,
    pub double_counting: f64,
    /// `raw + chemical_potential_term − double_counting`.
    pub corrected: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservableResults {
    pub ldos: LdosSpectra,
    /// The smallest strictly positive eigenvalues, ascending.
    pub bands: Vec<f64>,
    pub energy: GroundStateEnergy,
}

/// Derives the observables of a settled momentum point.
#[derive(Debug)]
pub struct ObservableExtractor<'a> {
    params: &'a PhysicalParameters,
    config: &'a ObservableConfig,
    channels: &'a [PairingChannel],
    energies: Vec<f64>,
    spin_operators: [CMatrix; 3],
    orbital_operators: [CMatrix; 3],
}

impl<'a> ObservableExtractor<'a> {
    pub fn new(
        params: &'a PhysicalParameters,
        config: &'a ObservableConfig,
        channels: &'a [PairingChannel],
    ) -> Self {
        let n = params.orbital_count;
        Self {
            params,
            config,
            channels,
            energies: config.energy_window.energies(),
            spin_operators: Pauli::COMPONENTS.map(|p| spin_operator(n, p)),
            orbital_operators: Pauli::COMPONENTS.map(|p| pseudospin_operator(n, p)),
        }
    }

    pub fn extract(&self, eigen: &EigenDecomposition, state: &OrderParameterState) -> ObservableResults {
        ObservableResults {
            ldos: self.local_density_of_states(eigen),
            bands: lowest_positive(eigen, self.config.band_count),
            energy: self.ground_state_energy(eigen, state),
        }
    }

    pub fn local_density_of_states(&self, eigen: &EigenDecomposition) -> LdosSpectra {
        let n = self.params.orbital_count;
        let sigma = self.config.broadening;
        let norm = 1.0 / (sigma * (2.0 * PI).sqrt());
        let mut ldos = LdosSpectra::zeros(self.params.layers, self.energies.len());

        for (layer, state) in (0..self.params.layers).cartesian_product(0..eigen.len()) {
            let u = eigen.eigenvectors.view((layer * 2 * n, state), (n, 1));
            let density = u.norm_squared();
            let spin = self
                .spin_operators
                .each_ref()
                .map(|op| u.dotc(&(op * &u)).re);
            let orbital = self
                .orbital_operators
                .each_ref()
                .map(|op| u.dotc(&(op * &u)).re);

            let level = eigen.eigenvalues[state];
            for (sample, &energy) in self.energies.iter().enumerate() {
                let x = (energy - level) / sigma;
                let g = norm * (-0.5 * x * x).exp();
                if g == 0.0 {
                    continue;
                }
                ldos.total[(layer, sample)] += g * density;
                for i in 0..3 {
                    ldos.spin[i][(layer, sample)] += g * spin[i];
                    ldos.orbital[i][(layer, sample)] += g * orbital[i];
                }
            }
        }
        ldos
    }

    pub fn ground_state_energy(&self, eigen: &EigenDecomposition, state: &OrderParameterState) -> GroundStateEnergy {
        let raw = raw_ground_state_energy(eigen.eigenvalues.as_slice());
        let orbitals = self.params.orbital_count as f64;
        let chemical_potential_term = -(0..self.params.layers)
            .map(|l| self.params.chemical_potential.get(self.params.region(l)) * orbitals)
            .sum::<f64>();

        let double_counting = state
            .projections
            .iter()
            .enumerate()
            .map(|(layer, projections)| {
                let weight = self
                    .config
                    .double_counting_weight(self.params, self.params.region(layer));
                let weight_sum: f64 = self
                    .channels
                    .iter()
                    .map(|&c| projections.amplitude(c).norm_sqr())
                    .sum();
                weight * weight_sum
            })
            .sum::<f64>();

        GroundStateEnergy {
            raw,
            chemical_potential_term,
            double_counting,
            corrected: raw + chemical_potential_term - double_counting,
        }
    }
}

/// Sum of the strictly negative eigenvalues.
pub fn raw_ground_state_energy(eigenvalues: &[f64]) -> f64 {
    eigenvalues.iter().filter(|&&e| e < 0.0).sum()
}

/// The `count` smallest strictly positive eigenvalues of an ascending spectrum.
pub fn lowest_positive(eigen: &EigenDecomposition, count: usize) -> Vec<f64> {
    eigen
        .eigenvalues
        .iter()
        .copied()
        .filter(|&e| e > 0.0)
        .take(count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::eigen::{EigenSolver, HermitianEigenSolver};
    use crate::core::linalg::{identity, real};
    use crate::core::material::{MaterialKind, SuperconductorParams};
    use crate::core::pairing::ProjectorSet;
    use crate::core::params::{RegionValues, ZeemanField};
    use crate::engine::config::EnergyWindow;
    use nalgebra::DVector;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn single_layer() -> PhysicalParameters {
        PhysicalParameters {
            dirac_mass: 0.5,
            chemical_potential: RegionValues::new(0.0, 0.3),
            interaction: RegionValues::new(0.0, -2.0),
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

    fn diagonal_decomposition(values: &[f64]) -> EigenDecomposition {
        let dim = values.len();
        EigenDecomposition {
            eigenvalues: DVector::from_column_slice(values),
            eigenvectors: CMatrix::identity(dim, dim),
        }
    }

    #[test]
    fn raw_energy_sums_strictly_negative_eigenvalues_with_ties_and_zeros() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let len = rng.gen_range(1..40);
            let mut values: Vec<f64> = (0..len)
                .map(|_| match rng.gen_range(0..4) {
                    0 => 0.0,
                    1 => -0.25,
                    _ => rng.r#gen::<f64>() * 2.0 - 1.0,
                })
                .collect();
            values.sort_by(f64::total_cmp);

            let mut expected = 0.0;
            for &v in &values {
                if v < 0.0 {
                    expected += v;
                }
            }
            assert!(f64_approx_equal(raw_ground_state_energy(&values), expected));
        }
    }

    #[test]
    fn bands_take_the_five_smallest_positive_eigenvalues() {
        let eigen = diagonal_decomposition(&[-0.3, -0.1, 0.0, 0.0, 0.05, 0.05, 0.2, 0.4, 0.5, 0.9]);
        assert_eq!(lowest_positive(&eigen, 5), vec![0.05, 0.05, 0.2, 0.4, 0.5]);
    }

    #[test]
    fn bands_may_hold_fewer_than_requested() {
        let eigen = diagonal_decomposition(&[-0.3, 0.0, 0.1]);
        assert_eq!(lowest_positive(&eigen, 5), vec![0.1]);
    }

    #[test]
    fn ldos_integrates_to_electron_weight() {
        let params = single_layer();
        let observables = ObservableConfig {
            energy_window: EnergyWindow {
                min: -2.0,
                max: 2.0,
                samples: 4001,
            },
            broadening: 0.02,
            ..ObservableConfig::default()
        };
        let extractor = ObservableExtractor::new(&params, &observables, &PairingChannel::DEFAULT_ACTIVE);
        let eigen = diagonal_decomposition(&[-0.4, -0.2, -0.1, 0.0, 0.1, 0.2, 0.3, 0.4]);
        let ldos = extractor.local_density_of_states(&eigen);

        // Identity eigenvectors: the first four states live in the electron sector.
        let step = 4.0 / 4000.0;
        let integral: f64 = ldos.total.row(0).iter().sum::<f64>() * step;
        assert!((integral - 4.0).abs() < 1e-6);
        // Basis state 0 is spin up, state 1 spin down, and so on: Mz cancels.
        let mz: f64 = ldos.spin[2].row(0).iter().sum::<f64>() * step;
        assert!(mz.abs() < 1e-6);
        // All electron states of the A orbital come first: Pz weights (+,+,-,-).
        let pz: f64 = ldos.orbital[2].row(0).iter().sum::<f64>() * step;
        assert!(pz.abs() < 1e-6);
    }

    #[test]
    fn spin_polarized_state_shows_up_in_mz() {
        let params = single_layer();
        let observables = ObservableConfig::default();
        let extractor = ObservableExtractor::new(&params, &observables, &PairingChannel::DEFAULT_ACTIVE);
        let eigen = diagonal_decomposition(&[0.0, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3, 0.3]);
        let ldos = extractor.local_density_of_states(&eigen);

        let peak = observables.energy_window.samples / 2;
        assert!(ldos.spin[2][(0, peak)] > 0.0);
        assert!(f64_approx_equal(ldos.spin[2][(0, peak)], ldos.total[(0, peak)]));
    }

    #[test]
    fn corrected_energy_subtracts_weighted_double_counting() {
        let params = single_layer();
        let observables = ObservableConfig::default();
        let extractor = ObservableExtractor::new(&params, &observables, &PairingChannel::DEFAULT_ACTIVE);

        let projectors = ProjectorSet::new(4);
        let state = OrderParameterState::from_layers(vec![identity(4) * real(0.2)], &projectors);
        let mut h = CMatrix::zeros(8, 8);
        h.view_mut((0, 4), (4, 4)).copy_from(&state.layers[0]);
        h.view_mut((4, 0), (4, 4)).copy_from(&state.layers[0]);
        let eigen = HermitianEigenSolver::default().decompose(h).unwrap();

        let energy = extractor.ground_state_energy(&eigen, &state);
        assert!(f64_approx_equal(energy.raw, -0.8));
        assert!(f64_approx_equal(energy.chemical_potential_term, -1.2));
        // Two singlet channels with |d|² = 0.04 each, weight 1/V = −0.5.
        assert!(f64_approx_equal(energy.double_counting, -0.04));
        assert!(f64_approx_equal(energy.corrected, -0.8 - 1.2 + 0.04));
    }
}
