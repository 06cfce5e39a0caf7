use super::MaterialModel;
use crate::core::linalg::{CMatrix, I, Pauli, tau_sigma};
use crate::core::momentum::MomentumPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct DiracTiParams {
    /// Dirac velocity `A` (eV).
    pub velocity: f64,
    /// Wilson mass curvature `B` (eV).
    pub curvature: f64,
}

impl Default for DiracTiParams {
    fn default() -> Self {
        Self {
            velocity: 0.3,
            curvature: 0.25,
        }
    }
}

/// Wilson-Dirac lattice model of a strong topological insulator,
///
/// `H(k) = A Σᵢ sin kᵢ Γᵢ + (M − 2B Σᵢ (1 − cos kᵢ)) Γ₀`
///
/// with `Γ₀ = τz σ0` and `Γᵢ = τx σᵢ`. The stacking direction is kept in real
/// space, so the `kz` terms become the inter-layer hopping
/// `T = B Γ₀ − i (A/2) Γz`. The model is topological for `0 < M < 4B`.
#[derive(Debug, Clone)]
pub struct DiracTi {
    mass: f64,
    params: DiracTiParams,
}

impl DiracTi {
    pub fn new(mass: f64, params: DiracTiParams) -> Self {
        Self { mass, params }
    }
}

impl MaterialModel for DiracTi {
    fn name(&self) -> &'static str {
        "dirac-ti"
    }

    fn orbital_count(&self) -> usize {
        4
    }

    fn on_site(&self, k: MomentumPoint) -> CMatrix {
        let DiracTiParams {
            velocity,
            curvature,
        } = self.params;
        let mass = self.mass - 2.0 * curvature * (3.0 - k.kx.cos() - k.ky.cos());

        tau_sigma(mass, Pauli::Z, Pauli::Identity)
            + tau_sigma(velocity * k.kx.sin(), Pauli::X, Pauli::X)
            + tau_sigma(velocity * k.ky.sin(), Pauli::X, Pauli::Y)
    }

    fn hop_z(&self, _k: MomentumPoint) -> CMatrix {
        let DiracTiParams {
            velocity,
            curvature,
        } = self.params;
        tau_sigma(curvature, Pauli::Z, Pauli::Identity)
            - tau_sigma(0.5 * velocity, Pauli::X, Pauli::Z) * I
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::linalg::hermiticity_defect;
    use nalgebra::SymmetricEigen;

    fn bulk_hamiltonian(model: &DiracTi, k: MomentumPoint, kz: f64) -> CMatrix {
        let t = model.hop_z(k);
        let phase = num_complex::Complex64::from_polar(1.0, kz);
        model.on_site(k) + &t * phase + t.adjoint() * phase.conj()
    }

    #[test]
    fn on_site_block_is_hermitian() {
        let model = DiracTi::new(0.5, DiracTiParams::default());
        let block = model.on_site(MomentumPoint::new(0.4, -1.1));
        assert_eq!(hermiticity_defect(&block), 0.0);
    }

    #[test]
    fn bulk_gap_at_gamma_equals_the_dirac_mass() {
        let model = DiracTi::new(0.5, DiracTiParams::default());
        let h = bulk_hamiltonian(&model, MomentumPoint::GAMMA, 0.0);
        let eig = SymmetricEigen::new(h);
        for e in eig.eigenvalues.iter() {
            assert!((e.abs() - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn layered_hopping_reproduces_bulk_dispersion() {
        let params = DiracTiParams::default();
        let model = DiracTi::new(0.5, params);
        let (k, kz) = (MomentumPoint::new(0.3, 0.2), 0.7);
        let h = bulk_hamiltonian(&model, k, kz);

        let mass = 0.5
            - 2.0 * params.curvature * (3.0 - k.kx.cos() - k.ky.cos() - kz.cos());
        let expected = tau_sigma(mass, Pauli::Z, Pauli::Identity)
            + tau_sigma(params.velocity * k.kx.sin(), Pauli::X, Pauli::X)
            + tau_sigma(params.velocity * k.ky.sin(), Pauli::X, Pauli::Y)
            + tau_sigma(params.velocity * kz.sin(), Pauli::X, Pauli::Z);
        assert!((h - expected).norm() < 1e-12);
    }
}
