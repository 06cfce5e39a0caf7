use super::MaterialModel;
use crate::core::linalg::{CMatrix, I, Pauli, tau_sigma};
use crate::core::momentum::MomentumPoint;
use serde::{Deserialize, Serialize};

/// Four-band k·p parameters of Bi2Se3 (energies in eV, lengths in ångström).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Bi2Se3Params {
    pub c0: f64,
    pub d1: f64,
    pub d2: f64,
    pub m0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
    /// Spacing of the quintuple layers along the stacking direction.
    pub layer_spacing: f64,
}

impl Default for Bi2Se3Params {
    fn default() -> Self {
        Self {
            c0: -0.0068,
            d1: 1.3,
            d2: 19.6,
            m0: 0.28,
            b1: 10.0,
            b2: 56.6,
            a1: 2.2,
            a2: 4.1,
            layer_spacing: 9.55,
        }
    }
}

/// Bi2Se3 on a cubic-lattice regularization of the k·p Hamiltonian,
/// `k² → (2/a²)(2 − cos kx − cos ky)` in-plane and nearest-layer hopping along z.
///
/// The band inversion is fixed by `m0`; the run-level Dirac mass does not enter.
#[derive(Debug, Clone)]
pub struct Bi2Se3 {
    params: Bi2Se3Params,
    lattice_constant: f64,
}

impl Bi2Se3 {
    pub fn new(params: Bi2Se3Params, lattice_constant: f64) -> Self {
        Self {
            params,
            lattice_constant,
        }
    }

    fn in_plane_k_squared(&self, k: MomentumPoint) -> f64 {
        let a = self.lattice_constant;
        2.0 / (a * a) * (2.0 - k.kx.cos() - k.ky.cos())
    }
}

impl MaterialModel for Bi2Se3 {
    fn name(&self) -> &'static str {
        "bi2se3"
    }

    fn orbital_count(&self) -> usize {
        4
    }

    fn on_site(&self, k: MomentumPoint) -> CMatrix {
        let p = &self.params;
        let c2 = p.layer_spacing * p.layer_spacing;
        let k2 = self.in_plane_k_squared(k);
        let velocity = p.a2 / self.lattice_constant;

        tau_sigma(p.c0 + 2.0 * p.d1 / c2 + p.d2 * k2, Pauli::Identity, Pauli::Identity)
            + tau_sigma(p.m0 - 2.0 * p.b1 / c2 - p.b2 * k2, Pauli::Z, Pauli::Identity)
            + tau_sigma(velocity * k.kx.sin(), Pauli::X, Pauli::X)
            + tau_sigma(velocity * k.ky.sin(), Pauli::X, Pauli::Y)
    }

    fn hop_z(&self, _k: MomentumPoint) -> CMatrix {
        let p = &self.params;
        let c = p.layer_spacing;
        tau_sigma(-p.d1 / (c * c), Pauli::Identity, Pauli::Identity)
            + tau_sigma(p.b1 / (c * c), Pauli::Z, Pauli::Identity)
            - tau_sigma(p.a1 / (2.0 * c), Pauli::X, Pauli::Z) * I
    }
}
