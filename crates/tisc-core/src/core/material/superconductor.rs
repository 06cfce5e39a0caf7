use super::{MaterialModel, hole_partner, nambu_block};
use crate::core::linalg::{CMatrix, Pauli, identity, pseudospin_operator, real, spin_flip};
use crate::core::momentum::MomentumPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct SuperconductorParams {
    pub hopping: f64,
    pub hopping_z: f64,
    /// Energy splitting between the A and B orbital halves.
    pub orbital_splitting: f64,
}

impl Default for SuperconductorParams {
    fn default() -> Self {
        Self {
            hopping: 0.5,
            hopping_z: 0.5,
            orbital_splitting: 0.0,
        }
    }
}

/// Conventional metal described in the same orbital basis as the topological
/// material, so that both regions share one block size.
///
/// `h(k) = −2t (cos kx + cos ky) + Δε τz`, hopping `−tz` between layers.
#[derive(Debug, Clone)]
pub struct SwaveSuperconductor {
    params: SuperconductorParams,
    orbital_count: usize,
}

impl SwaveSuperconductor {
    pub fn new(params: SuperconductorParams, orbital_count: usize) -> Self {
        Self {
            params,
            orbital_count,
        }
    }
}

impl MaterialModel for SwaveSuperconductor {
    fn name(&self) -> &'static str {
        "s-wave"
    }

    fn orbital_count(&self) -> usize {
        self.orbital_count
    }

    fn on_site(&self, k: MomentumPoint) -> CMatrix {
        let band = -2.0 * self.params.hopping * (k.kx.cos() + k.ky.cos());
        let mut block = identity(self.orbital_count) * real(band);
        if self.params.orbital_splitting != 0.0 {
            block += pseudospin_operator(self.orbital_count, Pauli::Z)
                * real(self.params.orbital_splitting);
        }
        block
    }

    fn hop_z(&self, _k: MomentumPoint) -> CMatrix {
        identity(self.orbital_count) * real(-self.params.hopping_z)
    }
}

/// Orbital-diagonal tunnelling across the SC/TI interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterfaceCoupling {
    pub hopping: f64,
    pub orbital_count: usize,
}

impl InterfaceCoupling {
    pub fn new(hopping: f64, orbital_count: usize) -> Self {
        Self {
            hopping,
            orbital_count,
        }
    }

    pub fn electron_block(&self) -> CMatrix {
        identity(self.orbital_count) * real(-self.hopping)
    }

    /// The BdG interface block from the last superconducting layer to the first
    /// topological one.
    pub fn bdg_block(&self) -> CMatrix {
        let electron = self.electron_block();
        nambu_block(&electron, &hole_partner(&electron, &spin_flip(self.orbital_count)))
    }
}
