use super::MaterialModel;
use crate::core::linalg::{CMatrix, I, Pauli, rho_tau_sigma, tau_sigma};
use crate::core::momentum::MomentumPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct TciParams {
    pub hopping: f64,
    pub hopping_z: f64,
    pub velocity: f64,
    pub velocity_z: f64,
    /// Hopping to the second-neighbour layer.
    pub next_nearest_z: f64,
}

impl Default for TciParams {
    fn default() -> Self {
        Self {
            hopping: 0.5,
            hopping_z: 0.3,
            velocity: 0.4,
            velocity_z: 0.3,
            next_nearest_z: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Tci8Params {
    pub cell: TciParams,
    /// In-plane hybridization between the two sites.
    pub site_coupling: f64,
    pub site_coupling_z: f64,
    /// On-site energy difference between the sites, acting on the orbital mass.
    pub site_asymmetry: f64,
}

impl Default for Tci8Params {
    fn default() -> Self {
        Self {
            cell: TciParams::default(),
            site_coupling: 0.1,
            site_coupling_z: 0.05,
            site_asymmetry: 0.02,
        }
    }
}

/// Four-orbital topological crystalline insulator in the `orbital ⊗ spin` basis:
///
/// `H(k) = (m − t (cos kx + cos ky) − tz cos kz − t₂ cos 2kz) τz
///        + v (sin kx τx σy − sin ky τx σx) + vz sin kz τy`
#[derive(Debug, Clone)]
pub struct Tci4 {
    mass: f64,
    params: TciParams,
}

impl Tci4 {
    pub fn new(mass: f64, params: TciParams) -> Self {
        Self { mass, params }
    }
}

impl MaterialModel for Tci4 {
    fn name(&self) -> &'static str {
        "tci-4"
    }

    fn orbital_count(&self) -> usize {
        4
    }

    fn on_site(&self, k: MomentumPoint) -> CMatrix {
        let p = &self.params;
        let mass = self.mass - p.hopping * (k.kx.cos() + k.ky.cos());
        tau_sigma(mass, Pauli::Z, Pauli::Identity)
            + tau_sigma(p.velocity * k.kx.sin(), Pauli::X, Pauli::Y)
            - tau_sigma(p.velocity * k.ky.sin(), Pauli::X, Pauli::X)
    }

    fn hop_z(&self, _k: MomentumPoint) -> CMatrix {
        let p = &self.params;
        tau_sigma(-0.5 * p.hopping_z, Pauli::Z, Pauli::Identity)
            - tau_sigma(0.5 * p.velocity_z, Pauli::Y, Pauli::Identity) * I
    }

    fn hop_zz(&self, _k: MomentumPoint) -> Option<CMatrix> {
        let t2 = self.params.next_nearest_z;
        (t2 != 0.0).then(|| tau_sigma(-0.5 * t2, Pauli::Z, Pauli::Identity))
    }
}

/// Two [`Tci4`] cells on sites A and B (`site ⊗ orbital ⊗ spin`), hybridized by
/// `w (cos kx + cos ky) ρx` in-plane and `wz cos kz ρx` between layers.
#[derive(Debug, Clone)]
pub struct Tci8 {
    cell: Tci4,
    params: Tci8Params,
}

impl Tci8 {
    pub fn new(mass: f64, params: Tci8Params) -> Self {
        Self {
            cell: Tci4::new(mass, params.cell),
            params,
        }
    }

    fn on_both_sites(block: &CMatrix) -> CMatrix {
        Pauli::Identity.matrix().kronecker(block)
    }
}

impl MaterialModel for Tci8 {
    fn name(&self) -> &'static str {
        "tci-8"
    }

    fn orbital_count(&self) -> usize {
        8
    }

    fn on_site(&self, k: MomentumPoint) -> CMatrix {
        let p = &self.params;
        Self::on_both_sites(&self.cell.on_site(k))
            + rho_tau_sigma(
                p.site_coupling * (k.kx.cos() + k.ky.cos()),
                Pauli::X,
                Pauli::Identity,
                Pauli::Identity,
            )
            + rho_tau_sigma(p.site_asymmetry, Pauli::Z, Pauli::Z, Pauli::Identity)
    }

    fn hop_z(&self, k: MomentumPoint) -> CMatrix {
        Self::on_both_sites(&self.cell.hop_z(k))
            + rho_tau_sigma(
                0.5 * self.params.site_coupling_z,
                Pauli::X,
                Pauli::Identity,
                Pauli::Identity,
            )
    }

    fn hop_zz(&self, k: MomentumPoint) -> Option<CMatrix> {
        self.cell.hop_zz(k).map(|block| Self::on_both_sites(&block))
    }
}
