//! Tight-binding material models and their BdG cell blocks.
//!
//! Every model describes one layer of the stack through three electron-sector
//! blocks at a given in-plane momentum: the on-site block, the hopping to the
//! next layer, and optionally the hopping to the layer after that. The hole
//! sector is never written by a model; [`CellBlocks::build`] derives it through
//! the particle-hole transform `h_hole(k) = -S · conj(h_e(-k)) · S†` with
//! `S = 1_orbital ⊗ iσ_y`, which doubles every block for the BdG formulation.

mod bi2se3;
mod dirac;
mod heterostructure;
mod superconductor;
mod tci;
mod variant;

pub use bi2se3::{Bi2Se3, Bi2Se3Params};
pub use dirac::{DiracTi, DiracTiParams};
pub use heterostructure::{Heterostructure, HeterostructureBlocks};
pub use superconductor::{InterfaceCoupling, SuperconductorParams, SwaveSuperconductor};
pub use tci::{Tci4, Tci8, Tci8Params, TciParams};
pub use variant::{MaterialKind, MaterialVariant};

use super::linalg::CMatrix;
use super::momentum::MomentumPoint;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error(
        "Material '{variant}' needs at least {required} orbitals per layer, but orbital_count = {declared}"
    )]
    OrbitalCountTooSmall {
        variant: &'static str,
        required: usize,
        declared: usize,
    },

    #[error("Material '{variant}' provides {provided} orbitals per layer, but orbital_count = {declared}")]
    OrbitalCountMismatch {
        variant: &'static str,
        provided: usize,
        declared: usize,
    },

    #[error("Unknown material variant '{0}'")]
    UnknownVariant(String),

    #[error("Invalid layer counts: layers = {layers}, sc_layers = {sc_layers}")]
    LayerCount { layers: usize, sc_layers: usize },
}

/// The electron sector of one material layer.
pub trait MaterialModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Electron states per layer, spin included.
    fn orbital_count(&self) -> usize;

    fn on_site(&self, k: MomentumPoint) -> CMatrix;

    /// Hopping from layer `l` to layer `l + 1`.
    fn hop_z(&self, k: MomentumPoint) -> CMatrix;

    /// Hopping from layer `l` to layer `l + 2`, for models that have one.
    fn hop_zz(&self, _k: MomentumPoint) -> Option<CMatrix> {
        None
    }
}

/// BdG-doubled blocks of a single material at one momentum point.
#[derive(Debug, Clone)]
pub struct CellBlocks {
    pub on_site: CMatrix,
    pub hop_z: CMatrix,
    pub hop_zz: Option<CMatrix>,
    /// Electron states per layer; every block is `2 · orbital_count` square.
    pub orbital_count: usize,
}

impl CellBlocks {
    /// Builds the electron sector from `model` at `k` and `-k` and derives the
    /// hole sector. `electron_shift` is a momentum-independent Hermitian term
    /// (chemical potential, Zeeman) added to the electron on-site block.
    pub fn build(
        model: &dyn MaterialModel,
        k: MomentumPoint,
        electron_shift: &CMatrix,
        flip: &CMatrix,
    ) -> Self {
        let on_site_k = model.on_site(k) + electron_shift;
        let on_site_minus_k = model.on_site(-k) + electron_shift;
        let hop_z = nambu_block(&model.hop_z(k), &hole_partner(&model.hop_z(-k), flip));
        let hop_zz = model
            .hop_zz(k)
            .zip(model.hop_zz(-k))
            .map(|(forward, backward)| nambu_block(&forward, &hole_partner(&backward, flip)));

        Self {
            on_site: nambu_block(&on_site_k, &hole_partner(&on_site_minus_k, flip)),
            hop_z,
            hop_zz,
            orbital_count: model.orbital_count(),
        }
    }
}

/// `-S · conj(block) · S†`, the hole-sector image of an electron block taken at `-k`.
pub fn hole_partner(electron_at_minus_k: &CMatrix, flip: &CMatrix) -> CMatrix {
    -(flip * electron_at_minus_k.conjugate() * flip.adjoint())
}

/// Block-diagonal `[[electron, 0], [0, hole]]`.
pub fn nambu_block(electron: &CMatrix, hole: &CMatrix) -> CMatrix {
    let n = electron.nrows();
    let mut block = CMatrix::zeros(2 * n, 2 * n);
    block.view_mut((0, 0), (n, n)).copy_from(electron);
    block.view_mut((n, n), (n, n)).copy_from(hole);
    block
}
