use super::material::{MaterialVariant, SuperconductorParams};
use serde::{Deserialize, Serialize};

/// Boltzmann constant in eV/K.
pub const BOLTZMANN_EV_PER_K: f64 = 8.617_333_262e-5;

/// The two regions of the heterostructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Superconductor,
    Topological,
}

/// A quantity that takes one value in the topological region and another in the
/// superconducting region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegionValues {
    pub topological: f64,
    pub superconductor: f64,
}

impl RegionValues {
    pub fn new(topological: f64, superconductor: f64) -> Self {
        Self {
            topological,
            superconductor,
        }
    }

    #[inline]
    pub fn get(&self, region: Region) -> f64 {
        match region {
            Region::Topological => self.topological,
            Region::Superconductor => self.superconductor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZeemanField {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl ZeemanField {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn components(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// The fixed physical inputs of a run. Set once before any momentum point is
/// processed and read-only afterwards.
///
/// Interaction strengths follow the Hubbard sign convention: a negative value is
/// an attractive pairing interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameters {
    pub dirac_mass: f64,
    pub chemical_potential: RegionValues,
    pub interaction: RegionValues,
    pub zeeman: ZeemanField,
    /// Kelvin; must be strictly positive.
    pub temperature: f64,
    /// In-plane lattice constant in ångström.
    pub lattice_constant: f64,
    pub material: MaterialVariant,
    pub superconductor: SuperconductorParams,
    pub interface_hopping: f64,
    /// Total number of layers along the stacking direction.
    pub layers: usize,
    /// Layers `[0, sc_layers)` are superconducting; the rest are topological.
    pub sc_layers: usize,
    /// Electron states per layer, spin included.
    pub orbital_count: usize,
}

impl PhysicalParameters {
    #[inline]
    pub fn region(&self, layer: usize) -> Region {
        if layer < self.sc_layers {
            Region::Superconductor
        } else {
            Region::Topological
        }
    }

    #[inline]
    pub fn interaction_for(&self, layer: usize) -> f64 {
        self.interaction.get(self.region(layer))
    }

    /// Layers that carry a pairing field in the Hamiltonian: the whole
    /// superconducting region, plus the topological region when it has its own
    /// pairing interaction.
    #[inline]
    pub fn is_paired_layer(&self, layer: usize) -> bool {
        match self.region(layer) {
            Region::Superconductor => true,
            Region::Topological => self.interaction.topological != 0.0,
        }
    }

    pub fn thermal_energy(&self) -> f64 {
        BOLTZMANN_EV_PER_K * self.temperature
    }

    /// Dimension of the BdG Hamiltonian: electron and hole sectors for every layer.
    pub fn hamiltonian_dimension(&self) -> usize {
        self.layers * 2 * self.orbital_count
    }
}
