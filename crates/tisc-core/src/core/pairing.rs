//! Pairing channels, their projector matrices, and the per-layer order parameter.
//!
//! Within one layer the pairing field is an `orbital_count × orbital_count`
//! block of the electron-hole sector. It is decomposed onto twelve channels:
//! the orbital part selects the A half, the B half, or the A-B mixing of the
//! spatial orbitals, and the spin part is the singlet (`σ0`) or one of the three
//! triplet components (`σx`, `σy`, `σz`). With the Nambu spinor
//! `(c, iσ_y c†)` a singlet s-wave gap is simply proportional to the identity.

use super::linalg::{CMatrix, Pauli, ZERO, identity, real};
use super::params::PhysicalParameters;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrbitalChannel {
    ASite,
    BSite,
    Mixed,
}

impl OrbitalChannel {
    pub const ALL: [OrbitalChannel; 3] = [OrbitalChannel::ASite, OrbitalChannel::BSite, OrbitalChannel::Mixed];

    pub fn tag(self) -> &'static str {
        match self {
            OrbitalChannel::ASite => "a-site",
            OrbitalChannel::BSite => "b-site",
            OrbitalChannel::Mixed => "mixed",
        }
    }

    /// The orbital projector acting on the spatial orbitals, `half` states per half.
    fn projector(self, half: usize) -> CMatrix {
        let mut p = CMatrix::zeros(2 * half, 2 * half);
        match self {
            OrbitalChannel::ASite => p.view_mut((0, 0), (half, half)).fill_with_identity(),
            OrbitalChannel::BSite => p.view_mut((half, half), (half, half)).fill_with_identity(),
            OrbitalChannel::Mixed => {
                p.view_mut((0, half), (half, half)).fill_with_identity();
                p.view_mut((half, 0), (half, half)).fill_with_identity();
            }
        }
        p
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpinChannel {
    Singlet,
    TripletX,
    TripletY,
    TripletZ,
}

impl SpinChannel {
    pub const ALL: [SpinChannel; 4] = [
        SpinChannel::Singlet,
        SpinChannel::TripletX,
        SpinChannel::TripletY,
        SpinChannel::TripletZ,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            SpinChannel::Singlet => "singlet",
            SpinChannel::TripletX => "triplet-x",
            SpinChannel::TripletY => "triplet-y",
            SpinChannel::TripletZ => "triplet-z",
        }
    }

    fn pauli(self) -> Pauli {
        match self {
            SpinChannel::Singlet => Pauli::Identity,
            SpinChannel::TripletX => Pauli::X,
            SpinChannel::TripletY => Pauli::Y,
            SpinChannel::TripletZ => Pauli::Z,
        }
    }
}

/// One named pairing channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PairingChannel {
    pub orbital: OrbitalChannel,
    pub spin: SpinChannel,
}

impl PairingChannel {
    pub const fn new(orbital: OrbitalChannel, spin: SpinChannel) -> Self {
        Self { orbital, spin }
    }

    /// The channels fed back into the Hamiltonian unless configured otherwise.
    pub const DEFAULT_ACTIVE: [PairingChannel; 3] = [
        PairingChannel::new(OrbitalChannel::ASite, SpinChannel::Singlet),
        PairingChannel::new(OrbitalChannel::BSite, SpinChannel::Singlet),
        PairingChannel::new(OrbitalChannel::Mixed, SpinChannel::Singlet),
    ];

    pub fn all() -> impl Iterator<Item = PairingChannel> {
        OrbitalChannel::ALL.into_iter().flat_map(|orbital| {
            SpinChannel::ALL
                .into_iter()
                .map(move |spin| PairingChannel::new(orbital, spin))
        })
    }
}

impl fmt::Display for PairingChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.orbital.tag(), self.spin.tag())
    }
}

/// Singlet and triplet amplitudes of one orbital channel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PairingAmplitude {
    pub singlet: Complex64,
    pub triplet: [Complex64; 3],
}

impl PairingAmplitude {
    pub fn get(&self, spin: SpinChannel) -> Complex64 {
        match spin {
            SpinChannel::Singlet => self.singlet,
            SpinChannel::TripletX => self.triplet[0],
            SpinChannel::TripletY => self.triplet[1],
            SpinChannel::TripletZ => self.triplet[2],
        }
    }

    fn set(&mut self, spin: SpinChannel, value: Complex64) {
        match spin {
            SpinChannel::Singlet => self.singlet = value,
            SpinChannel::TripletX => self.triplet[0] = value,
            SpinChannel::TripletY => self.triplet[1] = value,
            SpinChannel::TripletZ => self.triplet[2] = value,
        }
    }
}

/// Channel projections of one layer's pairing matrix.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayerProjections {
    pub a_site: PairingAmplitude,
    pub b_site: PairingAmplitude,
    pub mixed: PairingAmplitude,
}

impl LayerProjections {
    pub fn orbital(&self, orbital: OrbitalChannel) -> &PairingAmplitude {
        match orbital {
            OrbitalChannel::ASite => &self.a_site,
            OrbitalChannel::BSite => &self.b_site,
            OrbitalChannel::Mixed => &self.mixed,
        }
    }

    fn orbital_mut(&mut self, orbital: OrbitalChannel) -> &mut PairingAmplitude {
        match orbital {
            OrbitalChannel::ASite => &mut self.a_site,
            OrbitalChannel::BSite => &mut self.b_site,
            OrbitalChannel::Mixed => &mut self.mixed,
        }
    }

    pub fn amplitude(&self, channel: PairingChannel) -> Complex64 {
        self.orbital(channel.orbital).get(channel.spin)
    }
}

#[derive(Debug, Clone)]
struct Projector {
    channel: PairingChannel,
    gamma: CMatrix,
    /// `Tr(Γ†Γ)`.
    norm: f64,
}

/// The fixed gamma matrices `Γ = P_orbital ⊗ σ_spin` of every channel for one
/// orbital count.
#[derive(Debug, Clone)]
pub struct ProjectorSet {
    orbital_count: usize,
    projectors: Vec<Projector>,
}

impl ProjectorSet {
    /// `orbital_count` counts spin and must be a multiple of four.
    pub fn new(orbital_count: usize) -> Self {
        let half = orbital_count / 4;
        let projectors = PairingChannel::all()
            .map(|channel| {
                let gamma = channel.orbital.projector(half).kronecker(&channel.spin.pauli().matrix());
                let norm = gamma.norm_squared();
                Projector {
                    channel,
                    gamma,
                    norm,
                }
            })
            .collect();
        Self {
            orbital_count,
            projectors,
        }
    }

    /// `d_c = Tr(Γ_c† Δ) / Tr(Γ_c† Γ_c)` for every channel.
    pub fn project(&self, delta: &CMatrix) -> LayerProjections {
        let mut projections = LayerProjections::default();
        for p in &self.projectors {
            let overlap = p.gamma.dotc(delta);
            projections
                .orbital_mut(p.channel.orbital)
                .set(p.channel.spin, overlap / p.norm);
        }
        projections
    }

    /// `Σ_c d_c Γ_c` over the given channels.
    pub fn synthesize(&self, projections: &LayerProjections, channels: &[PairingChannel]) -> CMatrix {
        let mut delta = CMatrix::zeros(self.orbital_count, self.orbital_count);
        for p in self.projectors.iter().filter(|p| channels.contains(&p.channel)) {
            let amplitude = projections.amplitude(p.channel);
            if amplitude != ZERO {
                delta += &p.gamma * amplitude;
            }
        }
        delta
    }
}

/// Per-layer pairing matrices together with their channel projections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderParameterState {
    pub layers: Vec<CMatrix>,
    pub projections: Vec<LayerProjections>,
}

impl OrderParameterState {
    pub fn zeros(layer_count: usize, orbital_count: usize) -> Self {
        Self {
            layers: vec![CMatrix::zeros(orbital_count, orbital_count); layer_count],
            projections: vec![LayerProjections::default(); layer_count],
        }
    }

    pub fn from_layers(layers: Vec<CMatrix>, projectors: &ProjectorSet) -> Self {
        let projections = layers.iter().map(|delta| projectors.project(delta)).collect();
        Self { layers, projections }
    }

    /// `gap · 1` on every superconducting layer, zero elsewhere.
    pub fn uniform_gap(params: &PhysicalParameters, gap: f64, projectors: &ProjectorSet) -> Self {
        let n = params.orbital_count;
        let layers = (0..params.layers)
            .map(|l| {
                if l < params.sc_layers {
                    identity(n) * real(gap)
                } else {
                    CMatrix::zeros(n, n)
                }
            })
            .collect();
        Self::from_layers(layers, projectors)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.layers.len() == other.layers.len()
            && self
                .layers
                .iter()
                .zip(&other.layers)
                .all(|(a, b)| a.shape() == b.shape())
    }
}

/// Change of the order parameter between two consecutive iterations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceMetric {
    pub max_abs_delta: f64,
    pub rms_delta: f64,
}

impl ConvergenceMetric {
    /// Element-wise comparison over all layer matrices; `None` when the two
    /// snapshots differ in shape.
    pub fn between(previous: &OrderParameterState, current: &OrderParameterState) -> Option<Self> {
        if !previous.same_shape(current) {
            return None;
        }
        let mut max_abs_delta: f64 = 0.0;
        let mut sum_sq = 0.0;
        let mut count = 0usize;
        for (old, new) in previous.layers.iter().zip(&current.layers) {
            for (a, b) in old.iter().zip(new.iter()) {
                let diff = (b - a).norm();
                max_abs_delta = max_abs_delta.max(diff);
                sum_sq += diff * diff;
                count += 1;
            }
        }
        let rms_delta = if count == 0 {
            0.0
        } else {
            (sum_sq / count as f64).sqrt()
        };
        Some(Self {
            max_abs_delta,
            rms_delta,
        })
    }
}
