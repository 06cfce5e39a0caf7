use super::bi2se3::{Bi2Se3, Bi2Se3Params};
use super::dirac::{DiracTi, DiracTiParams};
use super::tci::{Tci4, Tci8, Tci8Params, TciParams};
use super::{MaterialModel, ModelError};
use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discrete tag selecting the topological material of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    DiracTi,
    Tci4,
    Tci8,
    Bi2Se3,
}

static MATERIAL_TAGS: Map<&'static str, MaterialKind> = phf_map! {
    "dirac-ti" => MaterialKind::DiracTi,
    "dirac" => MaterialKind::DiracTi,
    "tci-4" => MaterialKind::Tci4,
    "tci4" => MaterialKind::Tci4,
    "tci-8" => MaterialKind::Tci8,
    "tci8" => MaterialKind::Tci8,
    "bi2se3" => MaterialKind::Bi2Se3,
};

impl MaterialKind {
    pub const ALL: [MaterialKind; 4] = [
        MaterialKind::DiracTi,
        MaterialKind::Tci4,
        MaterialKind::Tci8,
        MaterialKind::Bi2Se3,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            MaterialKind::DiracTi => "dirac-ti",
            MaterialKind::Tci4 => "tci-4",
            MaterialKind::Tci8 => "tci-8",
            MaterialKind::Bi2Se3 => "bi2se3",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MaterialKind::DiracTi => "Wilson-Dirac lattice model of a strong topological insulator",
            MaterialKind::Tci4 => "Four-orbital topological crystalline insulator",
            MaterialKind::Tci8 => "Eight-orbital topological crystalline insulator (two coupled sites)",
            MaterialKind::Bi2Se3 => "Bi2Se3 k·p model on a cubic lattice regularization",
        }
    }

    /// Electron states per layer required by the model.
    pub fn required_orbitals(self) -> usize {
        match self {
            MaterialKind::Tci8 => 8,
            _ => 4,
        }
    }

    pub fn default_variant(self) -> MaterialVariant {
        match self {
            MaterialKind::DiracTi => MaterialVariant::DiracTi(DiracTiParams::default()),
            MaterialKind::Tci4 => MaterialVariant::Tci4(TciParams::default()),
            MaterialKind::Tci8 => MaterialVariant::Tci8(Tci8Params::default()),
            MaterialKind::Bi2Se3 => MaterialVariant::Bi2Se3(Bi2Se3Params::default()),
        }
    }
}

impl FromStr for MaterialKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MATERIAL_TAGS
            .get(s.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| ModelError::UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for MaterialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A material tag together with the parameter subset that belongs to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant")]
pub enum MaterialVariant {
    #[serde(rename = "dirac-ti")]
    DiracTi(DiracTiParams),
    #[serde(rename = "tci-4")]
    Tci4(TciParams),
    #[serde(rename = "tci-8")]
    Tci8(Tci8Params),
    #[serde(rename = "bi2se3")]
    Bi2Se3(Bi2Se3Params),
}

impl MaterialVariant {
    pub fn kind(&self) -> MaterialKind {
        match self {
            MaterialVariant::DiracTi(_) => MaterialKind::DiracTi,
            MaterialVariant::Tci4(_) => MaterialKind::Tci4,
            MaterialVariant::Tci8(_) => MaterialKind::Tci8,
            MaterialVariant::Bi2Se3(_) => MaterialKind::Bi2Se3,
        }
    }

    /// Rejects any declared orbital count that does not match the model's blocks.
    pub fn check_orbital_count(&self, declared: usize) -> Result<(), ModelError> {
        let kind = self.kind();
        let required = kind.required_orbitals();
        if declared < required {
            return Err(ModelError::OrbitalCountTooSmall {
                variant: kind.tag(),
                required,
                declared,
            });
        }
        if declared != required {
            return Err(ModelError::OrbitalCountMismatch {
                variant: kind.tag(),
                provided: required,
                declared,
            });
        }
        Ok(())
    }

    pub(crate) fn instantiate(&self, dirac_mass: f64, lattice_constant: f64) -> Box<dyn MaterialModel> {
        match self {
            MaterialVariant::DiracTi(p) => Box::new(DiracTi::new(dirac_mass, *p)),
            MaterialVariant::Tci4(p) => Box::new(Tci4::new(dirac_mass, *p)),
            MaterialVariant::Tci8(p) => Box::new(Tci8::new(dirac_mass, *p)),
            MaterialVariant::Bi2Se3(p) => Box::new(Bi2Se3::new(*p, lattice_constant)),
        }
    }
}
