use super::{CellBlocks, InterfaceCoupling, MaterialModel, ModelError, SwaveSuperconductor};
use crate::core::linalg::{CMatrix, Pauli, identity, real, spin_flip, spin_operator};
use crate::core::momentum::MomentumPoint;
use crate::core::params::{PhysicalParameters, Region, ZeemanField};

/// The SC/TI stack: a superconducting slab on layers `[0, sc_layers)` followed
/// by the topological material, joined by a single interface bond.
#[derive(Debug)]
pub struct Heterostructure {
    topological: Box<dyn MaterialModel>,
    superconductor: SwaveSuperconductor,
    interface: InterfaceCoupling,
    topological_shift: CMatrix,
    superconductor_shift: CMatrix,
    flip: CMatrix,
    layers: usize,
    sc_layers: usize,
}

impl Heterostructure {
    pub fn new(params: &PhysicalParameters) -> Result<Self, ModelError> {
        params.material.check_orbital_count(params.orbital_count)?;
        if params.layers == 0 || params.sc_layers > params.layers {
            return Err(ModelError::LayerCount {
                layers: params.layers,
                sc_layers: params.sc_layers,
            });
        }

        let n = params.orbital_count;
        let zeeman = zeeman_term(n, &params.zeeman);
        let shift = |mu: f64| &zeeman - identity(n) * real(mu);

        Ok(Self {
            topological: params
                .material
                .instantiate(params.dirac_mass, params.lattice_constant),
            superconductor: SwaveSuperconductor::new(params.superconductor, n),
            interface: InterfaceCoupling::new(params.interface_hopping, n),
            topological_shift: shift(params.chemical_potential.topological),
            superconductor_shift: shift(params.chemical_potential.superconductor),
            flip: spin_flip(n),
            layers: params.layers,
            sc_layers: params.sc_layers,
        })
    }

    /// BdG cell blocks of both regions and the interface at momentum `k`.
    pub fn build_cell_blocks(&self, k: MomentumPoint) -> HeterostructureBlocks {
        HeterostructureBlocks {
            superconductor: CellBlocks::build(
                &self.superconductor,
                k,
                &self.superconductor_shift,
                &self.flip,
            ),
            topological: CellBlocks::build(
                self.topological.as_ref(),
                k,
                &self.topological_shift,
                &self.flip,
            ),
            interface: self.interface.bdg_block(),
            layers: self.layers,
            sc_layers: self.sc_layers,
        }
    }
}

fn zeeman_term(orbital_count: usize, field: &ZeemanField) -> CMatrix {
    let mut term = CMatrix::zeros(orbital_count, orbital_count);
    if field.is_zero() {
        return term;
    }
    for (component, sigma) in field.components().into_iter().zip(Pauli::COMPONENTS) {
        if component != 0.0 {
            term += spin_operator(orbital_count, sigma) * real(component);
        }
    }
    term
}

/// Per-layer lookup of the BdG blocks of one momentum point.
#[derive(Debug, Clone)]
pub struct HeterostructureBlocks {
    pub superconductor: CellBlocks,
    pub topological: CellBlocks,
    pub interface: CMatrix,
    layers: usize,
    sc_layers: usize,
}

impl HeterostructureBlocks {
    fn region(&self, layer: usize) -> Region {
        if layer < self.sc_layers {
            Region::Superconductor
        } else {
            Region::Topological
        }
    }

    pub fn cell(&self, region: Region) -> &CellBlocks {
        match region {
            Region::Superconductor => &self.superconductor,
            Region::Topological => &self.topological,
        }
    }

    pub fn on_site(&self, layer: usize) -> &CMatrix {
        &self.cell(self.region(layer)).on_site
    }

    /// Block coupling `layer` to `layer + 1`, or `None` on the last layer.
    pub fn hop_to_next(&self, layer: usize) -> Option<&CMatrix> {
        if layer + 1 >= self.layers {
            return None;
        }
        if self.region(layer) != self.region(layer + 1) {
            return Some(&self.interface);
        }
        Some(&self.cell(self.region(layer)).hop_z)
    }

    /// Block coupling `layer` to `layer + 2`. Present only when both layers lie
    /// in the same region and that region's material has second-neighbour hopping.
    pub fn hop_to_next_next(&self, layer: usize) -> Option<&CMatrix> {
        if layer + 2 >= self.layers {
            return None;
        }
        let region = self.region(layer);
        if region != self.region(layer + 2) {
            return None;
        }
        self.cell(region).hop_zz.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material::{MaterialKind, SuperconductorParams};
    use crate::core::params::RegionValues;

    fn parameters(kind: MaterialKind, layers: usize, sc_layers: usize) -> PhysicalParameters {
        PhysicalParameters {
            dirac_mass: 0.5,
            chemical_potential: RegionValues::new(0.1, -0.2),
            interaction: RegionValues::new(0.0, -1.0),
            zeeman: ZeemanField::new(0.0, 0.0, 0.05),
            temperature: 5.0,
            lattice_constant: 4.14,
            material: kind.default_variant(),
            superconductor: SuperconductorParams::default(),
            interface_hopping: 0.2,
            layers,
            sc_layers,
            orbital_count: kind.required_orbitals(),
        }
    }

    #[test]
    fn rejects_mismatched_orbital_count() {
        let mut params = parameters(MaterialKind::Tci8, 4, 2);
        params.orbital_count = 4;
        assert!(matches!(
            Heterostructure::new(&params),
            Err(ModelError::OrbitalCountTooSmall { .. })
        ));
    }

    #[test]
    fn rejects_more_superconducting_layers_than_layers() {
        let params = parameters(MaterialKind::DiracTi, 3, 4);
        assert_eq!(
            Heterostructure::new(&params).unwrap_err(),
            ModelError::LayerCount {
                layers: 3,
                sc_layers: 4
            }
        );
    }

    #[test]
    fn interface_bond_sits_between_the_regions() {
        let params = parameters(MaterialKind::DiracTi, 5, 2);
        let stack = Heterostructure::new(&params).unwrap();
        let blocks = stack.build_cell_blocks(MomentumPoint::new(0.2, 0.1));

        assert_eq!(blocks.hop_to_next(1), Some(&blocks.interface));
        assert_eq!(blocks.hop_to_next(0), Some(&blocks.superconductor.hop_z));
        assert_eq!(blocks.hop_to_next(3), Some(&blocks.topological.hop_z));
        assert!(blocks.hop_to_next(4).is_none());
    }

    #[test]
    fn second_neighbour_hopping_never_crosses_the_interface() {
        let params = parameters(MaterialKind::Tci4, 6, 2);
        let stack = Heterostructure::new(&params).unwrap();
        let blocks = stack.build_cell_blocks(MomentumPoint::GAMMA);

        assert!(blocks.hop_to_next_next(0).is_none());
        assert!(blocks.hop_to_next_next(1).is_none());
        assert!(blocks.hop_to_next_next(2).is_some());
        assert!(blocks.hop_to_next_next(3).is_some());
        assert!(blocks.hop_to_next_next(4).is_none());
    }

    #[test]
    fn chemical_potential_is_applied_per_region() {
        let params = parameters(MaterialKind::DiracTi, 2, 1);
        let stack = Heterostructure::new(&params).unwrap();
        let blocks = stack.build_cell_blocks(MomentumPoint::new(0.3, -0.4));

        let sc = blocks.on_site(0);
        let bare = SwaveSuperconductor::new(params.superconductor, 4).on_site(MomentumPoint::new(0.3, -0.4));
        // Electron spin-up entry: band + 0.2 (from -mu) + 0.05 (Zeeman).
        assert!((sc[(0, 0)].re - (bare[(0, 0)].re + 0.2 + 0.05)).abs() < 1e-12);
        // Hole partner of the same state: -(band + 0.2) + Zeeman on the flipped spin.
        assert!((sc[(4, 4)].re - (-(bare[(0, 0)].re + 0.2) + 0.05)).abs() < 1e-12);
    }
}
