use crate::core::linalg::CMatrix;
use crate::core::material::HeterostructureBlocks;
use crate::core::pairing::{OrderParameterState, PairingChannel, ProjectorSet};
use crate::core::params::PhysicalParameters;

/// Assembles the BdG Hamiltonian of one momentum point.
///
/// The matrix is laid out layer by layer, each layer holding its electron
/// sector followed by its hole sector. Every coupling is written as a pair: the
/// upper block as built, the lower block as its conjugate transpose. On-site
/// blocks are copied unchanged and must be Hermitian on their own.
#[derive(Debug, Clone, Copy)]
pub struct HamiltonianBuilder<'a> {
    params: &'a PhysicalParameters,
    projectors: &'a ProjectorSet,
    channels: &'a [PairingChannel],
}

impl<'a> HamiltonianBuilder<'a> {
    pub fn new(
        params: &'a PhysicalParameters,
        projectors: &'a ProjectorSet,
        channels: &'a [PairingChannel],
    ) -> Self {
        Self {
            params,
            projectors,
            channels,
        }
    }

    pub fn dimension(&self) -> usize {
        self.params.hamiltonian_dimension()
    }

    pub fn assemble(&self, blocks: &HeterostructureBlocks, state: &OrderParameterState) -> CMatrix {
        let n = self.params.orbital_count;
        let block = 2 * n;
        let mut h = CMatrix::zeros(self.dimension(), self.dimension());

        for layer in 0..self.params.layers {
            let row = layer * block;
            h.view_mut((row, row), (block, block))
                .copy_from(blocks.on_site(layer));

            if let Some(hop) = blocks.hop_to_next(layer) {
                write_coupling(&mut h, (row, row + block), hop);
            }
            if let Some(hop) = blocks.hop_to_next_next(layer) {
                write_coupling(&mut h, (row, row + 2 * block), hop);
            }

            if self.params.is_paired_layer(layer) {
                let delta = self
                    .projectors
                    .synthesize(&state.projections[layer], self.channels);
                write_coupling(&mut h, (row, row + n), &delta);
            }
        }

        h
    }
}

/// Places `block` at `(row, col)` and its conjugate transpose at `(col, row)`.
fn write_coupling(h: &mut CMatrix, (row, col): (usize, usize), block: &CMatrix) {
    let shape = (block.nrows(), block.ncols());
    h.view_mut((row, col), shape).copy_from(block);
    h.view_mut((col, row), (shape.1, shape.0))
        .copy_from(&block.adjoint());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::linalg::{hermiticity_defect, identity, real};
    use crate::core::material::{Heterostructure, MaterialKind, SuperconductorParams};
    use crate::core::momentum::MomentumPoint;
    use crate::core::params::{RegionValues, ZeemanField};
    use num_complex::Complex64;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn parameters(kind: MaterialKind) -> PhysicalParameters {
        PhysicalParameters {
            dirac_mass: 0.4,
            chemical_potential: RegionValues::new(0.05, -0.3),
            interaction: RegionValues::new(-0.2, -1.0),
            zeeman: ZeemanField::new(0.01, -0.02, 0.03),
            temperature: 3.0,
            lattice_constant: 4.14,
            material: kind.default_variant(),
            superconductor: SuperconductorParams::default(),
            interface_hopping: 0.15,
            layers: 5,
            sc_layers: 2,
            orbital_count: kind.required_orbitals(),
        }
    }

    fn random_state(rng: &mut StdRng, params: &PhysicalParameters, projectors: &ProjectorSet) -> OrderParameterState {
        let n = params.orbital_count;
        let layers = (0..params.layers)
            .map(|_| CMatrix::from_fn(n, n, |_, _| Complex64::new(rng.r#gen::<f64>() - 0.5, rng.r#gen::<f64>() - 0.5)))
            .collect();
        OrderParameterState::from_layers(layers, projectors)
    }

    #[test]
    fn hamiltonian_is_hermitian_for_every_variant() {
        let mut rng = StdRng::seed_from_u64(2024);
        let all_channels: Vec<_> = PairingChannel::all().collect();
        for kind in MaterialKind::ALL {
            let params = parameters(kind);
            let structure = Heterostructure::new(&params).unwrap();
            let projectors = ProjectorSet::new(params.orbital_count);
            let builder = HamiltonianBuilder::new(&params, &projectors, &all_channels);
            for _ in 0..3 {
                let k = MomentumPoint::new(rng.r#gen::<f64>() * 6.0 - 3.0, rng.r#gen::<f64>() * 6.0 - 3.0);
                let state = random_state(&mut rng, &params, &projectors);
                let h = builder.assemble(&structure.build_cell_blocks(k), &state);
                assert_eq!(h.nrows(), params.hamiltonian_dimension());
                assert!(hermiticity_defect(&h) < 1e-12, "variant {kind}");
            }
        }
    }

    #[test]
    fn on_site_blocks_are_copied_without_symmetrization() {
        let params = parameters(MaterialKind::DiracTi);
        let structure = Heterostructure::new(&params).unwrap();
        let projectors = ProjectorSet::new(4);
        let builder = HamiltonianBuilder::new(&params, &projectors, &PairingChannel::DEFAULT_ACTIVE);
        let state = OrderParameterState::zeros(params.layers, 4);

        let mut blocks = structure.build_cell_blocks(MomentumPoint::new(0.2, -0.1));
        blocks.topological.on_site[(1, 0)] += real(0.7);
        let h = builder.assemble(&blocks, &state);

        for layer in 0..params.layers {
            let row = layer * 8;
            assert_eq!(&h.view((row, row), (8, 8)).into_owned(), blocks.on_site(layer));
        }
        assert!((hermiticity_defect(&h) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn lower_couplings_are_adjoints_of_the_upper_ones() {
        let mut rng = StdRng::seed_from_u64(7);
        let all_channels: Vec<_> = PairingChannel::all().collect();
        let params = parameters(MaterialKind::Tci4);
        let structure = Heterostructure::new(&params).unwrap();
        let projectors = ProjectorSet::new(4);
        let builder = HamiltonianBuilder::new(&params, &projectors, &all_channels);
        let state = random_state(&mut rng, &params, &projectors);
        let blocks = structure.build_cell_blocks(MomentumPoint::new(0.4, 0.9));
        let h = builder.assemble(&blocks, &state);

        let upper = |r: usize, c: usize, size: usize| h.view((r, c), (size, size)).into_owned();
        for layer in 0..params.layers - 1 {
            let row = layer * 8;
            assert_eq!(upper(row, row + 8, 8), *blocks.hop_to_next(layer).unwrap());
            assert_eq!(upper(row + 8, row, 8), blocks.hop_to_next(layer).unwrap().adjoint());
        }
        let next_next = blocks.hop_to_next_next(2).unwrap();
        assert_eq!(upper(16, 32, 8), *next_next);
        assert_eq!(upper(32, 16, 8), next_next.adjoint());

        let delta = projectors.synthesize(&state.projections[0], &all_channels);
        assert_eq!(upper(0, 4, 4), delta);
        assert_eq!(upper(4, 0, 4), delta.adjoint());
    }

    #[test]
    fn pairing_enters_only_paired_layers() {
        let mut params = parameters(MaterialKind::DiracTi);
        params.interaction.topological = 0.0;
        let structure = Heterostructure::new(&params).unwrap();
        let projectors = ProjectorSet::new(4);
        let builder = HamiltonianBuilder::new(&params, &projectors, &PairingChannel::DEFAULT_ACTIVE);

        let layers = vec![identity(4) * real(0.25); params.layers];
        let state = OrderParameterState::from_layers(layers, &projectors);
        let h = builder.assemble(&structure.build_cell_blocks(MomentumPoint::GAMMA), &state);

        // Layer 0 is superconducting, layer 3 is topological without interaction.
        assert!((h.view((0, 4), (4, 4)).into_owned() - identity(4) * real(0.25)).norm() < 1e-15);
        assert!((h.view((4, 0), (4, 4)).into_owned() - identity(4) * real(0.25)).norm() < 1e-15);
        assert_eq!(h.view((24, 28), (4, 4)).norm(), 0.0);
    }

    #[test]
    fn layers_are_coupled_only_to_their_neighbours() {
        let params = parameters(MaterialKind::DiracTi);
        let structure = Heterostructure::new(&params).unwrap();
        let projectors = ProjectorSet::new(4);
        let builder = HamiltonianBuilder::new(&params, &projectors, &PairingChannel::DEFAULT_ACTIVE);
        let state = OrderParameterState::zeros(params.layers, 4);
        let h = builder.assemble(&structure.build_cell_blocks(MomentumPoint::new(0.2, 0.3)), &state);

        assert!(h.view((0, 8), (8, 8)).norm() > 0.0);
        assert_eq!(h.view((0, 16), (8, 8)).norm(), 0.0);
        assert_eq!(h.view((8, 24), (8, 8)).norm(), 0.0);
    }
}
