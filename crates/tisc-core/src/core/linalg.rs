use nalgebra::DMatrix;
use num_complex::Complex64;

/// Dense complex matrix used for every Hamiltonian block and eigenvector set.
pub type CMatrix = DMatrix<Complex64>;

pub const ZERO: Complex64 = Complex64::new(0.0, 0.0);
pub const ONE: Complex64 = Complex64::new(1.0, 0.0);
pub const I: Complex64 = Complex64::new(0.0, 1.0);

/// The identity and the three Pauli matrices.
///
/// The same four matrices act on spin (σ), on the A/B orbital pseudo-spin (τ),
/// and on the site index of eight-orbital models (ρ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pauli {
    Identity,
    X,
    Y,
    Z,
}

impl Pauli {
    pub const COMPONENTS: [Pauli; 3] = [Pauli::X, Pauli::Y, Pauli::Z];

    pub fn matrix(self) -> CMatrix {
        let entries = match self {
            Pauli::Identity => [ONE, ZERO, ZERO, ONE],
            Pauli::X => [ZERO, ONE, ONE, ZERO],
            Pauli::Y => [ZERO, -I, I, ZERO],
            Pauli::Z => [ONE, ZERO, ZERO, -ONE],
        };
        CMatrix::from_row_slice(2, 2, &entries)
    }
}

#[inline]
pub fn real(value: f64) -> Complex64 {
    Complex64::new(value, 0.0)
}

pub fn identity(n: usize) -> CMatrix {
    CMatrix::identity(n, n)
}

/// `coefficient · (τ ⊗ σ)` for a four-orbital (orbital ⊗ spin) block.
pub fn tau_sigma(coefficient: f64, tau: Pauli, sigma: Pauli) -> CMatrix {
    tau.matrix().kronecker(&sigma.matrix()) * real(coefficient)
}

/// `coefficient · (ρ ⊗ τ ⊗ σ)` for an eight-orbital (site ⊗ orbital ⊗ spin) block.
pub fn rho_tau_sigma(coefficient: f64, rho: Pauli, tau: Pauli, sigma: Pauli) -> CMatrix {
    rho.matrix()
        .kronecker(&tau.matrix())
        .kronecker(&sigma.matrix())
        * real(coefficient)
}

/// Spin operator `1_orbital ⊗ σ` on an electron block of `orbital_count` states.
pub fn spin_operator(orbital_count: usize, sigma: Pauli) -> CMatrix {
    identity(orbital_count / 2).kronecker(&sigma.matrix())
}

/// Pseudo-spin operator `τ ⊗ 1_spin`, where τ acts on the A and B halves of the
/// spatial orbitals.
pub fn pseudospin_operator(orbital_count: usize, tau: Pauli) -> CMatrix {
    let half = orbital_count / 4;
    tau.matrix()
        .kronecker(&identity(half))
        .kronecker(&Pauli::Identity.matrix())
}

/// The spin-flip `S = 1_orbital ⊗ iσ_y` that relates the hole sector to the
/// electron sector.
pub fn spin_flip(orbital_count: usize) -> CMatrix {
    spin_operator(orbital_count, Pauli::Y) * I
}

/// Largest elementwise deviation from `m == m†`.
pub fn hermiticity_defect(m: &CMatrix) -> f64 {
    let mut worst: f64 = 0.0;
    for r in 0..m.nrows() {
        for c in r..m.ncols() {
            worst = worst.max((m[(r, c)] - m[(c, r)].conj()).norm());
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-14;

    #[test]
    fn pauli_matrices_square_to_identity() {
        for p in Pauli::COMPONENTS {
            let m = p.matrix();
            assert!((&m * &m - identity(2)).norm() < TOLERANCE);
        }
    }

    #[test]
    fn pauli_matrices_anticommute() {
        let x = Pauli::X.matrix();
        let y = Pauli::Y.matrix();
        let z = Pauli::Z.matrix();
        assert!((&x * &y + &y * &x).norm() < TOLERANCE);
        assert!((&y * &z + &z * &y).norm() < TOLERANCE);
        assert!((&x * &y - &z * I).norm() < TOLERANCE);
    }

    #[test]
    fn spin_flip_is_real_orthogonal() {
        let s = spin_flip(8);
        assert!(s.iter().all(|z| z.im == 0.0));
        assert!((&s * s.adjoint() - identity(8)).norm() < TOLERANCE);
    }

    #[test]
    fn pseudospin_z_separates_a_and_b_halves() {
        let tz = pseudospin_operator(8, Pauli::Z);
        let diag: Vec<f64> = (0..8).map(|i| tz[(i, i)].re).collect();
        assert_eq!(diag, vec![1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0]);
    }

    #[test]
    fn kronecker_terms_are_hermitian() {
        let m = tau_sigma(0.7, Pauli::X, Pauli::Y) + tau_sigma(-1.3, Pauli::Y, Pauli::Identity);
        assert_eq!(hermiticity_defect(&m), 0.0);
        let m8 = rho_tau_sigma(0.2, Pauli::X, Pauli::Y, Pauli::Z);
        assert_eq!(hermiticity_defect(&m8), 0.0);
    }
}
