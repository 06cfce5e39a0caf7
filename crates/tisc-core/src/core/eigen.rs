use super::linalg::CMatrix;
use nalgebra::{DVector, SymmetricEigen};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EigenError {
    #[error("Eigen-decomposition of a {dimension}x{dimension} Hermitian matrix did not converge")]
    NoConvergence { dimension: usize },

    #[error("Matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },
}

/// Eigenvalues in ascending order, with column `n` of `eigenvectors` belonging
/// to `eigenvalues[n]`.
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    pub eigenvalues: DVector<f64>,
    pub eigenvectors: CMatrix,
}

impl EigenDecomposition {
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }
}

/// A dense Hermitian eigensolver. The engine only ever talks to this seam, so
/// alternative backends can be swapped in without touching the iteration.
pub trait EigenSolver: Send + Sync {
    fn decompose(&self, matrix: CMatrix) -> Result<EigenDecomposition, EigenError>;
}

/// Hermitian eigensolver backed by nalgebra's implicit QR iteration.
#[derive(Debug, Clone, Copy)]
pub struct HermitianEigenSolver {
    pub epsilon: f64,
    /// Zero means no limit.
    pub max_iterations: usize,
}

impl Default for HermitianEigenSolver {
    fn default() -> Self {
        Self {
            epsilon: f64::EPSILON,
            max_iterations: 50_000,
        }
    }
}

impl EigenSolver for HermitianEigenSolver {
    fn decompose(&self, matrix: CMatrix) -> Result<EigenDecomposition, EigenError> {
        let (rows, cols) = matrix.shape();
        if rows != cols {
            return Err(EigenError::NotSquare { rows, cols });
        }

        let eigen = SymmetricEigen::try_new(matrix, self.epsilon, self.max_iterations)
            .ok_or(EigenError::NoConvergence { dimension: rows })?;

        let mut order: Vec<usize> = (0..rows).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

        let eigenvalues = DVector::from_iterator(rows, order.iter().map(|&i| eigen.eigenvalues[i]));
        let mut eigenvectors = CMatrix::zeros(rows, rows);
        for (target, &source) in order.iter().enumerate() {
            eigenvectors.set_column(target, &eigen.eigenvectors.column(source));
        }

        Ok(EigenDecomposition {
            eigenvalues,
            eigenvectors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::linalg::{Pauli, tau_sigma};
    use num_complex::Complex64;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const TOLERANCE: f64 = 1e-10;

    fn random_hermitian(rng: &mut StdRng, n: usize) -> CMatrix {
        let raw = CMatrix::from_fn(n, n, |_, _| {
            Complex64::new(rng.r#gen::<f64>() - 0.5, rng.r#gen::<f64>() - 0.5)
        });
        (&raw + raw.adjoint()) * Complex64::new(0.5, 0.0)
    }

    #[test]
    fn eigenvalues_are_sorted_ascending() {
        let mut rng = StdRng::seed_from_u64(7);
        let m = random_hermitian(&mut rng, 16);
        let eig = HermitianEigenSolver::default().decompose(m).unwrap();
        assert!(eig.eigenvalues.as_slice().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn decomposition_reconstructs_random_hermitian_matrix() {
        let mut rng = StdRng::seed_from_u64(42);
        let m = random_hermitian(&mut rng, 24);
        let eig = HermitianEigenSolver::default().decompose(m.clone()).unwrap();

        let diagonal = CMatrix::from_diagonal(&eig.eigenvalues.map(|e| Complex64::new(e, 0.0)));
        let rebuilt = &eig.eigenvectors * diagonal * eig.eigenvectors.adjoint();
        assert!((rebuilt - &m).norm() < TOLERANCE);

        let gram = eig.eigenvectors.adjoint() * &eig.eigenvectors;
        assert!((gram - CMatrix::identity(24, 24)).norm() < TOLERANCE);
    }

    #[test]
    fn each_column_is_an_eigenvector_of_its_eigenvalue() {
        let m = tau_sigma(0.3, Pauli::Z, Pauli::Identity) + tau_sigma(0.1, Pauli::X, Pauli::Y);
        let eig = HermitianEigenSolver::default().decompose(m.clone()).unwrap();
        for n in 0..eig.len() {
            let v = eig.eigenvectors.column(n);
            let residual = &m * v - v * Complex64::new(eig.eigenvalues[n], 0.0);
            assert!(residual.norm() < TOLERANCE);
        }
    }

    #[test]
    fn non_square_input_is_rejected() {
        let m = CMatrix::zeros(2, 3);
        assert_eq!(
            HermitianEigenSolver::default().decompose(m).unwrap_err(),
            EigenError::NotSquare { rows: 2, cols: 3 }
        );
    }
}
