//! # Core Module
//!
//! Stateless building blocks of the solver.
//!
//! - **Linear algebra** ([`linalg`]) - complex matrices, Pauli matrices and their Kronecker products
//! - **Momentum grid** ([`momentum`]) - in-plane momentum points and the regular grid
//! - **Parameters** ([`params`]) - the immutable physical inputs of a run
//! - **Materials** ([`material`]) - tight-binding models of the topological and
//!   superconducting layers and the assembled heterostructure
//! - **Pairing** ([`pairing`]) - pairing channels, projectors and order-parameter snapshots
//! - **Eigensolver** ([`eigen`]) - the Hermitian diagonalization capability

pub mod eigen;
pub mod linalg;
pub mod material;
pub mod momentum;
pub mod pairing;
pub mod params;
