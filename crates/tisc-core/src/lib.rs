//! # TISC Core Library
//!
//! A self-consistent Bogoliubov-de Gennes (BdG) mean-field solver for layered
//! topological-insulator/superconductor heterostructures.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless physics: Pauli algebra, the momentum
//!   grid, the material models and their BdG cell blocks, the pairing channels,
//!   and the Hermitian eigensolver seam.
//!
//! - **[`engine`]: The Logic Core.** The stateful per-point machinery. It builds the
//!   Hamiltonian from the current order parameter, updates the order parameter from
//!   the eigenstates, drives the self-consistency loop, and extracts observables
//!   once a point has settled.
//!
//! - **[`workflows`]: The Public API.** Runs the engine over a whole momentum grid,
//!   distributed over workers, and gathers the per-point results into one
//!   [`engine::state::GlobalResultGrid`].

pub mod core;
pub mod engine;
pub mod workflows;
