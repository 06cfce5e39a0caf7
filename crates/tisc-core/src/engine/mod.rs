//! # Engine Module
//!
//! The stateful machinery that solves one momentum point at a time.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - run settings, the builder and their validation
//! - **Hamiltonian** ([`hamiltonian`]) - BdG matrix assembly from cell blocks and the pairing field
//! - **Update** ([`updater`]) - the gap equation and the convergence metric
//! - **Iteration** ([`scf`]) - the per-point self-consistency state machine
//! - **Observables** ([`observables`]) - LDOS, band samples and the ground-state energy
//! - **Context** ([`context`]) - per-worker state tying the pieces together for one point
//! - **Distribution** ([`distribution`]) - static partition, broadcast and gather over workers
//! - **Results** ([`state`]) - per-point outcomes and the global result grid
//! - **Progress Monitoring** ([`progress`]) - progress events for front ends
//! - **Error Handling** ([`error`]) - engine-level error types

pub mod config;
pub mod context;
pub mod distribution;
pub mod error;
pub mod hamiltonian;
pub mod observables;
pub mod progress;
pub mod scf;
pub mod state;
pub mod updater;
