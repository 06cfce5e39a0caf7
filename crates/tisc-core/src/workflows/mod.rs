//! # Workflows Module
//!
//! Top-level entry points of the library.
//!
//! - **Grid Workflow** ([`grid`]) - validates a [`SolverConfig`](crate::engine::config::SolverConfig),
//!   partitions the momentum grid over workers, solves every point self-consistently and
//!   gathers the results into a [`GlobalResultGrid`](crate::engine::state::GlobalResultGrid).

pub mod grid;
