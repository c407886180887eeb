//! latfold: a lattice Monte Carlo simulator for RNA folding and
//! replication dynamics.
//!
//! Nucleotide monomers occupy the two slots (forward and reverse) of cells
//! on a 3-D periodic lattice. Units belong to chains through prev/next
//! arena links, pair by co-locating in opposite slots of one cell, and
//! move by local single-step proposals under a Metropolis-Hastings rule
//! with a simplified base-pairing/stacking energy model.
//!
//! The main entry points:
//! - [`Board`]: the simulation state, its seeding operations
//!   ([`Board::add_seq`], [`Board::add_bases`]), the Monte Carlo step
//!   ([`Board::try_move`]), reporting, and JSON persistence
//! - [`sim`]: the move loop with periodic reporting, and parallel
//!   independent replicas
//! - [`PairFreqMatrix`]: pair-frequency accumulation for rendering

pub mod board;
pub mod error;
pub mod sim;
pub mod stats;

pub use board::{Board, Params, Unit, Vec3};
pub use error::{LatticeError, Result};
pub use sim::{run, run_replicas, ReplicaConfig, SimConfig, SimSummary};
pub use stats::PairFreqMatrix;
