//! Simulation driving: the sequential move loop with periodic reporting,
//! and parallel independent replicas.
//!
//! A single simulation is strictly sequential; parallelism only ever runs
//! *whole boards* side by side, each with its own RNG seeded from the base
//! seed plus the replica index.

use std::collections::BTreeMap;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::board::{Board, Params};
use crate::error::Result;

/// Configuration for one simulation run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Moves independent of arena size.
    pub total_moves: u64,
    /// Additional moves per unit in the arena.
    pub unit_moves: u64,
    /// Reporting period in moves; 0 disables periodic reports.
    pub period: u64,
    /// Log the fold string in each periodic report.
    pub log_folds: bool,
    /// Log sequence frequencies in each periodic report.
    pub log_seqs: bool,
    /// Render fold strings without ANSI colors.
    pub monochrome: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_moves: 0,
            unit_moves: 100,
            period: 1000,
            log_folds: false,
            log_seqs: false,
            monochrome: false,
        }
    }
}

impl SimConfig {
    /// Total number of move attempts for a given board.
    pub fn move_count(&self, board: &Board) -> u64 {
        self.total_moves + board.units().len() as u64 * self.unit_moves
    }
}

/// Outcome summary of a simulation run.
#[derive(Clone, Debug)]
pub struct SimSummary {
    /// Move attempts made.
    pub moves: u64,
    /// Moves that changed state.
    pub accepted: u64,
    /// Final fold energy.
    pub energy: f64,
    /// Final chain-sequence frequencies.
    pub seq_freqs: BTreeMap<String, usize>,
}

/// Run the move loop, invoking `on_period` with `(board, moves_done,
/// accepted)` every `period` moves.
pub fn run_with<F>(
    board: &mut Board,
    config: &SimConfig,
    rng: &mut StdRng,
    mut on_period: F,
) -> Result<SimSummary>
where
    F: FnMut(&Board, u64, u64) -> Result<()>,
{
    let total = config.move_count(board);
    let mut accepted = 0u64;
    for m in 1..=total {
        if board.try_move(rng)? {
            accepted += 1;
        }
        if config.period > 0 && m % config.period == 0 {
            on_period(board, m, accepted)?;
        }
    }
    Ok(SimSummary {
        moves: total,
        accepted,
        energy: board.fold_energy()?,
        seq_freqs: board.sequence_freqs(),
    })
}

/// Run the move loop with the standard periodic log report.
pub fn run(board: &mut Board, config: &SimConfig, rng: &mut StdRng) -> Result<SimSummary> {
    let summary = run_with(board, config, rng, |b, m, accepted| {
        info!(
            "move {}: accepted {} energy {:.3}",
            m,
            accepted,
            b.fold_energy()?
        );
        if config.log_folds {
            let fold = if config.monochrome {
                b.fold_string()
            } else {
                b.colored_fold_string()
            };
            info!("fold {}", fold);
        }
        if config.log_seqs {
            for (seq, count) in b.sequence_freqs() {
                info!("seq {} x{}", seq, count);
            }
        }
        Ok(())
    })?;
    info!(
        "done: {}/{} moves accepted, energy {:.3}",
        summary.accepted, summary.moves, summary.energy
    );
    Ok(summary)
}

/// Seeding recipe shared by all replicas of a run.
#[derive(Clone, Debug)]
pub struct ReplicaConfig {
    pub x_size: usize,
    pub y_size: usize,
    pub z_size: usize,
    /// Initial chain laid along +x, if any.
    pub init_seq: Option<String>,
    /// Scatter density for random monomers.
    pub density: f64,
    pub params: Params,
    pub sim: SimConfig,
}

/// Simulate `n_replicas` independent boards in parallel.
///
/// Replica `i` uses `StdRng::seed_from_u64(seed + i)`, so runs are
/// reproducible and replicas never share randomness.
pub fn run_replicas(config: &ReplicaConfig, n_replicas: usize, seed: u64) -> Result<Vec<SimSummary>> {
    (0..n_replicas)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            let mut board = Board::checked_new(config.x_size, config.y_size, config.z_size)?;
            board.params = config.params;
            if let Some(seq) = &config.init_seq {
                board.add_seq(seq)?;
            }
            if config.density > 0.0 {
                board.add_bases(config.density, &mut rng);
            }
            run_with(&mut board, &config.sim, &mut rng, |_, _, _| Ok(()))
        })
        .collect()
}
