//! latfold CLI entry point.
//!
//! Seeds or loads a board, runs the Monte Carlo loop with periodic
//! reports, and optionally writes the final state and the accumulated
//! pair-frequency matrix.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use latfold::{sim, Board, PairFreqMatrix, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "latfold")]
#[command(version)]
#[command(about = "Lattice Monte Carlo simulator for RNA folding and replication dynamics")]
struct Args {
    /// Board extent along x
    #[arg(short = 'x', long, default_value_t = 40)]
    xsize: usize,

    /// Board extent along y
    #[arg(short = 'y', long, default_value_t = 1)]
    ysize: usize,

    /// Board extent along z
    #[arg(short = 'z', long, default_value_t = 1)]
    zsize: usize,

    /// Initial RNA sequence, laid along +x from the origin
    #[arg(short = 'i', long)]
    init: Option<String>,

    /// Density of randomly scattered monomers in [0, 1]
    #[arg(short = 'd', long, default_value_t = 0.0)]
    density: f64,

    /// RNG seed (derived from the wall clock when absent)
    #[arg(short = 'r', long)]
    rnd: Option<u64>,

    /// Move attempts independent of arena size
    #[arg(short = 't', long, default_value_t = 0)]
    total_moves: u64,

    /// Additional move attempts per unit
    #[arg(short = 'u', long, default_value_t = 100)]
    unit_moves: u64,

    /// Log the fold string in each periodic report
    #[arg(short = 'f', long)]
    folds: bool,

    /// Log chain-sequence frequencies in each periodic report
    #[arg(short = 'q', long)]
    seqs: bool,

    /// Disable ANSI colors in fold strings
    #[arg(short = 'm', long)]
    monochrome: bool,

    /// Reporting period in moves (0 disables periodic reports)
    #[arg(short = 'p', long, default_value_t = 1000)]
    period: u64,

    /// Override the simulation temperature
    #[arg(short = 'T', long)]
    temp: Option<f64>,

    /// Load board state from a JSON file
    #[arg(short = 'l', long)]
    load: Option<PathBuf>,

    /// Save final board state to a JSON file
    #[arg(short = 's', long)]
    save: Option<PathBuf>,

    /// Annotate the saved JSON with fold, energy and sequence
    #[arg(short = 'j', long)]
    json: bool,

    /// Write the pair-frequency matrix as a PGM bitmap
    #[arg(short = 'b', long)]
    bitmap: Option<PathBuf>,

    /// Write the pair-frequency matrix as CSV
    #[arg(short = 'c', long)]
    csv: Option<PathBuf>,
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    let args = Args::parse();

    let seed = args.rnd.unwrap_or_else(wall_clock_seed);
    let mut rng = StdRng::seed_from_u64(seed);
    info!("seed {}", seed);

    let mut board = match &args.load {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Board::from_json_str(&text)?
        }
        None => Board::checked_new(args.xsize, args.ysize, args.zsize)?,
    };
    if let Some(temp) = args.temp {
        board.params.temp = temp;
    }
    if let Some(seq) = &args.init {
        board.add_seq(seq)?;
    }
    if args.density > 0.0 {
        board.add_bases(args.density, &mut rng);
    }
    board.assert_valid()?;
    info!(
        "board {}x{}x{}, {} units",
        board.x_size(),
        board.y_size(),
        board.z_size(),
        board.units().len()
    );

    let config = SimConfig {
        total_moves: args.total_moves,
        unit_moves: args.unit_moves,
        period: args.period,
        log_folds: args.folds,
        log_seqs: args.seqs,
        monochrome: args.monochrome,
    };

    let track_pairs = args.bitmap.is_some() || args.csv.is_some();
    let mut pair_freqs = PairFreqMatrix::new(board.units().len());
    let summary = sim::run_with(&mut board, &config, &mut rng, |b, m, accepted| {
        info!(
            "move {}: accepted {} energy {:.3}",
            m,
            accepted,
            b.fold_energy()?
        );
        if args.folds {
            let fold = if args.monochrome {
                b.fold_string()
            } else {
                b.colored_fold_string()
            };
            info!("fold {}", fold);
        }
        if args.seqs {
            for (seq, count) in b.sequence_freqs() {
                info!("seq {} x{}", seq, count);
            }
        }
        if track_pairs {
            pair_freqs.record(b);
        }
        Ok(())
    })?;
    info!(
        "done: {}/{} moves accepted, energy {:.3}",
        summary.accepted, summary.moves, summary.energy
    );

    if let Some(path) = &args.save {
        let value = if args.json {
            board.to_annotated_json()?
        } else {
            board.to_json()?
        };
        let text = serde_json::to_string_pretty(&value)?;
        fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        info!("saved board to {}", path.display());
    }
    if let Some(path) = &args.csv {
        fs::write(path, pair_freqs.to_csv())
            .with_context(|| format!("writing {}", path.display()))?;
    }
    if let Some(path) = &args.bitmap {
        fs::write(path, pair_freqs.to_pgm())
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
