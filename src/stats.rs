//! Pair-frequency accumulation over periodic samples of a run.
//!
//! The matrix is symmetric: sampling a pair `(i, j)` increments both
//! `[i, j]` and `[j, i]`. Rendering normalizes by the sample count.

use std::fmt::Write as _;

use ndarray::Array2;

use crate::board::Board;

/// Symmetric unit-by-unit pair occurrence counts.
#[derive(Clone, Debug)]
pub struct PairFreqMatrix {
    counts: Array2<u32>,
    samples: u32,
}

impl PairFreqMatrix {
    /// Create a zeroed matrix for an arena of `n_units`.
    pub fn new(n_units: usize) -> Self {
        Self {
            counts: Array2::zeros((n_units, n_units)),
            samples: 0,
        }
    }

    /// Record the current pairing of the board as one sample.
    ///
    /// Units appended after this matrix was sized are ignored.
    pub fn record(&mut self, board: &Board) {
        let n = self.counts.nrows();
        for (i, j) in board.index_pairs() {
            if i < n && j < n {
                self.counts[[i, j]] += 1;
                self.counts[[j, i]] += 1;
            }
        }
        self.samples += 1;
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn counts(&self) -> &Array2<u32> {
        &self.counts
    }

    /// Per-cell pair frequency in `[0, 1]`.
    pub fn normalized(&self) -> Array2<f64> {
        let denom = self.samples.max(1) as f64;
        self.counts.mapv(|c| c as f64 / denom)
    }

    /// Render the normalized matrix as CSV, one row per unit.
    pub fn to_csv(&self) -> String {
        let freqs = self.normalized();
        let mut out = String::new();
        for row in freqs.rows() {
            let mut first = true;
            for v in row {
                if !first {
                    out.push(',');
                }
                let _ = write!(out, "{}", v);
                first = false;
            }
            out.push('\n');
        }
        out
    }

    /// Render the normalized matrix as a binary PGM (P5) grayscale bitmap,
    /// white for frequency 1.
    pub fn to_pgm(&self) -> Vec<u8> {
        let n = self.counts.nrows();
        let freqs = self.normalized();
        let mut out = format!("P5\n{} {}\n255\n", n.max(1), n.max(1)).into_bytes();
        if n == 0 {
            out.push(0);
            return out;
        }
        for i in 0..n {
            for j in 0..n {
                out.push((freqs[[i, j]].clamp(0.0, 1.0) * 255.0).round() as u8);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::geometry::Vec3;
    use crate::board::unit::{char_to_base, Unit};

    fn paired_board() -> Board {
        let mut board = Board::new(4, 1, 1);
        for (base, pos, rev) in [
            ('a', Vec3::new(0, 0, 0), false),
            ('c', Vec3::new(1, 0, 0), false),
            ('u', Vec3::new(0, 0, 0), true),
        ] {
            let index = board.units().len() as i32;
            let u = Unit::new(char_to_base(base).unwrap(), pos, rev, index, -1, -1);
            board.set_cell(pos, rev, index);
            board.units.push(u);
        }
        board
    }

    #[test]
    fn test_record_is_symmetric() {
        let board = paired_board();
        let mut m = PairFreqMatrix::new(3);
        m.record(&board);
        m.record(&board);
        assert_eq!(m.samples(), 2);
        assert_eq!(m.counts()[[0, 2]], 2);
        assert_eq!(m.counts()[[2, 0]], 2);
        assert_eq!(m.counts()[[0, 1]], 0);
        assert_eq!(m.normalized()[[0, 2]], 1.0);
    }

    #[test]
    fn test_csv_shape() {
        let board = paired_board();
        let mut m = PairFreqMatrix::new(3);
        m.record(&board);
        let csv = m.to_csv();
        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.split(',').count() == 3));
        assert_eq!(rows[0].split(',').nth(2).unwrap(), "1");
    }

    #[test]
    fn test_pgm_header_and_payload() {
        let board = paired_board();
        let mut m = PairFreqMatrix::new(3);
        m.record(&board);
        let pgm = m.to_pgm();
        assert!(pgm.starts_with(b"P5\n3 3\n255\n"));
        let pixels = &pgm[b"P5\n3 3\n255\n".len()..];
        assert_eq!(pixels.len(), 9);
        assert_eq!(pixels[2], 255); // (0,2) paired in every sample
        assert_eq!(pixels[1], 0);
    }

    #[test]
    fn test_empty_matrix_renders() {
        let m = PairFreqMatrix::new(0);
        assert_eq!(m.to_csv(), "");
        assert!(m.to_pgm().starts_with(b"P5\n1 1\n255\n"));
    }
}
