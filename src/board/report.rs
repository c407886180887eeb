//! Read-only reporting over the board: sequences, fold strings, energies,
//! geometry summaries, and multi-chain sequence frequencies.

use std::collections::BTreeMap;

use log::warn;

use crate::board::state::Board;
use crate::error::Result;

/// Opening bracket per nesting level.
const LEFT_FOLD_CHARS: &str = "<[{(ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Closing bracket per nesting level.
const RIGHT_FOLD_CHARS: &str = ">]})abcdefghijklmnopqrstuvwxyz";

/// ANSI foreground colors cycled over bracket levels.
const LEVEL_COLORS: [&str; 6] = [
    "\x1b[31m", "\x1b[32m", "\x1b[33m", "\x1b[34m", "\x1b[35m", "\x1b[36m",
];
const COLOR_RESET: &str = "\x1b[0m";

/// Whether pair `(a, b)` crosses pair `(i, j)` in the pseudoknot sense.
fn crosses((a, b): (usize, usize), (i, j): (usize, usize)) -> bool {
    (i < a && a < j && j < b) || (a < i && i < b && b < j)
}

/// Lexicographically minimal rotation of a cyclic base sequence.
fn min_rotation(bases: &[char]) -> String {
    let n = bases.len();
    let mut best: Option<String> = None;
    for r in 0..n {
        let s: String = (0..n).map(|k| bases[(r + k) % n]).collect();
        if best.as_ref().map_or(true, |b| s < *b) {
            best = Some(s);
        }
    }
    best.unwrap_or_default()
}

impl Board {
    /// All pairs `(i, j)` with `i < j` of co-located opposite-slot units,
    /// in arena order of `i`.
    pub fn index_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, u) in self.units.iter().enumerate() {
            let j = self.paired_index(u);
            if j > i as i32 {
                pairs.push((i, j as usize));
            }
        }
        pairs
    }

    /// Base characters of the arena in index order.
    pub fn sequence(&self) -> String {
        self.units.iter().map(|u| u.base_char()).collect()
    }

    /// Total fold energy: pair energies with stacking half-weighted, so
    /// each stacking bond is counted once across its two pairs.
    pub fn fold_energy(&self) -> Result<f64> {
        let mut e = 0.0;
        for (i, j) in self.index_pairs() {
            e += self.calc_energy(&self.units[i], &self.units[j], 0.5)?;
        }
        Ok(e)
    }

    /// Per-position bracket characters and nesting levels.
    ///
    /// Each pair gets the lowest level whose already-assigned pairs it does
    /// not cross. When the bracket alphabet runs out the positions stay `.`
    /// (with a warning); that is a rendering limit, not an error.
    fn fold_assignment(&self) -> (Vec<char>, Vec<Option<usize>>) {
        let n = self.units.len();
        let left: Vec<char> = LEFT_FOLD_CHARS.chars().collect();
        let right: Vec<char> = RIGHT_FOLD_CHARS.chars().collect();
        let mut chars = vec!['.'; n];
        let mut level_of = vec![None; n];
        let mut levels: Vec<Vec<(usize, usize)>> = Vec::new();
        for (i, j) in self.index_pairs() {
            let found = levels
                .iter()
                .position(|assigned| assigned.iter().all(|&q| !crosses(q, (i, j))));
            let lvl = match found {
                Some(lvl) => lvl,
                None if levels.len() < left.len() => {
                    levels.push(Vec::new());
                    levels.len() - 1
                }
                None => {
                    warn!(
                        "fold string: no bracket level left for pair ({},{}); leaving dots",
                        i, j
                    );
                    continue;
                }
            };
            levels[lvl].push((i, j));
            chars[i] = left[lvl];
            chars[j] = right[lvl];
            level_of[i] = Some(lvl);
            level_of[j] = Some(lvl);
        }
        (chars, level_of)
    }

    /// Bracket-string rendering of the current pairing, `.` for unpaired.
    pub fn fold_string(&self) -> String {
        self.fold_assignment().0.into_iter().collect()
    }

    /// Fold string with one ANSI color per bracket level.
    pub fn colored_fold_string(&self) -> String {
        let (chars, level_of) = self.fold_assignment();
        let mut out = String::new();
        for (c, lvl) in chars.into_iter().zip(level_of) {
            match lvl {
                Some(l) => {
                    out.push_str(LEVEL_COLORS[l % LEVEL_COLORS.len()]);
                    out.push(c);
                    out.push_str(COLOR_RESET);
                }
                None => out.push(c),
            }
        }
        out
    }

    /// Mean of the raw (un-modded) unit positions.
    ///
    /// Only meaningful while no chain has wrapped around the torus.
    pub fn unit_centroid(&self) -> [f64; 3] {
        let n = self.units.len();
        if n == 0 {
            return [0.0; 3];
        }
        let mut c = [0.0; 3];
        for u in &self.units {
            c[0] += u.pos.x as f64;
            c[1] += u.pos.y as f64;
            c[2] += u.pos.z as f64;
        }
        c.map(|v| v / n as f64)
    }

    /// RMS distance of raw unit positions from their centroid.
    pub fn unit_radius_of_gyration(&self) -> f64 {
        let n = self.units.len();
        if n == 0 {
            return 0.0;
        }
        let c = self.unit_centroid();
        let sum: f64 = self
            .units
            .iter()
            .map(|u| {
                let dx = u.pos.x as f64 - c[0];
                let dy = u.pos.y as f64 - c[1];
                let dz = u.pos.z as f64 - c[2];
                dx * dx + dy * dy + dz * dz
            })
            .sum();
        (sum / n as f64).sqrt()
    }

    /// Occurrence counts of chain sequences.
    ///
    /// Walks each chain from its head (or detects a cycle); cyclic chains
    /// are canonicalized as their minimal rotation with a trailing `*`.
    pub fn sequence_freqs(&self) -> BTreeMap<String, usize> {
        let n = self.units.len();
        let mut freqs = BTreeMap::new();
        let mut visited = vec![false; n];
        for start in 0..n {
            if visited[start] {
                continue;
            }
            // rewind to the chain head, or back to `start` for a cycle
            let mut head = start;
            let mut cyclic = false;
            loop {
                let prev = self.units[head].prev;
                if prev < 0 {
                    break;
                }
                head = prev as usize;
                if head == start {
                    cyclic = true;
                    break;
                }
            }
            let mut bases = Vec::new();
            let mut cur = head;
            loop {
                visited[cur] = true;
                bases.push(self.units[cur].base_char());
                let next = self.units[cur].next;
                if next < 0 || next as usize == head {
                    break;
                }
                cur = next as usize;
            }
            let seq = if cyclic {
                let mut s = min_rotation(&bases);
                s.push('*');
                s
            } else {
                bases.into_iter().collect()
            };
            *freqs.entry(seq).or_insert(0) += 1;
        }
        freqs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::geometry::Vec3;
    use crate::board::unit::{char_to_base, Unit};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn place(board: &mut Board, base: char, pos: Vec3, rev: bool, prev: i32, next: i32) -> usize {
        let index = board.units.len() as i32;
        let u = Unit::new(char_to_base(base).unwrap(), pos, rev, index, prev, next);
        board.set_cell(pos, rev, index);
        board.units.push(u);
        index as usize
    }

    /// Every bracket level of a fold string must be a balanced Dyck word.
    fn assert_balanced(fold: &str) {
        let left: Vec<char> = LEFT_FOLD_CHARS.chars().collect();
        let right: Vec<char> = RIGHT_FOLD_CHARS.chars().collect();
        for lvl in 0..left.len() {
            let mut depth: i32 = 0;
            for c in fold.chars() {
                if c == left[lvl] {
                    depth += 1;
                } else if c == right[lvl] {
                    depth -= 1;
                    assert!(depth >= 0, "unbalanced level {} in {:?}", lvl, fold);
                }
            }
            assert_eq!(depth, 0, "unbalanced level {} in {:?}", lvl, fold);
        }
    }

    #[test]
    fn test_unpaired_chain_reports() {
        let mut board = Board::new(4, 1, 1);
        board.add_seq("acgu").unwrap();
        assert_eq!(board.sequence(), "acgu");
        assert_eq!(board.fold_string(), "....");
        assert_eq!(board.fold_energy().unwrap(), 0.0);
        assert!(board.index_pairs().is_empty());
    }

    #[test]
    fn test_single_pair_reports() {
        let mut board = Board::new(2, 1, 1);
        place(&mut board, 'a', Vec3::new(0, 0, 0), false, -1, -1);
        place(&mut board, 'u', Vec3::new(0, 0, 0), true, -1, -1);
        board.assert_valid().unwrap();
        assert_eq!(board.index_pairs(), vec![(0, 1)]);
        assert_eq!(board.fold_energy().unwrap(), board.params.au_energy);
        assert_eq!(board.fold_string(), "<>");
    }

    #[test]
    fn test_fold_string_nests_on_one_level() {
        // pairs (0,3) and (1,2) nest: both fit level 0
        let mut board = Board::new(4, 2, 1);
        place(&mut board, 'a', Vec3::new(0, 0, 0), false, -1, -1);
        place(&mut board, 'g', Vec3::new(1, 0, 0), false, -1, -1);
        place(&mut board, 'u', Vec3::new(1, 0, 0), true, -1, -1);
        place(&mut board, 'u', Vec3::new(0, 0, 0), true, -1, -1);
        board.assert_valid().unwrap();
        assert_eq!(board.index_pairs(), vec![(0, 3), (1, 2)]);
        assert_eq!(board.fold_string(), "<<>>");
        assert_balanced(&board.fold_string());
    }

    #[test]
    fn test_fold_string_pseudoknot_uses_second_level() {
        // pairs (0,2) and (1,3) cross: the second gets level 1
        let mut board = Board::new(4, 2, 1);
        place(&mut board, 'a', Vec3::new(0, 0, 0), false, -1, -1);
        place(&mut board, 'g', Vec3::new(2, 0, 0), false, -1, -1);
        place(&mut board, 'u', Vec3::new(0, 0, 0), true, -1, -1);
        place(&mut board, 'u', Vec3::new(2, 0, 0), true, -1, -1);
        board.assert_valid().unwrap();
        assert_eq!(board.index_pairs(), vec![(0, 2), (1, 3)]);
        assert_eq!(board.fold_string(), "<[>]");
        assert_balanced(&board.fold_string());
    }

    #[test]
    fn test_colored_fold_string_wraps_brackets_only() {
        let mut board = Board::new(2, 1, 1);
        place(&mut board, 'g', Vec3::new(0, 0, 0), false, -1, -1);
        place(&mut board, 'c', Vec3::new(0, 0, 0), true, -1, -1);
        place(&mut board, 'a', Vec3::new(1, 0, 0), false, -1, -1);
        let colored = board.colored_fold_string();
        assert!(colored.contains("\x1b[31m<\x1b[0m"));
        assert!(colored.ends_with('.'));
    }

    #[test]
    fn test_fold_string_balanced_after_soak() {
        let mut board = Board::new(12, 6, 2);
        board.add_seq("gcgcauaugcgc").unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..4000 {
            board.try_move(&mut rng).unwrap();
        }
        board.assert_valid().unwrap();
        assert_balanced(&board.fold_string());
        // fold energy agrees with the half-weighted pair sum
        let by_hand: f64 = board
            .index_pairs()
            .into_iter()
            .map(|(i, j)| {
                board
                    .calc_energy(&board.units()[i], &board.units()[j], 0.5)
                    .unwrap()
            })
            .sum();
        assert!((board.fold_energy().unwrap() - by_hand).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_and_radius_of_gyration() {
        let mut board = Board::new(4, 1, 1);
        board.add_seq("acgu").unwrap();
        assert_eq!(board.unit_centroid(), [1.5, 0.0, 0.0]);
        let rg = board.unit_radius_of_gyration();
        // positions 0..3 about 1.5: mean square = (2.25+0.25+0.25+2.25)/4
        assert!((rg - (1.25f64).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_board_geometry_summaries() {
        let board = Board::new(3, 3, 3);
        assert_eq!(board.unit_centroid(), [0.0; 3]);
        assert_eq!(board.unit_radius_of_gyration(), 0.0);
    }

    #[test]
    fn test_sequence_freqs_linear_and_monomers() {
        let mut board = Board::new(8, 2, 1);
        board.add_seq("acgu").unwrap();
        place(&mut board, 'g', Vec3::new(5, 1, 0), false, -1, -1);
        place(&mut board, 'g', Vec3::new(6, 1, 0), false, -1, -1);
        let freqs = board.sequence_freqs();
        assert_eq!(freqs.get("acgu"), Some(&1));
        assert_eq!(freqs.get("g"), Some(&2));
        // multiplicities cover the whole arena
        let covered: usize = freqs
            .iter()
            .map(|(s, c)| s.trim_end_matches('*').len() * c)
            .sum();
        assert_eq!(covered, board.units().len());
    }

    #[test]
    fn test_sequence_freqs_cyclic_canonicalization() {
        // a 4-cycle g->c->a->u->g laid around a 2x2 plaquette
        let mut board = Board::new(2, 2, 1);
        place(&mut board, 'g', Vec3::new(0, 0, 0), false, 3, 1);
        place(&mut board, 'c', Vec3::new(1, 0, 0), false, 0, 2);
        place(&mut board, 'a', Vec3::new(1, 1, 0), false, 1, 3);
        place(&mut board, 'u', Vec3::new(0, 1, 0), false, 2, 0);
        board.assert_valid().unwrap();
        let freqs = board.sequence_freqs();
        // rotations of "gcau": minimal is "augc"; cycle marker appended
        assert_eq!(freqs.get("augc*"), Some(&1));
        assert_eq!(freqs.len(), 1);
    }

    #[test]
    fn test_min_rotation_invariant_under_rotation() {
        let a: Vec<char> = "gcau".chars().collect();
        let b: Vec<char> = "caug".chars().collect();
        let c: Vec<char> = "augc".chars().collect();
        assert_eq!(min_rotation(&a), min_rotation(&b));
        assert_eq!(min_rotation(&a), min_rotation(&c));
        assert_eq!(min_rotation(&a), "augc");
    }
}
