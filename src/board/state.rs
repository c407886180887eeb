//! Board storage: the periodic cell lattice and the unit arena.
//!
//! Every cell has two slots (forward and reverse) stored in a flat array
//! laid out `rev + 2*(x + X*(y + Y*z))`. The arena is append-only: unit
//! indices are stable for the lifetime of the board, so chain links and
//! cell back-references can be plain integers.
//!
//! All mutation of a unit's location goes through [`Board::move_unit`],
//! which keeps the slot occupancy and the unit fields coherent.

use rand::rngs::StdRng;
use rand::Rng;

use crate::board::geometry::{self, Vec3};
use crate::board::params::Params;
use crate::board::unit::{char_to_base, Unit};
use crate::error::{LatticeError, Result};

/// The simulation state: lattice, arena, parameters.
pub struct Board {
    pub(crate) x_size: usize,
    pub(crate) y_size: usize,
    pub(crate) z_size: usize,
    /// Slot contents: arena index or -1. Length `2 * x * y * z`.
    pub(crate) cell_storage: Vec<i32>,
    /// Non-zero deltas of the adjacency box.
    pub(crate) neighborhood: Vec<Vec3>,
    /// Append-only unit arena; `units[k].index == k` always.
    pub(crate) units: Vec<Unit>,
    pub params: Params,
}

impl Board {
    /// Create an empty board. Extents must be at least 1.
    pub fn new(x_size: usize, y_size: usize, z_size: usize) -> Self {
        assert!(
            x_size >= 1 && y_size >= 1 && z_size >= 1,
            "board extents must be positive"
        );
        Self {
            x_size,
            y_size,
            z_size,
            cell_storage: vec![-1; 2 * x_size * y_size * z_size],
            neighborhood: geometry::neighborhood(x_size, y_size, z_size),
            units: Vec::new(),
            params: Params::default(),
        }
    }

    /// Checked constructor for runtime inputs (CLI arguments, board files,
    /// library callers): a zero extent is a validation error, not a panic.
    pub fn checked_new(x_size: usize, y_size: usize, z_size: usize) -> Result<Self> {
        if x_size == 0 || y_size == 0 || z_size == 0 {
            return Err(LatticeError::validation("board size must be positive"));
        }
        Ok(Self::new(x_size, y_size, z_size))
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn y_size(&self) -> usize {
        self.y_size
    }

    pub fn z_size(&self) -> usize {
        self.z_size
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn neighborhood(&self) -> &[Vec3] {
        &self.neighborhood
    }

    fn cell_index(&self, pos: Vec3, rev: bool) -> usize {
        let x = geometry::board_coord(pos.x, self.x_size) as usize;
        let y = geometry::board_coord(pos.y, self.y_size) as usize;
        let z = geometry::board_coord(pos.z, self.z_size) as usize;
        (rev as usize) + 2 * (x + self.x_size * (y + self.y_size * z))
    }

    /// Slot contents at the canonical cell of `pos`: arena index or -1.
    pub fn cell(&self, pos: Vec3, rev: bool) -> i32 {
        self.cell_storage[self.cell_index(pos, rev)]
    }

    pub(crate) fn set_cell(&mut self, pos: Vec3, rev: bool, value: i32) {
        let idx = self.cell_index(pos, rev);
        self.cell_storage[idx] = value;
    }

    /// Whether two raw positions name the same cell.
    pub fn board_coords_equal(&self, a: Vec3, b: Vec3) -> bool {
        geometry::board_coord(a.x, self.x_size) == geometry::board_coord(b.x, self.x_size)
            && geometry::board_coord(a.y, self.y_size) == geometry::board_coord(b.y, self.y_size)
            && geometry::board_coord(a.z, self.z_size) == geometry::board_coord(b.z, self.z_size)
    }

    /// Whether two positions are within one periodic step on every axis.
    pub fn adjacent(&self, a: Vec3, b: Vec3) -> bool {
        geometry::coord_adjacent(a.x, b.x, self.x_size)
            && geometry::coord_adjacent(a.y, b.y, self.y_size)
            && geometry::coord_adjacent(a.z, b.z, self.z_size)
    }

    /// Arena index of the unit sharing this unit's cell in the opposite
    /// slot, or -1 when unpaired.
    pub fn paired_index(&self, u: &Unit) -> i32 {
        self.cell(u.pos, !u.rev)
    }

    pub fn is_paired(&self, u: &Unit) -> bool {
        self.paired_index(u) >= 0
    }

    /// Whether two arena indices are both valid and name co-located units.
    pub fn indices_paired(&self, i: i32, j: i32) -> bool {
        i >= 0
            && j >= 0
            && self.board_coords_equal(self.units[i as usize].pos, self.units[j as usize].pos)
    }

    /// The single mutation primitive: relocate unit `i` to `(pos, rev)`,
    /// clearing its old slot and claiming the new one.
    pub(crate) fn move_unit(&mut self, i: usize, pos: Vec3, rev: bool) {
        let (old_pos, old_rev) = (self.units[i].pos, self.units[i].rev);
        self.set_cell(old_pos, old_rev, -1);
        self.units[i].pos = pos;
        self.units[i].rev = rev;
        self.set_cell(pos, rev, i as i32);
    }

    /// Lay a linear chain along +x from the origin, forward slots only.
    ///
    /// The whole sequence is validated before any unit is inserted, so a
    /// failed call leaves the board unchanged.
    pub fn add_seq(&mut self, seq: &str) -> Result<()> {
        let chars: Vec<char> = seq.chars().collect();
        if chars.len() > self.x_size {
            return Err(LatticeError::BoardTooSmall);
        }
        let mut bases = Vec::with_capacity(chars.len());
        for (i, &ch) in chars.iter().enumerate() {
            if self.cell(Vec3::new(i as i32, 0, 0), false) >= 0 {
                return Err(LatticeError::CellOccupied);
            }
            bases.push(char_to_base(ch.to_ascii_lowercase())?);
        }
        let n = bases.len();
        for (i, &base) in bases.iter().enumerate() {
            let index = self.units.len() as i32;
            let prev = if i > 0 { index - 1 } else { -1 };
            let next = if i + 1 < n { index + 1 } else { -1 };
            let u = Unit::new(base, Vec3::new(i as i32, 0, 0), false, index, prev, next);
            self.set_cell(u.pos, false, index);
            self.units.push(u);
        }
        Ok(())
    }

    /// Scatter unlinked monomers with uniform random bases into cells whose
    /// slots are both empty, each with probability `density`.
    pub fn add_bases(&mut self, density: f64, rng: &mut StdRng) {
        for x in 0..self.x_size as i32 {
            for y in 0..self.y_size as i32 {
                for z in 0..self.z_size as i32 {
                    let pos = Vec3::new(x, y, z);
                    if self.cell(pos, false) >= 0 || self.cell(pos, true) >= 0 {
                        continue;
                    }
                    if rng.gen::<f64>() < density {
                        let index = self.units.len() as i32;
                        let base: u8 = rng.gen_range(0..4);
                        let u = Unit::new(base, pos, false, index, -1, -1);
                        self.set_cell(pos, false, index);
                        self.units.push(u);
                    }
                }
            }
        }
    }

    /// Exhaustive O(V) consistency audit. Fails with a description of the
    /// first violation found.
    pub fn assert_valid(&self) -> Result<()> {
        let n = self.units.len();
        let mut occupied = 0usize;
        for x in 0..self.x_size as i32 {
            for y in 0..self.y_size as i32 {
                for z in 0..self.z_size as i32 {
                    let pos = Vec3::new(x, y, z);
                    for rev in [false, true] {
                        let k = self.cell(pos, rev);
                        if k < 0 {
                            continue;
                        }
                        occupied += 1;
                        if k as usize >= n {
                            return Err(LatticeError::validation(format!(
                                "incorrect index: cell {}/{} holds {} but arena has {} units",
                                pos, rev, k, n
                            )));
                        }
                        let u = &self.units[k as usize];
                        if u.index != k {
                            return Err(LatticeError::validation(format!(
                                "duplicate index: unit at cell {}/{} claims index {} not {}",
                                pos, rev, u.index, k
                            )));
                        }
                        if !self.board_coords_equal(u.pos, pos) || u.rev != rev {
                            return Err(LatticeError::validation(format!(
                                "mislocated unit {}: at cell {}/{} but records {}/{}",
                                k, pos, rev, u.pos, u.rev
                            )));
                        }
                    }
                    if self.cell(pos, true) >= 0 && self.cell(pos, false) < 0 {
                        return Err(LatticeError::validation(format!(
                            "orphaned reverse slot at {}",
                            pos
                        )));
                    }
                }
            }
        }
        if occupied != n {
            return Err(LatticeError::validation(format!(
                "missing unit: {} occupied slots for {} units",
                occupied, n
            )));
        }
        for (i, u) in self.units.iter().enumerate() {
            if u.index != i as i32 {
                return Err(LatticeError::validation(format!(
                    "incorrect index: unit {} records index {}",
                    i, u.index
                )));
            }
            if self.cell(u.pos, u.rev) != i as i32 {
                return Err(LatticeError::validation(format!(
                    "missing unit: {} not found at its own cell {}/{}",
                    i, u.pos, u.rev
                )));
            }
            for (link, tag) in [(u.prev, "prev"), (u.next, "next")] {
                if link >= 0 && link as usize >= n {
                    return Err(LatticeError::validation(format!(
                        "broken prev/next symmetry: unit {} {} link {} out of range",
                        i, tag, link
                    )));
                }
            }
            if u.prev >= 0 && self.units[u.prev as usize].next != i as i32 {
                return Err(LatticeError::validation(format!(
                    "broken prev/next symmetry: unit {} prev {} does not link back",
                    i, u.prev
                )));
            }
            if u.next >= 0 && self.units[u.next as usize].prev != i as i32 {
                return Err(LatticeError::validation(format!(
                    "broken prev/next symmetry: unit {} next {} does not link back",
                    i, u.next
                )));
            }
        }
        Ok(())
    }

    /// Require the arena to hold exactly one chain in arena order:
    /// `0 -> 1 -> ... -> N-1`.
    pub fn assert_linear(&self) -> Result<()> {
        let n = self.units.len() as i32;
        for (i, u) in self.units.iter().enumerate() {
            let i = i as i32;
            if u.index != i {
                return Err(LatticeError::validation(format!(
                    "incorrect index: unit {} records index {}",
                    i, u.index
                )));
            }
            let want_prev = if i == 0 { -1 } else { i - 1 };
            let want_next = if i == n - 1 { -1 } else { i + 1 };
            if u.prev != want_prev || u.next != want_next {
                return Err(LatticeError::validation(format!(
                    "unit {} is not in a linear chain (prev {}, next {})",
                    i, u.prev, u.next
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(4, 3, 2);
        assert_eq!(board.cell_storage.len(), 2 * 4 * 3 * 2);
        assert!(board.cell_storage.iter().all(|&c| c == -1));
        assert!(board.units().is_empty());
        board.assert_valid().unwrap();
    }

    #[test]
    fn test_checked_new_rejects_zero_extents() {
        assert!(matches!(
            Board::checked_new(0, 1, 1),
            Err(LatticeError::Validation(_))
        ));
        assert!(Board::checked_new(1, 0, 1).is_err());
        assert!(Board::checked_new(1, 1, 0).is_err());
        let board = Board::checked_new(3, 2, 1).unwrap();
        assert_eq!(board.x_size(), 3);
        board.assert_valid().unwrap();
    }

    #[test]
    fn test_add_seq_layout_and_links() {
        let mut board = Board::new(4, 1, 1);
        board.add_seq("acgu").unwrap();
        board.assert_valid().unwrap();
        board.assert_linear().unwrap();

        for (i, u) in board.units().iter().enumerate() {
            assert_eq!(u.pos, Vec3::new(i as i32, 0, 0));
            assert!(!u.rev);
            assert_eq!(u.index, i as i32);
        }
        assert_eq!(board.units()[0].prev, -1);
        assert_eq!(board.units()[0].next, 1);
        assert_eq!(board.units()[3].prev, 2);
        assert_eq!(board.units()[3].next, -1);
    }

    #[test]
    fn test_add_seq_uppercase_is_lowered() {
        let mut board = Board::new(4, 1, 1);
        board.add_seq("AcGu").unwrap();
        assert_eq!(board.units()[0].base_char(), 'a');
        assert_eq!(board.units()[2].base_char(), 'g');
    }

    #[test]
    fn test_add_seq_errors() {
        let mut board = Board::new(2, 1, 1);
        assert!(matches!(
            board.add_seq("acg"),
            Err(LatticeError::BoardTooSmall)
        ));

        let mut board = Board::new(4, 1, 1);
        assert!(matches!(board.add_seq("xcgu"), Err(LatticeError::NotRna)));
        // failed call must not leave partial state behind
        assert!(board.units().is_empty());
        board.assert_valid().unwrap();

        board.add_seq("ac").unwrap();
        assert!(matches!(
            board.add_seq("gu"),
            Err(LatticeError::CellOccupied)
        ));
    }

    #[test]
    fn test_add_bases_density_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut board = Board::new(5, 5, 1);
        board.add_bases(0.0, &mut rng);
        assert!(board.units().is_empty());

        board.add_bases(1.0, &mut rng);
        assert_eq!(board.units().len(), 25);
        board.assert_valid().unwrap();
        assert!(board.units().iter().all(|u| u.prev < 0 && u.next < 0));
    }

    #[test]
    fn test_add_bases_skips_occupied_cells() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut board = Board::new(4, 1, 1);
        board.add_seq("acgu").unwrap();
        board.add_bases(1.0, &mut rng);
        // no free cell anywhere
        assert_eq!(board.units().len(), 4);
    }

    #[test]
    fn test_move_unit_keeps_coherence() {
        let mut board = Board::new(4, 1, 1);
        board.add_seq("a").unwrap();
        board.move_unit(0, Vec3::new(1, 0, 0), false);
        assert_eq!(board.cell(Vec3::new(0, 0, 0), false), -1);
        assert_eq!(board.cell(Vec3::new(1, 0, 0), false), 0);
        board.assert_valid().unwrap();

        // raw positions survive wrapping
        board.move_unit(0, Vec3::new(-3, 0, 0), false);
        assert_eq!(board.units()[0].pos, Vec3::new(-3, 0, 0));
        assert_eq!(board.cell(Vec3::new(1, 0, 0), false), 0);
        board.assert_valid().unwrap();
    }

    #[test]
    fn test_assert_valid_detects_broken_links() {
        let mut board = Board::new(4, 1, 1);
        board.add_seq("acgu").unwrap();
        board.units[1].next = -1; // 2 still points back at 1
        let err = board.assert_valid().unwrap_err();
        assert!(err.to_string().contains("prev/next symmetry"));
    }

    #[test]
    fn test_assert_valid_detects_mislocated_unit() {
        let mut board = Board::new(4, 1, 1);
        board.add_seq("a").unwrap();
        board.units[0].pos = Vec3::new(2, 0, 0); // cell not updated
        let err = board.assert_valid().unwrap_err();
        assert!(err.to_string().contains("mislocated"));
    }

    #[test]
    fn test_assert_linear_rejects_monomers() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut board = Board::new(3, 3, 1);
        board.add_bases(1.0, &mut rng);
        assert!(board.assert_linear().is_err());
    }
}
