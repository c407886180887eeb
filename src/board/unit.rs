//! The monomer record and the RNA base alphabet.

use crate::board::geometry::Vec3;
use crate::error::{LatticeError, Result};

/// RNA base alphabet in encoding order: base `b` is `ALPHABET[b]`.
pub const ALPHABET: &str = "acgu";

/// Whether a (lowercase) character is an RNA base.
pub fn is_rna(c: char) -> bool {
    ALPHABET.contains(c)
}

/// Encode a lowercase base character as an integer in `0..4`.
pub fn char_to_base(c: char) -> Result<u8> {
    ALPHABET
        .find(c)
        .map(|i| i as u8)
        .ok_or(LatticeError::NotRna)
}

/// Decode a base integer back to its character.
///
/// Valid for `b < 4` only; callers hold that by construction.
pub fn base_to_char(b: u8) -> char {
    ALPHABET.as_bytes()[b as usize] as char
}

/// One monomer occupying a single cell slot.
///
/// Chain links are arena indices with `-1` meaning "no neighbor"; the
/// `index` field is the unit's own arena position and never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unit {
    /// Base in `0..4` (`a`, `c`, `g`, `u`).
    pub base: u8,
    /// Raw (un-modded) lattice position.
    pub pos: Vec3,
    /// Which slot of the cell this unit occupies.
    pub rev: bool,
    /// Own arena index.
    pub index: i32,
    /// Arena index of the chain predecessor, or -1.
    pub prev: i32,
    /// Arena index of the chain successor, or -1.
    pub next: i32,
}

impl Unit {
    pub fn new(base: u8, pos: Vec3, rev: bool, index: i32, prev: i32, next: i32) -> Self {
        Self {
            base,
            pos,
            rev,
            index,
            prev,
            next,
        }
    }

    pub fn base_char(&self) -> char {
        base_to_char(self.base)
    }

    /// Watson-Crick complement (`x + y == 3`) or G-U wobble (`x * y == 6`).
    pub fn is_complement_or_wobble(&self, other: &Unit) -> bool {
        let (x, y) = (self.base as i32, other.base as i32);
        x + y == 3 || x * y == 6
    }
}
