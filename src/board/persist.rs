//! JSON persistence of board state.
//!
//! The wire schema keeps units in arena order (a unit's index is its array
//! position), omits `rev` when false and `prev`/`next` when -1, and ignores
//! unknown fields. Loading tolerates one-sided links by re-deriving `next`
//! pointers from `prev` pointers, then audits the reconstructed board.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::board::geometry::Vec3;
use crate::board::params::Params;
use crate::board::state::Board;
use crate::board::unit::{char_to_base, Unit};
use crate::error::{LatticeError, Result};

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_absent(i: &i32) -> bool {
    *i < 0
}

fn absent() -> i32 {
    -1
}

#[derive(Serialize, Deserialize)]
struct UnitDto {
    base: String,
    pos: [i32; 3],
    #[serde(default, skip_serializing_if = "is_false")]
    rev: bool,
    #[serde(default = "absent", skip_serializing_if = "is_absent")]
    prev: i32,
    #[serde(default = "absent", skip_serializing_if = "is_absent")]
    next: i32,
}

#[derive(Serialize, Deserialize)]
struct BoardDto {
    size: [usize; 3],
    #[serde(default)]
    params: Params,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    unit: Vec<UnitDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fold: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sequence: Option<String>,
}

impl Board {
    fn to_dto(&self, annotate: bool) -> Result<BoardDto> {
        let unit = self
            .units
            .iter()
            .map(|u| UnitDto {
                base: u.base_char().to_string(),
                pos: [u.pos.x, u.pos.y, u.pos.z],
                rev: u.rev,
                prev: u.prev,
                next: u.next,
            })
            .collect();
        Ok(BoardDto {
            size: [self.x_size, self.y_size, self.z_size],
            params: self.params,
            unit,
            fold: annotate.then(|| self.fold_string()),
            energy: if annotate {
                Some(self.fold_energy()?)
            } else {
                None
            },
            sequence: annotate.then(|| self.sequence()),
        })
    }

    /// Serialize the board. Audits the state first.
    pub fn to_json(&self) -> Result<Value> {
        self.assert_valid()?;
        Ok(serde_json::to_value(self.to_dto(false)?)?)
    }

    /// Serialize with the derived `fold`, `energy` and `sequence` fields.
    /// These are ignored on load.
    pub fn to_annotated_json(&self) -> Result<Value> {
        self.assert_valid()?;
        Ok(serde_json::to_value(self.to_dto(true)?)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json()?)?)
    }

    /// Reconstruct a board from its JSON form.
    pub fn from_json(value: &Value) -> Result<Board> {
        let dto: BoardDto = serde_json::from_value(value.clone())?;
        Self::from_dto(dto)
    }

    pub fn from_json_str(text: &str) -> Result<Board> {
        let dto: BoardDto = serde_json::from_str(text)?;
        Self::from_dto(dto)
    }

    fn from_dto(dto: BoardDto) -> Result<Board> {
        let [xs, ys, zs] = dto.size;
        let mut board = Board::checked_new(xs, ys, zs)?;
        board.params = dto.params;
        for (k, du) in dto.unit.iter().enumerate() {
            let c = du
                .base
                .chars()
                .next()
                .ok_or_else(|| LatticeError::validation(format!("unit {} has no base", k)))?;
            let base = char_to_base(c.to_ascii_lowercase())?;
            let pos = Vec3::new(du.pos[0], du.pos[1], du.pos[2]);
            let u = Unit::new(base, pos, du.rev, k as i32, du.prev, du.next);
            board.set_cell(pos, du.rev, k as i32);
            board.units.push(u);
        }
        // tolerate one-sided links: re-derive next from prev
        for k in 0..board.units.len() {
            let prev = board.units[k].prev;
            if prev >= 0 && (prev as usize) < board.units.len() {
                if board.units[prev as usize].next < 0 {
                    board.units[prev as usize].next = k as i32;
                }
            }
        }
        board.assert_valid()?;
        Ok(board)
    }
}
