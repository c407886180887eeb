//! The Monte Carlo move engine.
//!
//! One [`Board::try_move`] call is one proposal: pick a unit and a
//! neighborhood delta uniformly, classify the proposal by the occupancy of
//! the target cell and the pairing state of the unit, then accept or reject
//! under Metropolis-Hastings. Rejected and precondition-failing proposals
//! leave the board untouched and return `Ok(false)`.
//!
//! Move classes and their forward/backward proposal ratios:
//! - unpaired move into an empty cell: ratio 1, always accepted
//! - merge (unpaired unit onto an unpaired co-locatable partner): `1/split_prob`
//! - split (paired unit steps away alone): `split_prob`
//! - split-then-merge (paired unit re-pairs at the target): ratio 1
//! - pair-drag (both partners translate): self-inverse, always accepted
//! - end-joining (chain append onto an adjacent paired duplex end): link-only

use rand::rngs::StdRng;
use rand::Rng;

use crate::board::geometry::Vec3;
use crate::board::state::Board;
use crate::board::unit::Unit;
use crate::error::Result;

impl Board {
    /// Chain-adjacency precondition: both chain neighbors of `u`, where
    /// present, must remain adjacent to `new_pos`.
    pub fn can_move_to(&self, u: &Unit, new_pos: Vec3) -> bool {
        (u.next < 0 || self.adjacent(self.units[u.next as usize].pos, new_pos))
            && (u.prev < 0 || self.adjacent(self.units[u.prev as usize].pos, new_pos))
    }

    /// Whether `u` may pair with `v`.
    ///
    /// Requires complementary or wobble bases, and excludes pairings that
    /// would be geometrically degenerate on the lattice: immediate chain
    /// neighbors, two-hop chain neighbors (hairpins too tight to exist),
    /// and parallel stacking next to an existing pair.
    pub fn can_merge(&self, u: &Unit, v: &Unit) -> bool {
        if !u.is_complement_or_wobble(v) {
            return false;
        }
        if u.next == v.index || v.next == u.index {
            return false;
        }
        let u_next2 = if u.next >= 0 {
            self.units[u.next as usize].next
        } else {
            -1
        };
        let u_prev2 = if u.prev >= 0 {
            self.units[u.prev as usize].prev
        } else {
            -1
        };
        if u_next2 >= 0 && (u_next2 == v.index || u_next2 == v.prev) {
            return false;
        }
        if u_prev2 >= 0 && (u_prev2 == v.index || u_prev2 == v.next) {
            return false;
        }
        !self.indices_paired(u.prev, v.prev) && !self.indices_paired(u.next, v.next)
    }

    /// Attempt one Monte Carlo step. Returns whether the state changed.
    ///
    /// Errors only on a corrupted board (a resident pair whose bases do not
    /// form a base pair); boards built through this API never trigger that.
    pub fn try_move(&mut self, rng: &mut StdRng) -> Result<bool> {
        if self.units.is_empty() || self.neighborhood.is_empty() {
            return Ok(false);
        }
        let i = rng.gen_range(0..self.units.len());
        let delta = self.neighborhood[rng.gen_range(0..self.neighborhood.len())];
        let u = self.units[i];
        let new_pos = u.pos + delta;
        if !self.can_move_to(&u, new_pos) {
            return Ok(false);
        }
        let n_f = self.cell(new_pos, false);
        let n_r = self.cell(new_pos, true);

        let p_idx = self.paired_index(&u);
        if p_idx < 0 {
            // unpaired: free move, or merge onto an unpaired neighbor
            if n_f < 0 {
                self.move_unit(i, new_pos, false);
                return Ok(true);
            }
            let nbr = self.units[n_f as usize];
            if n_r < 0 && self.can_merge(&u, &nbr) {
                let gain = self.pairing_energy(&u, &nbr)?;
                if self.accept_move(gain, 1.0 / self.params.split_prob, rng) {
                    self.move_unit(i, new_pos, true);
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        let pi = p_idx as usize;
        let p = self.units[pi];
        let old_e = self.pairing_energy(&u, &p)?;

        if rng.gen::<f64>() < self.params.split_prob {
            // split: u steps away alone, p drops back to the forward slot
            if n_f < 0 {
                if self.accept_move(-old_e, self.params.split_prob, rng) {
                    self.move_unit(i, new_pos, false);
                    self.move_unit(pi, p.pos, false);
                    return Ok(true);
                }
            } else if n_r < 0 {
                // split-then-merge: u re-pairs with the occupant of the
                // target cell
                let nbr = self.units[n_f as usize];
                if self.can_merge(&u, &nbr) {
                    let new_e = self.pairing_energy(&u, &nbr)?;
                    if self.accept_move(new_e - old_e, 1.0, rng) {
                        self.move_unit(i, new_pos, true);
                        self.move_unit(pi, p.pos, false);
                        return Ok(true);
                    }
                }
            }
            return Ok(false);
        }

        // pair-drag: translate the pair intact
        if n_f < 0 && n_r < 0 && self.can_move_to(&p, new_pos) {
            self.move_unit(i, new_pos, u.rev);
            self.move_unit(pi, new_pos, p.rev);
            return Ok(true);
        }

        // end-joining: a chain tail next to a full duplex cell may ligate
        // onto it when its partner's predecessor sits in that cell
        if n_f >= 0 && n_r >= 0 && u.next < 0 {
            let nf = n_f as usize;
            let nr = n_r as usize;
            if p.prev == n_f && self.units[nr].prev < 0 {
                self.units[nr].prev = i as i32;
                self.units[i].next = n_r;
                return Ok(true);
            }
            if p.prev == n_r && self.units[nf].prev < 0 {
                self.units[nf].prev = i as i32;
                self.units[i].next = n_f;
                return Ok(true);
            }
        }
        Ok(false)
    }
}
