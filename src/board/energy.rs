//! Base-pairing/stacking energy model and Metropolis acceptance.
//!
//! Energies follow the Boltzmann-factor sign convention: `calc_energy`
//! returns a value used as `exp(delta_e / temp)`, so a *higher* value means
//! a *more probable* state. Negate when reading it as physical free energy.

use rand::rngs::StdRng;
use rand::Rng;

use crate::board::state::Board;
use crate::board::unit::Unit;
use crate::error::{LatticeError, Result};

impl Board {
    /// Energy of the pair `(u, v)`: the base-pair term plus `stack_weight`
    /// times the stacking term for each chain-adjacent pair relation.
    ///
    /// Fails when the bases are not complementary or wobble-paired.
    pub fn calc_energy(&self, u: &Unit, v: &Unit, stack_weight: f64) -> Result<f64> {
        if !u.is_complement_or_wobble(v) {
            return Err(LatticeError::NotABasepair);
        }
        let mut e = match u.base as u32 * v.base as u32 {
            0 => self.params.au_energy,
            2 => self.params.gc_energy,
            6 => self.params.gu_energy,
            _ => return Err(LatticeError::NotABasepair),
        };
        if self.indices_paired(u.prev, v.next) {
            e += self.params.stack_energy * stack_weight;
        }
        if self.indices_paired(u.next, v.prev) {
            e += self.params.stack_energy * stack_weight;
        }
        Ok(e)
    }

    /// Full-weight pair energy, used when proposing merges and splits.
    pub fn pairing_energy(&self, u: &Unit, v: &Unit) -> Result<f64> {
        self.calc_energy(u, v, 1.0)
    }

    /// Metropolis-Hastings acceptance: accept with probability
    /// `min(1, exp(delta_e / temp) / fwd_back_ratio)`.
    ///
    /// `fwd_back_ratio` is the forward/backward proposal-probability ratio
    /// of the move class; merge/split use `1/split_prob` and `split_prob`
    /// to keep detailed balance between the two.
    pub fn accept_move(&self, delta_e: f64, fwd_back_ratio: f64, rng: &mut StdRng) -> bool {
        let p = (delta_e / self.params.temp).exp() / fwd_back_ratio;
        p >= 1.0 || rng.gen::<f64>() < p
    }
}
