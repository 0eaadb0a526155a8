// crates/ebb-daemon/src/oracle.rs
//
// Simulated price oracle for the daemon.
//
// A deterministic mean-reverting walk around the peg: each step pulls
// the price a little toward 1.0 and adds noise from a seeded rng, so
// every run with the same seed replays the same market.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ebb_core::error::EbbError;
use ebb_core::token::{Amount, BPS, WAD};
use ebb_core::traits::PriceOracle;

/// Fraction of the peg gap closed per step, in bps.
const REVERSION_BPS: u128 = 500;

/// Deterministic simulated market price.
pub struct SimOracle {
    price: Amount,
    peg: Amount,
    volatility_bps: u128,
    rng: StdRng,
    /// Price at the last `update`; `consult` serves this snapshot.
    snapshot: Amount,
}

impl SimOracle {
    pub fn new(peg: Amount, volatility_bps: u64, seed: u64) -> Self {
        Self {
            price: peg,
            peg,
            volatility_bps: u128::from(volatility_bps),
            rng: StdRng::seed_from_u64(seed),
            snapshot: peg,
        }
    }

    /// Advance the walk by one step.
    pub fn step(&mut self) {
        // Mean reversion toward the peg
        if self.price > self.peg {
            let gap = self.price - self.peg;
            self.price -= gap * REVERSION_BPS / BPS;
        } else {
            let gap = self.peg - self.price;
            self.price += gap * REVERSION_BPS / BPS;
        }

        // Symmetric noise in [-volatility, +volatility] bps
        let delta_bps: u128 = self.rng.gen_range(0..=2 * self.volatility_bps);
        let span = self.price * self.volatility_bps / BPS;
        let offset = self.price * delta_bps / (BPS * 2);
        self.price = (self.price + offset).saturating_sub(span / 2).max(WAD / 100);
    }
}

impl PriceOracle for SimOracle {
    fn consult(&self) -> Result<Amount, EbbError> {
        Ok(self.snapshot)
    }

    fn update(&mut self) -> Result<(), EbbError> {
        self.snapshot = self.price;
        Ok(())
    }

    fn twap(&self) -> Result<Amount, EbbError> {
        Ok(self.snapshot)
    }
}
