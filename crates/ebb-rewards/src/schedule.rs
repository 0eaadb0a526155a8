// crates/ebb-rewards/src/schedule.rs
//
// Emission schedules for the reward pools.
//
// A schedule answers one question: how much reward is generated over a
// time interval. Two variants exist:
//   - Tiered: an ordered sequence of (end_time, rate) segments with a
//     fixed total emission window. Used by the genesis pool.
//   - Continuous: a single adjustable rate with a hard total cap and a
//     derived end time. Used by the share pool; the treasury retunes
//     the rate as the price regime changes.

use serde::{Deserialize, Serialize};

use ebb_core::error::EbbError;
use ebb_core::fixed;
use ebb_core::token::Amount;

/// One segment of a tiered schedule. The rate applies up to (and
/// including) `end_time`; the next tier takes over after that.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tier {
    /// Unix timestamp at which this tier's rate stops applying.
    pub end_time: u64,
    /// Emission rate in wad per second while this tier is active.
    pub rate_per_second: Amount,
}

/// A fixed schedule of rate tiers.
///
/// The first tier's rate extends backward over any time before its
/// boundary; after the last tier the rate is zero, which caps the total
/// emission of the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieredSchedule {
    tiers: Vec<Tier>,
}

impl TieredSchedule {
    /// Create a tiered schedule.
    ///
    /// # Errors
    /// Returns `EbbError::InvalidState` if the tier list is empty or
    /// the boundaries are not strictly increasing.
    pub fn new(tiers: Vec<Tier>) -> Result<Self, EbbError> {
        if tiers.is_empty() {
            return Err(EbbError::InvalidState(
                "tiered schedule requires at least one tier".to_string(),
            ));
        }
        for pair in tiers.windows(2) {
            if pair[1].end_time <= pair[0].end_time {
                return Err(EbbError::InvalidState(
                    "tier boundaries must be strictly increasing".to_string(),
                ));
            }
        }
        Ok(Self { tiers })
    }

    /// Total reward generated over `[from, to]`.
    ///
    /// Sums rate * overlap for each tier. Returns 0 for an empty or
    /// inverted interval and for any time past the last boundary.
    pub fn integrate(&self, from: u64, to: u64) -> Result<Amount, EbbError> {
        if to <= from {
            return Ok(0);
        }
        let mut total: Amount = 0;
        let mut segment_start: u64 = 0;
        for tier in &self.tiers {
            let lo = from.max(segment_start);
            let hi = to.min(tier.end_time);
            if hi > lo {
                let generated = fixed::checked_mul(tier.rate_per_second, (hi - lo) as u128)?;
                total = fixed::checked_add(total, generated)?;
            }
            segment_start = tier.end_time;
        }
        Ok(total)
    }

    /// The timestamp after which the schedule emits nothing.
    pub fn end_time(&self) -> u64 {
        self.tiers.last().map(|t| t.end_time).unwrap_or(0)
    }
}

/// A continuous emission schedule with an adjustable rate and a hard
/// total cap. The end time is always derived from the remaining budget
/// at the current rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuousSchedule {
    rate_per_second: Amount,
    start_time: u64,
    end_time: u64,
    total_cap: Amount,
    /// Lower/upper bounds an operator may retune the rate within.
    min_rate: Amount,
    max_rate: Amount,
    /// Emission accumulated under all previous rates.
    emitted_at_last_change: Amount,
    last_rate_change: u64,
}

impl ContinuousSchedule {
    /// Create a continuous schedule starting at `start_time`.
    ///
    /// # Errors
    /// Returns `EbbError::InvalidState` if the initial rate is zero,
    /// outside `[min_rate, max_rate]`, or the cap is zero.
    pub fn new(
        rate_per_second: Amount,
        start_time: u64,
        total_cap: Amount,
        min_rate: Amount,
        max_rate: Amount,
    ) -> Result<Self, EbbError> {
        if total_cap == 0 {
            return Err(EbbError::InvalidState(
                "continuous schedule requires a nonzero cap".to_string(),
            ));
        }
        if rate_per_second == 0 {
            return Err(EbbError::InvalidState(
                "continuous schedule requires a nonzero initial rate".to_string(),
            ));
        }
        if rate_per_second < min_rate || rate_per_second > max_rate {
            return Err(EbbError::InvalidState(format!(
                "initial rate {} outside band [{}, {}]",
                rate_per_second, min_rate, max_rate
            )));
        }
        let span = (total_cap / rate_per_second).min(u128::from(u64::MAX)) as u64;
        Ok(Self {
            rate_per_second,
            start_time,
            end_time: start_time.saturating_add(span),
            total_cap,
            min_rate,
            max_rate,
            emitted_at_last_change: 0,
            last_rate_change: start_time,
        })
    }

    /// The current emission rate in wad per second.
    pub fn rate(&self) -> Amount {
        self.rate_per_second
    }

    /// The derived end of the emission window.
    pub fn end_time(&self) -> u64 {
        self.end_time
    }

    /// Total reward generated over `[from, to]`, clamped to the
    /// schedule's `[start, end]` window. Returns 0 for an empty or
    /// inverted clamped interval.
    pub fn integrate(&self, from: u64, to: u64) -> Result<Amount, EbbError> {
        let lo = from.max(self.start_time);
        let hi = to.min(self.end_time);
        if hi <= lo {
            return Ok(0);
        }
        fixed::checked_mul(self.rate_per_second, (hi - lo) as u128)
    }

    /// Cumulative emission from the schedule start through `now`.
    fn emitted_through(&self, now: u64) -> Result<Amount, EbbError> {
        let lo = self.last_rate_change.max(self.start_time);
        let hi = now.min(self.end_time).max(lo);
        let since_change = fixed::checked_mul(self.rate_per_second, (hi - lo) as u128)?;
        fixed::checked_add(self.emitted_at_last_change, since_change)
    }

    /// Adopt a new emission rate at `now`.
    ///
    /// Accrual under the old rate is frozen first. If cumulative
    /// emission has already reached the cap, the rate drops to zero and
    /// the window ends immediately; otherwise the end time is re-derived
    /// from the remaining budget at the new rate.
    ///
    /// # Errors
    /// Returns `EbbError::InvalidState` if `new_rate` is outside the
    /// configured band.
    pub fn set_rate(&mut self, new_rate: Amount, now: u64) -> Result<(), EbbError> {
        if new_rate < self.min_rate || new_rate > self.max_rate {
            return Err(EbbError::InvalidState(format!(
                "rate {} outside band [{}, {}]",
                new_rate, self.min_rate, self.max_rate
            )));
        }
        let emitted = self.emitted_through(now)?;
        self.emitted_at_last_change = emitted;
        self.last_rate_change = now;
        if emitted >= self.total_cap || new_rate == 0 {
            self.rate_per_second = 0;
            self.end_time = now;
            return Ok(());
        }
        let remaining = self.total_cap - emitted;
        let span = (remaining / new_rate).min(u128::from(u64::MAX)) as u64;
        self.rate_per_second = new_rate;
        self.end_time = now.saturating_add(span);
        Ok(())
    }
}

/// An emission schedule, tagged by variant. The accrual engine only
/// ever calls `integrate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EmissionSchedule {
    Tiered(TieredSchedule),
    Continuous(ContinuousSchedule),
}

impl EmissionSchedule {
    /// Total reward generated over `[from, to]`.
    pub fn integrate(&self, from: u64, to: u64) -> Result<Amount, EbbError> {
        match self {
            EmissionSchedule::Tiered(s) => s.integrate(from, to),
            EmissionSchedule::Continuous(s) => s.integrate(from, to),
        }
    }
}
