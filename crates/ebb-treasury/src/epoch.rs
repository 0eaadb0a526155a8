// crates/ebb-treasury/src/epoch.rs
//
// Epoch gating for the treasury.
//
// Epoch windows are anchored to boundaries, not to wall-clock call
// times: a late epoch-advance moves `last_epoch_time` forward by
// exactly one epoch length, so windows never drift. The same caller
// cannot advance twice within one execution slot.

use serde::{Deserialize, Serialize};

use ebb_core::account::AccountId;
use ebb_core::error::EbbError;
use ebb_core::fixed;
use ebb_core::token::{Amount, BPS};

/// Epoch length bounds a governance call may choose (1 to 24 hours).
pub const MIN_EPOCH_LENGTH: u64 = 3_600;
pub const MAX_EPOCH_LENGTH: u64 = 86_400;

/// The treasury's epoch counter and per-epoch contraction budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochState {
    epoch: u64,
    epoch_length: u64,
    last_epoch_time: u64,
    contraction_budget_remaining: Amount,
    /// Caller and slot of the last successful advance.
    last_advance: Option<(AccountId, u64)>,
}

impl EpochState {
    /// Create epoch 0 with its window opening `epoch_length` after
    /// `start_time`.
    pub fn new(epoch_length: u64, start_time: u64) -> Self {
        Self {
            epoch: 0,
            epoch_length,
            last_epoch_time: start_time,
            contraction_budget_remaining: 0,
            last_advance: None,
        }
    }

    /// The current epoch index. Monotonically non-decreasing.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn epoch_length(&self) -> u64 {
        self.epoch_length
    }

    /// The timestamp at which the next epoch window opens.
    pub fn next_epoch_point(&self) -> u64 {
        self.last_epoch_time + self.epoch_length
    }

    /// Primary tokens that may still be bonded away this epoch.
    pub fn contraction_budget_remaining(&self) -> Amount {
        self.contraction_budget_remaining
    }

    /// Gate an epoch-advance attempt without mutating anything.
    ///
    /// # Errors
    /// `EbbError::EpochNotOpen` before the next epoch point, and
    /// `EbbError::InvalidState` if this caller already advanced within
    /// the same execution slot.
    pub fn check(&self, caller: &AccountId, now: u64) -> Result<(), EbbError> {
        if now < self.next_epoch_point() {
            return Err(EbbError::EpochNotOpen(format!(
                "next epoch point is {} but now is {}",
                self.next_epoch_point(),
                now
            )));
        }
        if self.last_advance == Some((*caller, now)) {
            return Err(EbbError::InvalidState(
                "caller already advanced the epoch in this slot".to_string(),
            ));
        }
        Ok(())
    }

    /// Commit a successful epoch advance.
    ///
    /// Moves `last_epoch_time` to the boundary just crossed, bumps the
    /// epoch counter, and rolls the contraction budget: zero when the
    /// price is above the ceiling, otherwise a fraction of supply.
    pub fn advance(
        &mut self,
        caller: &AccountId,
        now: u64,
        price: Amount,
        price_ceiling: Amount,
        total_supply: Amount,
        max_contraction_bps: Amount,
    ) -> Result<(), EbbError> {
        self.check(caller, now)?;
        self.last_epoch_time += self.epoch_length;
        self.epoch += 1;
        self.contraction_budget_remaining = if price > price_ceiling {
            0
        } else {
            fixed::mul_div(total_supply, max_contraction_bps, BPS)?
        };
        self.last_advance = Some((*caller, now));
        Ok(())
    }

    /// Spend part of this epoch's contraction budget.
    ///
    /// # Errors
    /// `EbbError::InvalidState` if `amount` exceeds the remainder.
    pub fn spend_contraction_budget(&mut self, amount: Amount) -> Result<(), EbbError> {
        if amount > self.contraction_budget_remaining {
            return Err(EbbError::InvalidState(format!(
                "bond purchase of {} exceeds remaining contraction budget {}",
                amount, self.contraction_budget_remaining
            )));
        }
        self.contraction_budget_remaining -= amount;
        Ok(())
    }

    /// Change the epoch length within [1h, 24h]. Takes effect for the
    /// currently open window onward; elapsed windows are untouched.
    pub fn set_epoch_length(&mut self, value: u64) -> Result<(), EbbError> {
        if !(MIN_EPOCH_LENGTH..=MAX_EPOCH_LENGTH).contains(&value) {
            return Err(EbbError::InvalidState(format!(
                "epoch length {} outside [{}, {}] seconds",
                value, MIN_EPOCH_LENGTH, MAX_EPOCH_LENGTH
            )));
        }
        self.epoch_length = value;
        Ok(())
    }
}
