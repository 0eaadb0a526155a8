// crates/ebb-treasury/src/params.rs
//
// Governance-tunable configuration aggregates for the treasury.
//
// Each aggregate is immutable within a call; mutators validate their
// input independently and reject out-of-range values, so a snapshot of
// these structs is always internally consistent.

use serde::{Deserialize, Serialize};

use ebb_core::account::AccountId;
use ebb_core::error::EbbError;
use ebb_core::fixed;
use ebb_core::token::{Amount, BPS};

/// Expansion cap never ratchets below 25 bps (0.25% per epoch).
pub const MIN_EXPANSION_BPS: Amount = 25;

/// The boardroom's share of every fund split is at least half.
pub const BOARDROOM_MIN_SHARE_BPS: Amount = 5_000;

/// Price bands and bond pricing knobs. Prices and rates are wad.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRegimeConfig {
    /// Target price of the primary token (1.0).
    pub peg_price: Amount,
    /// Upper band above which redemption/expansion activates.
    pub price_ceiling: Amount,
    /// Ceiling on the bond discount rate; 0 disables the cap.
    pub max_discount_rate: Amount,
    /// Configured premium ceiling. Kept for the governance surface;
    /// the premium path shares the discount ceiling (see pricing).
    pub max_premium_rate: Amount,
    /// Fraction (bps) of the burn-to-peg bonus granted as discount.
    pub discount_percent: Amount,
    /// Fraction (bps) of the above-peg excess granted as premium.
    pub premium_percent: Amount,
    /// Maximum bond supply as a fraction (bps) of primary supply.
    pub max_debt_ratio_percent: Amount,
}

impl PriceRegimeConfig {
    /// Config with a 1.0 peg, a 1.001 ceiling, and the standard knobs.
    pub fn new(peg_price: Amount) -> Result<Self, EbbError> {
        Ok(Self {
            peg_price,
            price_ceiling: fixed::mul_div(peg_price, 10_010, BPS)?,
            max_discount_rate: 0,
            max_premium_rate: 0,
            discount_percent: 0,
            premium_percent: 6_500,
            max_debt_ratio_percent: 3_500,
        })
    }

    /// Ceiling must stay within [peg, peg * 1.2].
    pub fn set_price_ceiling(&mut self, value: Amount) -> Result<(), EbbError> {
        let upper = fixed::mul_div(self.peg_price, 12_000, BPS)?;
        if value < self.peg_price || value > upper {
            return Err(EbbError::InvalidState(format!(
                "price ceiling {} outside [{}, {}]",
                value, self.peg_price, upper
            )));
        }
        self.price_ceiling = value;
        Ok(())
    }

    pub fn set_max_discount_rate(&mut self, value: Amount) -> Result<(), EbbError> {
        if value != 0 && value < self.peg_price {
            return Err(EbbError::InvalidState(
                "discount ceiling below peg".to_string(),
            ));
        }
        self.max_discount_rate = value;
        Ok(())
    }

    pub fn set_max_premium_rate(&mut self, value: Amount) -> Result<(), EbbError> {
        if value != 0 && value < self.peg_price {
            return Err(EbbError::InvalidState(
                "premium ceiling below peg".to_string(),
            ));
        }
        self.max_premium_rate = value;
        Ok(())
    }

    /// At most 200% of the burn-to-peg bonus.
    pub fn set_discount_percent(&mut self, value: Amount) -> Result<(), EbbError> {
        if value > 20_000 {
            return Err(EbbError::InvalidState(format!(
                "discount percent {} exceeds 20000 bps",
                value
            )));
        }
        self.discount_percent = value;
        Ok(())
    }

    /// At most 200% of the above-peg excess.
    pub fn set_premium_percent(&mut self, value: Amount) -> Result<(), EbbError> {
        if value > 20_000 {
            return Err(EbbError::InvalidState(format!(
                "premium percent {} exceeds 20000 bps",
                value
            )));
        }
        self.premium_percent = value;
        Ok(())
    }

    /// Debt ceiling between 10% and 100% of primary supply.
    pub fn set_max_debt_ratio_percent(&mut self, value: Amount) -> Result<(), EbbError> {
        if !(1_000..=10_000).contains(&value) {
            return Err(EbbError::InvalidState(format!(
                "debt ratio {} outside [1000, 10000] bps",
                value
            )));
        }
        self.max_debt_ratio_percent = value;
        Ok(())
    }
}

/// The one-way supply ratchet: each time total supply crosses the
/// target, the target grows 25% and the per-epoch expansion cap decays
/// 5%, floored at `MIN_EXPANSION_BPS`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyRatchetState {
    pub next_supply_target: Amount,
    pub max_supply_expansion_bps: Amount,
}

impl SupplyRatchetState {
    pub fn new(initial_target: Amount, max_supply_expansion_bps: Amount) -> Self {
        Self {
            next_supply_target: initial_target,
            max_supply_expansion_bps,
        }
    }

    /// Apply the ratchet if `total_supply` has crossed the target.
    /// Returns whether a ratchet step happened.
    pub fn apply(&mut self, total_supply: Amount) -> Result<bool, EbbError> {
        if total_supply <= self.next_supply_target {
            return Ok(false);
        }
        self.next_supply_target = fixed::mul_div(self.next_supply_target, 12_500, BPS)?;
        self.max_supply_expansion_bps =
            fixed::mul_div(self.max_supply_expansion_bps, 9_500, BPS)?.max(MIN_EXPANSION_BPS);
        Ok(true)
    }

    /// Governance override of the expansion cap, between 10 bps and 10%.
    pub fn set_max_supply_expansion_bps(&mut self, value: Amount) -> Result<(), EbbError> {
        if !(10..=1_000).contains(&value) {
            return Err(EbbError::InvalidState(format!(
                "expansion cap {} outside [10, 1000] bps",
                value
            )));
        }
        self.max_supply_expansion_bps = value;
        Ok(())
    }
}

/// The auxiliary funds a seigniorage grant can be split across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundKind {
    Dao,
    Marketing,
    Insurance,
}

/// One auxiliary fund's recipient and share.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FundSplit {
    pub account: AccountId,
    pub share_bps: Amount,
}

/// Ordered fund-split table. The boardroom always receives the residual
/// after the auxiliary funds; it never has an explicit stored share.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FundSplitConfig {
    dao: Option<FundSplit>,
    marketing: Option<FundSplit>,
    insurance: Option<FundSplit>,
}

impl FundSplitConfig {
    /// Set or clear (with `share_bps == 0`) an auxiliary fund.
    ///
    /// # Errors
    /// Returns `EbbError::InvalidState` if the aggregate auxiliary
    /// share would leave the boardroom less than its minimum residual.
    pub fn set_fund(
        &mut self,
        kind: FundKind,
        account: AccountId,
        share_bps: Amount,
    ) -> Result<(), EbbError> {
        let replacement = if share_bps == 0 {
            None
        } else {
            Some(FundSplit { account, share_bps })
        };
        let share_of = |f: &Option<FundSplit>| f.map(|s| s.share_bps).unwrap_or(0);
        let total = match kind {
            FundKind::Dao => share_bps + share_of(&self.marketing) + share_of(&self.insurance),
            FundKind::Marketing => share_bps + share_of(&self.dao) + share_of(&self.insurance),
            FundKind::Insurance => share_bps + share_of(&self.dao) + share_of(&self.marketing),
        };
        if total > BPS - BOARDROOM_MIN_SHARE_BPS {
            return Err(EbbError::InvalidState(format!(
                "auxiliary fund shares {} bps exceed {} bps",
                total,
                BPS - BOARDROOM_MIN_SHARE_BPS
            )));
        }
        match kind {
            FundKind::Dao => self.dao = replacement,
            FundKind::Marketing => self.marketing = replacement,
            FundKind::Insurance => self.insurance = replacement,
        }
        Ok(())
    }

    /// The configured funds, in split order.
    pub fn funds(&self) -> Vec<(FundKind, FundSplit)> {
        let mut out = Vec::new();
        if let Some(f) = self.dao {
            out.push((FundKind::Dao, f));
        }
        if let Some(f) = self.marketing {
            out.push((FundKind::Marketing, f));
        }
        if let Some(f) = self.insurance {
            out.push((FundKind::Insurance, f));
        }
        out
    }
}

/// Remaining treasury-wide tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryParams {
    /// Epochs during which a fixed expansion is minted regardless of price.
    pub bootstrap_epochs: u64,
    /// Expansion minted per bootstrap epoch, in bps of supply.
    pub bootstrap_expansion_bps: Amount,
    /// Per-epoch contraction budget, in bps of supply.
    pub max_supply_contraction_bps: Amount,
    /// Reserve is considered debt-covering at this fraction of bond supply.
    pub bond_depletion_floor_bps: Amount,
    /// Boardroom-bound fraction of seigniorage while repaying debt.
    pub seigniorage_expansion_floor_bps: Amount,
    /// Scale-up (bps, 10000 = 1x) applied to the reserve-bound fraction.
    pub minting_factor_for_paying_debt_bps: Amount,
    /// Fixed salary minted to whoever advances the epoch; 0 disables.
    pub caller_salary: Amount,
}

impl Default for TreasuryParams {
    fn default() -> Self {
        Self {
            bootstrap_epochs: 21,
            bootstrap_expansion_bps: 450,
            max_supply_contraction_bps: 300,
            bond_depletion_floor_bps: 10_000,
            seigniorage_expansion_floor_bps: 3_500,
            minting_factor_for_paying_debt_bps: 10_000,
            caller_salary: 0,
        }
    }
}

impl TreasuryParams {
    pub fn set_bootstrap(&mut self, epochs: u64, expansion_bps: Amount) -> Result<(), EbbError> {
        if epochs > 120 {
            return Err(EbbError::InvalidState(
                "bootstrap period exceeds 120 epochs".to_string(),
            ));
        }
        if !(100..=1_000).contains(&expansion_bps) {
            return Err(EbbError::InvalidState(format!(
                "bootstrap expansion {} outside [100, 1000] bps",
                expansion_bps
            )));
        }
        self.bootstrap_epochs = epochs;
        self.bootstrap_expansion_bps = expansion_bps;
        Ok(())
    }

    pub fn set_max_supply_contraction_bps(&mut self, value: Amount) -> Result<(), EbbError> {
        if !(100..=1_500).contains(&value) {
            return Err(EbbError::InvalidState(format!(
                "contraction cap {} outside [100, 1500] bps",
                value
            )));
        }
        self.max_supply_contraction_bps = value;
        Ok(())
    }

    pub fn set_bond_depletion_floor_bps(&mut self, value: Amount) -> Result<(), EbbError> {
        if !(500..=10_000).contains(&value) {
            return Err(EbbError::InvalidState(format!(
                "bond depletion floor {} outside [500, 10000] bps",
                value
            )));
        }
        self.bond_depletion_floor_bps = value;
        Ok(())
    }

    pub fn set_seigniorage_expansion_floor_bps(&mut self, value: Amount) -> Result<(), EbbError> {
        if !(2_500..=10_000).contains(&value) {
            return Err(EbbError::InvalidState(format!(
                "seigniorage expansion floor {} outside [2500, 10000] bps",
                value
            )));
        }
        self.seigniorage_expansion_floor_bps = value;
        Ok(())
    }

    pub fn set_minting_factor_for_paying_debt_bps(&mut self, value: Amount) -> Result<(), EbbError> {
        if !(10_000..=20_000).contains(&value) {
            return Err(EbbError::InvalidState(format!(
                "minting factor {} outside [10000, 20000] bps",
                value
            )));
        }
        self.minting_factor_for_paying_debt_bps = value;
        Ok(())
    }

    pub fn set_caller_salary(&mut self, value: Amount, cap: Amount) -> Result<(), EbbError> {
        if value > cap {
            return Err(EbbError::InvalidState(format!(
                "caller salary {} exceeds cap {}",
                value, cap
            )));
        }
        self.caller_salary = value;
        Ok(())
    }
}
