// crates/ebb-treasury/src/allocator.rs
//
// Regime decision and seigniorage arithmetic for one epoch.
//
// Pure helpers: the treasury snapshots the oracle price once per epoch
// and these functions turn that snapshot into a minting plan. Actual
// minting and distribution happen in the treasury.

use serde::{Deserialize, Serialize};

use ebb_core::error::EbbError;
use ebb_core::fixed;
use ebb_core::token::{Amount, BPS, WAD};

/// The price regime governing one epoch's allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// Early epochs: fixed expansion regardless of price.
    Bootstrap,
    /// Price above the ceiling: mint seigniorage.
    Expansion,
    /// Price below the peg: sell bonds, throttle share emission.
    Contraction,
    /// Price inside the band: do nothing.
    Neutral,
}

/// Decide the regime for an epoch from its snapshot price.
pub fn decide_regime(
    epoch: u64,
    bootstrap_epochs: u64,
    price: Amount,
    peg: Amount,
    ceiling: Amount,
) -> Regime {
    if epoch < bootstrap_epochs {
        Regime::Bootstrap
    } else if price > ceiling {
        Regime::Expansion
    } else if price < peg {
        Regime::Contraction
    } else {
        Regime::Neutral
    }
}

/// The wad fraction of supply to expand by: the price's excess over the
/// peg, capped by the ratcheted per-epoch maximum.
pub fn expansion_fraction(
    price: Amount,
    peg: Amount,
    max_expansion_bps: Amount,
) -> Result<Amount, EbbError> {
    let excess = fixed::checked_sub(price, peg)?;
    let cap = fixed::checked_mul(max_expansion_bps, WAD / BPS)?;
    Ok(excess.min(cap))
}

/// How one epoch's gross seigniorage is divided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionSplit {
    /// Minted and routed through the fund-split-and-boardroom path.
    pub to_boardroom: Amount,
    /// Minted straight into the treasury reserve for bond redemption.
    pub to_reserve: Amount,
}

/// Split gross seigniorage between the boardroom path and the reserve.
///
/// When the reserve already covers the configured fraction of bond
/// supply, everything goes to the boardroom. Otherwise a floor fraction
/// goes to the boardroom and the remainder — optionally scaled up by
/// the debt-repayment minting factor — replenishes the reserve.
pub fn split_expansion_seigniorage(
    seigniorage: Amount,
    reserve: Amount,
    bond_supply: Amount,
    depletion_floor_bps: Amount,
    expansion_floor_bps: Amount,
    minting_factor_bps: Amount,
) -> Result<ExpansionSplit, EbbError> {
    let covering = fixed::bps_of(bond_supply, depletion_floor_bps)?;
    if reserve >= covering {
        return Ok(ExpansionSplit {
            to_boardroom: seigniorage,
            to_reserve: 0,
        });
    }
    let to_boardroom = fixed::bps_of(seigniorage, expansion_floor_bps)?;
    let mut to_reserve = fixed::checked_sub(seigniorage, to_boardroom)?;
    if minting_factor_bps > 0 {
        to_reserve = fixed::bps_of(to_reserve, minting_factor_bps)?;
    }
    Ok(ExpansionSplit {
        to_boardroom,
        to_reserve,
    })
}
