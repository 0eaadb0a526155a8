// crates/ebb-treasury/src/pricing.rs
//
// Bond pricing: pure functions from the current price to the bond
// discount and premium rates. Both rates are wad prices; a zero rate
// means the operation is unavailable at the current price and callers
// must never divide by it.

use ebb_core::error::EbbError;
use ebb_core::fixed;
use ebb_core::token::{Amount, BPS};

use crate::params::PriceRegimeConfig;

/// Bonds granted per primary token burned while below peg.
///
/// With no discount configured the rate is the peg itself (1:1). With a
/// discount, the burn-to-peg bonus `peg * WAD / price - peg` is granted
/// in proportion to `discount_percent`, capped by `max_discount_rate`
/// when that cap is nonzero. Returns 0 above peg.
pub fn bond_discount_rate(cfg: &PriceRegimeConfig, price: Amount) -> Result<Amount, EbbError> {
    if price > cfg.peg_price {
        return Ok(0);
    }
    if cfg.discount_percent == 0 {
        return Ok(cfg.peg_price);
    }
    let bonds_per_token = fixed::wad_div(cfg.peg_price, price)?;
    let bonus = fixed::checked_sub(bonds_per_token, cfg.peg_price)?;
    let discount = fixed::mul_div(bonus, cfg.discount_percent, BPS)?;
    let mut rate = fixed::checked_add(cfg.peg_price, discount)?;
    if cfg.max_discount_rate > 0 && rate > cfg.max_discount_rate {
        rate = cfg.max_discount_rate;
    }
    Ok(rate)
}

/// Primary tokens paid per bond redeemed while above the ceiling.
///
/// With no premium percent configured the rate is the peg (1:1). With a
/// premium, the above-peg excess `price - peg` is granted in proportion
/// to `premium_percent`. The premium shares the discount ceiling:
/// `max_discount_rate` caps this rate too. Returns 0 at or below the
/// ceiling.
pub fn bond_premium_rate(cfg: &PriceRegimeConfig, price: Amount) -> Result<Amount, EbbError> {
    if price <= cfg.price_ceiling {
        return Ok(0);
    }
    if cfg.premium_percent == 0 {
        return Ok(cfg.peg_price);
    }
    let excess = fixed::checked_sub(price, cfg.peg_price)?;
    let premium = fixed::mul_div(excess, cfg.premium_percent, BPS)?;
    let mut rate = fixed::checked_add(cfg.peg_price, premium)?;
    if cfg.max_discount_rate > 0 && rate > cfg.max_discount_rate {
        rate = cfg.max_discount_rate;
    }
    Ok(rate)
}
