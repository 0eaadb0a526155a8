// crates/ebb-core/src/traits.rs

use crate::error::EbbError;
use crate::token::Amount;

/// Trait for the external price oracle.
///
/// The oracle's TWAP computation is outside the protocol; the contract
/// here is only that it returns a wad price for the primary token and
/// may fail. A `consult` failure is fatal to the calling operation
/// (buy/redeem/allocate depend on a trustworthy price); an `update`
/// failure is advisory housekeeping and callers swallow it.
pub trait PriceOracle: Send + Sync {
    /// Query the current price of the primary token (wad, peg = 1.0).
    fn consult(&self) -> Result<Amount, EbbError>;

    /// Ask the oracle to refresh its observation window.
    fn update(&mut self) -> Result<(), EbbError>;

    /// Query the time-weighted average price (wad).
    fn twap(&self) -> Result<Amount, EbbError>;
}

/// Trait for the boardroom collaborator.
///
/// The boardroom's staking/voting/lock-up bookkeeping is external; the
/// treasury only notifies it of each seigniorage grant after funding it.
pub trait Boardroom: Send + Sync {
    /// Notify the boardroom that `amount` of the primary token was
    /// granted to it this epoch.
    fn allocate_seigniorage(&mut self, amount: Amount) -> Result<(), EbbError>;
}

/// Trait for the advisory epoch-statistics collaborator.
///
/// All methods are fire-and-forget; the treasury holds the collaborator
/// as an `Option` and skips recording when it is absent.
pub trait EpochStats: Send + Sync {
    /// Record the breakdown of one epoch's allocation.
    #[allow(clippy::too_many_arguments)]
    fn add_epoch_info(
        &mut self,
        epoch: u64,
        twap: Amount,
        expanded: Amount,
        boardroom_amount: Amount,
        dao_amount: Amount,
        marketing_amount: Amount,
        insurance_amount: Amount,
    );

    /// Record a bond purchase in the given epoch.
    fn add_bonded(&mut self, epoch: u64, amount: Amount);

    /// Record a bond redemption in the given epoch.
    fn add_redeemed(&mut self, epoch: u64, amount: Amount);
}
