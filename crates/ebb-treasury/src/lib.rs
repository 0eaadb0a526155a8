// crates/ebb-treasury/src/lib.rs
//
// ebb-treasury: the epoch-gated seigniorage controller and bond market
// for the Ebb Protocol.
//
// The Treasury advances the protocol one epoch at a time: it reads the
// oracle price, expands or contracts supply, funds the boardroom and
// auxiliary funds, sells bonds below peg and redeems them above the
// ceiling, and retunes the share pool's emission rate as the price
// regime changes.

pub mod allocator;
pub mod epoch;
pub mod events;
pub mod params;
pub mod pricing;
pub mod treasury;

pub use allocator::{decide_regime, ExpansionSplit, Regime};
pub use epoch::EpochState;
pub use events::TreasuryEvent;
pub use params::{
    FundKind, FundSplit, FundSplitConfig, PriceRegimeConfig, SupplyRatchetState, TreasuryParams,
};
pub use pricing::{bond_discount_rate, bond_premium_rate};
pub use treasury::{Treasury, TreasuryCtx};
