// crates/ebb-core/src/lib.rs
//
// ebb-core: Core types, fixed-point arithmetic, and collaborator traits
// for the Ebb Protocol.
//
// This is the leaf crate that all other crates in the workspace depend on.
// All monetary values are tracked in wad (18-decimal fixed point).
// 1 token = 10^18 wad.

pub mod account;
pub mod error;
pub mod fixed;
pub mod ledger;
pub mod token;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
pub use account::{AccountId, TokenId};
pub use error::EbbError;
pub use ledger::TokenLedger;
pub use token::{Amount, Wad, BPS, WAD};
pub use traits::{Boardroom, EpochStats, PriceOracle};
