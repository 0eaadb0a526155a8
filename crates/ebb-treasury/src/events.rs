// crates/ebb-treasury/src/events.rs
//
// Semantic event payloads for external indexers. Appended to the
// treasury's in-order event log by the operations that cause them.

use serde::{Deserialize, Serialize};

use ebb_core::account::AccountId;
use ebb_core::token::Amount;

use crate::params::FundKind;

/// Observable treasury events, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreasuryEvent {
    /// The boardroom was granted seigniorage.
    BoardroomFunded { timestamp: u64, amount: Amount },
    /// An auxiliary fund received its share of a seigniorage grant.
    FundFunded {
        timestamp: u64,
        fund: FundKind,
        amount: Amount,
    },
    /// Seigniorage was minted into the treasury reserve.
    TreasuryFunded { timestamp: u64, amount: Amount },
    /// A bond purchase: primary burned, bonds minted.
    BoughtBonds {
        timestamp: u64,
        who: AccountId,
        ebb_burned: Amount,
        bonds_minted: Amount,
    },
    /// A bond redemption: bonds burned, primary paid out.
    RedeemedBonds {
        timestamp: u64,
        who: AccountId,
        bonds_burned: Amount,
        ebb_paid: Amount,
    },
    /// The epoch-advance caller received their salary.
    CallerRewarded { who: AccountId, amount: Amount },
}
