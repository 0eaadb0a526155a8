// crates/ebb-core/src/account.rs
//
// Account and token identifiers for the Ebb Protocol.
//
// Accounts are opaque 32-byte identifiers (external chain addresses,
// fund wallets, or protocol-owned accounts). The protocol itself issues
// three tokens; liquidity-pair tokens staked into reward pools are
// identified by a small index.

use serde::{Deserialize, Serialize};

/// Opaque 32-byte account identifier.
pub type AccountId = [u8; 32];

/// Build an account id from a single tag byte. Convenient for tests and
/// the simulated deployment in the daemon.
pub fn account(tag: u8) -> AccountId {
    let mut id = [0u8; 32];
    id[0] = tag;
    id
}

/// Identifier for a token tracked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenId {
    /// EBB — the primary elastic-supply token, pegged to 1.0.
    Ebb,
    /// EBND — the bond token minted below peg and redeemed above ceiling.
    Bond,
    /// FLOW — the governance/share token paid by the reward pools.
    Share,
    /// A liquidity-pair token staked into a reward pool, by index.
    Lp(u8),
}
