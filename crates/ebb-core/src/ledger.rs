// crates/ebb-core/src/ledger.rs
//
// In-memory token ledger for the Ebb Protocol.
//
// Stands in for the external token contracts: standard balance,
// transfer, mint, and burn semantics with exact amounts (no
// fee-on-transfer behavior). Used by the treasury, the reward pools,
// the daemon's simulated deployment, and the test suites.

use std::collections::HashMap;

use crate::account::{AccountId, TokenId};
use crate::error::EbbError;
use crate::fixed;
use crate::token::Amount;

/// Balances and supplies for every token the protocol touches.
#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    balances: HashMap<(TokenId, AccountId), Amount>,
    supplies: HashMap<TokenId, Amount>,
}

impl TokenLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the balance of `account` in `token`.
    pub fn balance_of(&self, token: TokenId, account: &AccountId) -> Amount {
        self.balances.get(&(token, *account)).copied().unwrap_or(0)
    }

    /// Get the total supply of `token`.
    pub fn total_supply(&self, token: TokenId) -> Amount {
        self.supplies.get(&token).copied().unwrap_or(0)
    }

    /// Mint `amount` of `token` to `account`.
    pub fn mint(&mut self, token: TokenId, to: &AccountId, amount: Amount) -> Result<(), EbbError> {
        let balance = self.balance_of(token, to);
        let supply = self.total_supply(token);
        let new_balance = fixed::checked_add(balance, amount)?;
        let new_supply = fixed::checked_add(supply, amount)?;
        self.balances.insert((token, *to), new_balance);
        self.supplies.insert(token, new_supply);
        Ok(())
    }

    /// Burn `amount` of `token` from `account`.
    ///
    /// # Errors
    /// Returns `EbbError::InvalidState` if the account's balance is
    /// insufficient.
    pub fn burn(
        &mut self,
        token: TokenId,
        from: &AccountId,
        amount: Amount,
    ) -> Result<(), EbbError> {
        let balance = self.balance_of(token, from);
        if amount > balance {
            return Err(EbbError::InvalidState(format!(
                "burn of {} exceeds balance {}",
                amount, balance
            )));
        }
        let supply = self.total_supply(token);
        self.balances.insert((token, *from), balance - amount);
        self.supplies.insert(token, supply - amount);
        Ok(())
    }

    /// Transfer `amount` of `token` from one account to another.
    ///
    /// # Errors
    /// Returns `EbbError::InvalidState` if the sender's balance is
    /// insufficient.
    pub fn transfer(
        &mut self,
        token: TokenId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), EbbError> {
        let from_balance = self.balance_of(token, from);
        if amount > from_balance {
            return Err(EbbError::InvalidState(format!(
                "transfer of {} exceeds balance {}",
                amount, from_balance
            )));
        }
        if from == to {
            return Ok(());
        }
        let to_balance = fixed::checked_add(self.balance_of(token, to), amount)?;
        self.balances.insert((token, *from), from_balance - amount);
        self.balances.insert((token, *to), to_balance);
        Ok(())
    }
}
