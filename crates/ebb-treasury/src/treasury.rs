// crates/ebb-treasury/src/treasury.rs
//
// The Treasury: composition root of the seigniorage state machine.
//
// Wires the epoch controller, bond pricing, seigniorage allocator, and
// parameter aggregates into the three externally callable operations:
// buy_bonds, redeem_bonds, and allocate_seigniorage. The treasury owns
// no tokens directly; its reserve lives in the ledger under
// `treasury_account` and collaborators are passed by reference into
// every operation.

use ebb_core::account::{AccountId, TokenId};
use ebb_core::error::EbbError;
use ebb_core::fixed;
use ebb_core::ledger::TokenLedger;
use ebb_core::token::{Amount, WAD};
use ebb_core::traits::{Boardroom, EpochStats, PriceOracle};

use ebb_rewards::pool::RewardPools;

use crate::allocator::{self, Regime};
use crate::epoch::EpochState;
use crate::events::TreasuryEvent;
use crate::params::{
    FundKind, FundSplitConfig, PriceRegimeConfig, SupplyRatchetState, TreasuryParams,
};
use crate::pricing;

/// Upper bound on the per-epoch caller salary.
pub const MAX_CALLER_SALARY: Amount = 100 * WAD;

/// Mutable collaborators threaded through every treasury operation.
pub struct TreasuryCtx<'a> {
    pub ledger: &'a mut TokenLedger,
    pub oracle: &'a mut dyn PriceOracle,
    pub boardroom: &'a mut dyn Boardroom,
    /// Advisory; `None` disables statistics recording.
    pub stats: Option<&'a mut dyn EpochStats>,
}

/// The epoch-gated seigniorage controller and bond market.
#[derive(Debug, Clone)]
pub struct Treasury {
    operator: AccountId,
    /// Ledger account holding the redemption reserve.
    treasury_account: AccountId,
    boardroom_account: AccountId,
    /// Reentrancy marker for the current top-level call tree.
    entered: bool,
    epoch_state: EpochState,
    regime_cfg: PriceRegimeConfig,
    ratchet: SupplyRatchetState,
    fund_split: FundSplitConfig,
    params: TreasuryParams,
    /// Reserve earmarked for bond redemption, in wad. Tracks (but may
    /// legitimately under-cover) the treasury account's balance.
    seigniorage_saved: Amount,
    previous_epoch_price: Amount,
    /// Share-pool emission rates adopted per regime.
    share_rate_expansion: Amount,
    share_rate_contraction: Amount,
    events: Vec<TreasuryEvent>,
}

impl Treasury {
    /// Create and initialize the treasury. Construction is the one-time
    /// initialization; epoch 0's window opens `epoch_length` after
    /// `start_time`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        operator: AccountId,
        treasury_account: AccountId,
        boardroom_account: AccountId,
        start_time: u64,
        epoch_length: u64,
        regime_cfg: PriceRegimeConfig,
        ratchet: SupplyRatchetState,
        params: TreasuryParams,
        share_rate_expansion: Amount,
        share_rate_contraction: Amount,
    ) -> Result<Self, EbbError> {
        let mut epoch_state = EpochState::new(epoch_length, start_time);
        // Route the length through the validated setter
        epoch_state.set_epoch_length(epoch_length)?;
        if share_rate_contraction > share_rate_expansion {
            return Err(EbbError::InvalidState(
                "contraction share rate exceeds expansion share rate".to_string(),
            ));
        }
        Ok(Self {
            operator,
            treasury_account,
            boardroom_account,
            entered: false,
            epoch_state,
            regime_cfg,
            ratchet,
            fund_split: FundSplitConfig::default(),
            params,
            seigniorage_saved: 0,
            previous_epoch_price: 0,
            share_rate_expansion,
            share_rate_contraction,
            events: Vec::new(),
        })
    }

    // -----------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------

    pub fn epoch(&self) -> u64 {
        self.epoch_state.epoch()
    }

    pub fn next_epoch_point(&self) -> u64 {
        self.epoch_state.next_epoch_point()
    }

    /// Primary tokens that may still be bonded away this epoch.
    pub fn burnable_ebb_left(&self) -> Amount {
        self.epoch_state.contraction_budget_remaining()
    }

    /// Reserve earmarked for bond redemption.
    pub fn reserve(&self) -> Amount {
        self.seigniorage_saved
    }

    /// The price snapshotted at the last epoch advance.
    pub fn previous_epoch_price(&self) -> Amount {
        self.previous_epoch_price
    }

    pub fn regime_cfg(&self) -> &PriceRegimeConfig {
        &self.regime_cfg
    }

    pub fn ratchet(&self) -> &SupplyRatchetState {
        &self.ratchet
    }

    pub fn params(&self) -> &TreasuryParams {
        &self.params
    }

    pub fn events(&self) -> &[TreasuryEvent] {
        &self.events
    }

    // -----------------------------------------------------------------
    // Reentrancy guard
    // -----------------------------------------------------------------

    fn enter(&mut self) -> Result<(), EbbError> {
        if self.entered {
            return Err(EbbError::Reentrancy(
                "treasury entry point re-entered".to_string(),
            ));
        }
        self.entered = true;
        Ok(())
    }

    fn ensure_operator(&self, caller: &AccountId) -> Result<(), EbbError> {
        if *caller != self.operator {
            return Err(EbbError::Unauthorized(
                "caller is not the treasury operator".to_string(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Bond market
    // -----------------------------------------------------------------

    /// Burn primary tokens for bonds at the current discount rate.
    /// Only available below peg, within this epoch's contraction
    /// budget, and under the debt ceiling. Returns the bonds minted.
    pub fn buy_bonds(
        &mut self,
        who: AccountId,
        amount: Amount,
        expected_price: Amount,
        now: u64,
        ctx: &mut TreasuryCtx,
    ) -> Result<Amount, EbbError> {
        self.enter()?;
        let ledger_before = ctx.ledger.clone();
        let state_before = self.clone();
        let result = self.buy_bonds_inner(who, amount, expected_price, now, ctx);
        if result.is_err() {
            *ctx.ledger = ledger_before;
            *self = state_before;
        }
        self.entered = false;
        result
    }

    fn buy_bonds_inner(
        &mut self,
        who: AccountId,
        amount: Amount,
        expected_price: Amount,
        now: u64,
        ctx: &mut TreasuryCtx,
    ) -> Result<Amount, EbbError> {
        if amount == 0 {
            return Err(EbbError::InvalidState(
                "cannot purchase zero bonds".to_string(),
            ));
        }
        let price = ctx.oracle.consult()?;
        if price != expected_price {
            return Err(EbbError::PriceMoved(format!(
                "expected {} but oracle reports {}",
                expected_price, price
            )));
        }
        if price >= self.regime_cfg.peg_price {
            return Err(EbbError::InvalidState(
                "bond purchase requires price below peg".to_string(),
            ));
        }
        if amount > self.epoch_state.contraction_budget_remaining() {
            return Err(EbbError::InvalidState(format!(
                "purchase of {} exceeds remaining contraction budget {}",
                amount,
                self.epoch_state.contraction_budget_remaining()
            )));
        }
        let rate = pricing::bond_discount_rate(&self.regime_cfg, price)?;
        if rate == 0 {
            return Err(EbbError::InvalidState(
                "bond discount unavailable at current price".to_string(),
            ));
        }
        let bonds = fixed::wad_mul(amount, rate)?;
        let new_bond_supply =
            fixed::checked_add(ctx.ledger.total_supply(TokenId::Bond), bonds)?;
        let debt_ceiling = fixed::bps_of(
            ctx.ledger.total_supply(TokenId::Ebb),
            self.regime_cfg.max_debt_ratio_percent,
        )?;
        if new_bond_supply > debt_ceiling {
            return Err(EbbError::InvalidState(format!(
                "bond supply {} would exceed debt ceiling {}",
                new_bond_supply, debt_ceiling
            )));
        }

        ctx.ledger.burn(TokenId::Ebb, &who, amount)?;
        ctx.ledger.mint(TokenId::Bond, &who, bonds)?;
        self.epoch_state.spend_contraction_budget(amount)?;
        self.refresh_oracle(ctx);
        if let Some(stats) = ctx.stats.as_deref_mut() {
            stats.add_bonded(self.epoch_state.epoch(), amount);
        }
        self.events.push(TreasuryEvent::BoughtBonds {
            timestamp: now,
            who,
            ebb_burned: amount,
            bonds_minted: bonds,
        });
        tracing::debug!(amount, bonds, "bonds purchased");
        Ok(bonds)
    }

    /// Burn bonds for primary tokens at the current premium rate.
    /// Only available above the ceiling and while the treasury account
    /// can cover the payout. Returns the primary tokens paid.
    pub fn redeem_bonds(
        &mut self,
        who: AccountId,
        amount: Amount,
        expected_price: Amount,
        now: u64,
        ctx: &mut TreasuryCtx,
    ) -> Result<Amount, EbbError> {
        self.enter()?;
        let ledger_before = ctx.ledger.clone();
        let state_before = self.clone();
        let result = self.redeem_bonds_inner(who, amount, expected_price, now, ctx);
        if result.is_err() {
            *ctx.ledger = ledger_before;
            *self = state_before;
        }
        self.entered = false;
        result
    }

    fn redeem_bonds_inner(
        &mut self,
        who: AccountId,
        amount: Amount,
        expected_price: Amount,
        now: u64,
        ctx: &mut TreasuryCtx,
    ) -> Result<Amount, EbbError> {
        if amount == 0 {
            return Err(EbbError::InvalidState(
                "cannot redeem zero bonds".to_string(),
            ));
        }
        let price = ctx.oracle.consult()?;
        if price != expected_price {
            return Err(EbbError::PriceMoved(format!(
                "expected {} but oracle reports {}",
                expected_price, price
            )));
        }
        if price <= self.regime_cfg.price_ceiling {
            return Err(EbbError::InvalidState(
                "bond redemption requires price above ceiling".to_string(),
            ));
        }
        let rate = pricing::bond_premium_rate(&self.regime_cfg, price)?;
        if rate == 0 {
            return Err(EbbError::InvalidState(
                "bond premium unavailable at current price".to_string(),
            ));
        }
        let payout = fixed::wad_mul(amount, rate)?;
        let balance = ctx.ledger.balance_of(TokenId::Ebb, &self.treasury_account);
        if payout > balance {
            return Err(EbbError::InvalidState(format!(
                "payout of {} exceeds treasury balance {}",
                payout, balance
            )));
        }

        ctx.ledger.burn(TokenId::Bond, &who, amount)?;
        // Reserve accounting may legitimately under-cover the payout;
        // saturate instead of failing. This is the one saturating
        // subtraction in the treasury.
        self.seigniorage_saved = self.seigniorage_saved.saturating_sub(payout);
        ctx.ledger
            .transfer(TokenId::Ebb, &self.treasury_account, &who, payout)?;
        self.refresh_oracle(ctx);
        if let Some(stats) = ctx.stats.as_deref_mut() {
            stats.add_redeemed(self.epoch_state.epoch(), amount);
        }
        self.events.push(TreasuryEvent::RedeemedBonds {
            timestamp: now,
            who,
            bonds_burned: amount,
            ebb_paid: payout,
        });
        tracing::debug!(amount, payout, "bonds redeemed");
        Ok(payout)
    }

    // -----------------------------------------------------------------
    // Epoch advance
    // -----------------------------------------------------------------

    /// Advance one epoch: snapshot the price, apply the supply ratchet,
    /// mint and distribute per the regime, retune the share pool, pay
    /// the caller salary, and roll the epoch state. Callable by anyone
    /// once the epoch window opens.
    pub fn allocate_seigniorage(
        &mut self,
        caller: AccountId,
        now: u64,
        ctx: &mut TreasuryCtx,
        share_pool: &mut RewardPools,
    ) -> Result<(), EbbError> {
        self.enter()?;
        // An aborted advance leaves no partial effects: every local
        // mutation (minted supply, counters, events, pool rate) rolls
        // back to the pre-call image on any failing step.
        let ledger_before = ctx.ledger.clone();
        let state_before = self.clone();
        let pool_before = share_pool.clone();
        let result = self.allocate_seigniorage_inner(caller, now, ctx, share_pool);
        if result.is_err() {
            *ctx.ledger = ledger_before;
            *self = state_before;
            *share_pool = pool_before;
        }
        self.entered = false;
        result
    }

    fn allocate_seigniorage_inner(
        &mut self,
        caller: AccountId,
        now: u64,
        ctx: &mut TreasuryCtx,
        share_pool: &mut RewardPools,
    ) -> Result<(), EbbError> {
        self.epoch_state.check(&caller, now)?;

        self.refresh_oracle(ctx);
        let price = ctx.oracle.consult()?;
        self.previous_epoch_price = price;

        let supply = ctx.ledger.total_supply(TokenId::Ebb);
        if self.ratchet.apply(supply)? {
            tracing::info!(
                supply_target = self.ratchet.next_supply_target,
                cap_bps = self.ratchet.max_supply_expansion_bps,
                "supply target crossed, expansion cap ratcheted"
            );
        }

        let regime = allocator::decide_regime(
            self.epoch_state.epoch(),
            self.params.bootstrap_epochs,
            price,
            self.regime_cfg.peg_price,
            self.regime_cfg.price_ceiling,
        );
        match regime {
            Regime::Bootstrap => {
                let expanded = fixed::bps_of(supply, self.params.bootstrap_expansion_bps)?;
                self.send_to_boardroom(expanded, price, now, ctx)?;
            }
            Regime::Expansion => {
                let fraction = allocator::expansion_fraction(
                    price,
                    self.regime_cfg.peg_price,
                    self.ratchet.max_supply_expansion_bps,
                )?;
                let seigniorage = fixed::wad_mul(supply, fraction)?;
                if seigniorage > 0 {
                    let split = allocator::split_expansion_seigniorage(
                        seigniorage,
                        self.seigniorage_saved,
                        ctx.ledger.total_supply(TokenId::Bond),
                        self.params.bond_depletion_floor_bps,
                        self.params.seigniorage_expansion_floor_bps,
                        self.params.minting_factor_for_paying_debt_bps,
                    )?;
                    if split.to_reserve > 0 {
                        ctx.ledger
                            .mint(TokenId::Ebb, &self.treasury_account, split.to_reserve)?;
                        self.seigniorage_saved =
                            fixed::checked_add(self.seigniorage_saved, split.to_reserve)?;
                        self.events.push(TreasuryEvent::TreasuryFunded {
                            timestamp: now,
                            amount: split.to_reserve,
                        });
                    }
                    if split.to_boardroom > 0 {
                        self.send_to_boardroom(split.to_boardroom, price, now, ctx)?;
                    }
                }
                self.retune_share_rate(self.share_rate_expansion, now, share_pool)?;
            }
            Regime::Contraction => {
                self.retune_share_rate(self.share_rate_contraction, now, share_pool)?;
            }
            Regime::Neutral => {}
        }

        if self.params.caller_salary > 0 {
            ctx.ledger
                .mint(TokenId::Ebb, &caller, self.params.caller_salary)?;
            self.events.push(TreasuryEvent::CallerRewarded {
                who: caller,
                amount: self.params.caller_salary,
            });
        }

        self.epoch_state.advance(
            &caller,
            now,
            price,
            self.regime_cfg.price_ceiling,
            ctx.ledger.total_supply(TokenId::Ebb),
            self.params.max_supply_contraction_bps,
        )?;
        tracing::info!(
            epoch = self.epoch_state.epoch(),
            price,
            ?regime,
            "epoch advanced"
        );
        Ok(())
    }

    /// Mint a seigniorage grant and split it: each configured auxiliary
    /// fund takes its share, the boardroom receives the residual and is
    /// notified so it can account for exactly that grant.
    fn send_to_boardroom(
        &mut self,
        amount: Amount,
        twap: Amount,
        now: u64,
        ctx: &mut TreasuryCtx,
    ) -> Result<(), EbbError> {
        if amount == 0 {
            return Ok(());
        }
        ctx.ledger
            .mint(TokenId::Ebb, &self.treasury_account, amount)?;
        let mut dao_amount = 0;
        let mut marketing_amount = 0;
        let mut insurance_amount = 0;
        for (kind, split) in self.fund_split.funds() {
            let part = fixed::bps_of(amount, split.share_bps)?;
            if part == 0 {
                continue;
            }
            ctx.ledger
                .transfer(TokenId::Ebb, &self.treasury_account, &split.account, part)?;
            self.events.push(TreasuryEvent::FundFunded {
                timestamp: now,
                fund: kind,
                amount: part,
            });
            match kind {
                FundKind::Dao => dao_amount = part,
                FundKind::Marketing => marketing_amount = part,
                FundKind::Insurance => insurance_amount = part,
            }
        }
        let aux_total = dao_amount + marketing_amount + insurance_amount;
        let boardroom_amount = fixed::checked_sub(amount, aux_total)?;
        ctx.ledger.transfer(
            TokenId::Ebb,
            &self.treasury_account,
            &self.boardroom_account,
            boardroom_amount,
        )?;
        ctx.boardroom.allocate_seigniorage(boardroom_amount)?;
        self.events.push(TreasuryEvent::BoardroomFunded {
            timestamp: now,
            amount: boardroom_amount,
        });
        if let Some(stats) = ctx.stats.as_deref_mut() {
            stats.add_epoch_info(
                self.epoch_state.epoch(),
                twap,
                amount,
                boardroom_amount,
                dao_amount,
                marketing_amount,
                insurance_amount,
            );
        }
        Ok(())
    }

    /// Adopt the regime's share emission rate if it differs from the
    /// pool's current rate. A tiered share pool has no rate to retune.
    fn retune_share_rate(
        &self,
        target: Amount,
        now: u64,
        share_pool: &mut RewardPools,
    ) -> Result<(), EbbError> {
        match share_pool.current_rate() {
            Some(rate) if rate != target => {
                share_pool.set_reward_rate(self.operator, target, now)?;
                tracing::info!(rate = target, "retuned share emission rate");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Best-effort oracle refresh; failures are advisory and swallowed.
    fn refresh_oracle(&self, ctx: &mut TreasuryCtx) {
        if let Err(e) = ctx.oracle.update() {
            tracing::warn!("oracle update failed: {}", e);
        }
    }

    // -----------------------------------------------------------------
    // Governance surface
    // -----------------------------------------------------------------

    pub fn set_operator(&mut self, caller: AccountId, new_operator: AccountId) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.operator = new_operator;
        Ok(())
    }

    pub fn set_epoch_length(&mut self, caller: AccountId, value: u64) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.epoch_state.set_epoch_length(value)
    }

    pub fn set_price_ceiling(&mut self, caller: AccountId, value: Amount) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.regime_cfg.set_price_ceiling(value)
    }

    pub fn set_max_discount_rate(&mut self, caller: AccountId, value: Amount) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.regime_cfg.set_max_discount_rate(value)
    }

    pub fn set_max_premium_rate(&mut self, caller: AccountId, value: Amount) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.regime_cfg.set_max_premium_rate(value)
    }

    pub fn set_discount_percent(&mut self, caller: AccountId, value: Amount) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.regime_cfg.set_discount_percent(value)
    }

    pub fn set_premium_percent(&mut self, caller: AccountId, value: Amount) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.regime_cfg.set_premium_percent(value)
    }

    pub fn set_max_debt_ratio_percent(
        &mut self,
        caller: AccountId,
        value: Amount,
    ) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.regime_cfg.set_max_debt_ratio_percent(value)
    }

    pub fn set_max_supply_expansion_bps(
        &mut self,
        caller: AccountId,
        value: Amount,
    ) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.ratchet.set_max_supply_expansion_bps(value)
    }

    pub fn set_max_supply_contraction_bps(
        &mut self,
        caller: AccountId,
        value: Amount,
    ) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.params.set_max_supply_contraction_bps(value)
    }

    pub fn set_bootstrap(
        &mut self,
        caller: AccountId,
        epochs: u64,
        expansion_bps: Amount,
    ) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.params.set_bootstrap(epochs, expansion_bps)
    }

    pub fn set_fund(
        &mut self,
        caller: AccountId,
        kind: FundKind,
        account: AccountId,
        share_bps: Amount,
    ) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.fund_split.set_fund(kind, account, share_bps)
    }

    pub fn set_bond_depletion_floor_bps(
        &mut self,
        caller: AccountId,
        value: Amount,
    ) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.params.set_bond_depletion_floor_bps(value)
    }

    pub fn set_seigniorage_expansion_floor_bps(
        &mut self,
        caller: AccountId,
        value: Amount,
    ) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.params.set_seigniorage_expansion_floor_bps(value)
    }

    pub fn set_minting_factor_for_paying_debt_bps(
        &mut self,
        caller: AccountId,
        value: Amount,
    ) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.params.set_minting_factor_for_paying_debt_bps(value)
    }

    pub fn set_caller_salary(&mut self, caller: AccountId, value: Amount) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        self.params.set_caller_salary(value, MAX_CALLER_SALARY)
    }

    pub fn set_share_rates(
        &mut self,
        caller: AccountId,
        expansion: Amount,
        contraction: Amount,
    ) -> Result<(), EbbError> {
        self.ensure_operator(&caller)?;
        if contraction > expansion {
            return Err(EbbError::InvalidState(
                "contraction share rate exceeds expansion share rate".to_string(),
            ));
        }
        self.share_rate_expansion = expansion;
        self.share_rate_contraction = contraction;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ebb_core::account::account;
    use ebb_rewards::schedule::{ContinuousSchedule, EmissionSchedule};

    const OPERATOR: u8 = 1;
    const TREASURY: u8 = 2;
    const BOARDROOM: u8 = 3;
    const SHARE_POOL: u8 = 4;
    const ALICE: u8 = 10;

    struct TestOracle {
        price: Amount,
        fail_update: bool,
        fail_consult: bool,
    }

    impl TestOracle {
        fn at(price: Amount) -> Self {
            Self {
                price,
                fail_update: false,
                fail_consult: false,
            }
        }
    }

    impl PriceOracle for TestOracle {
        fn consult(&self) -> Result<Amount, EbbError> {
            if self.fail_consult {
                return Err(EbbError::Oracle("consult failed".to_string()));
            }
            Ok(self.price)
        }

        fn update(&mut self) -> Result<(), EbbError> {
            if self.fail_update {
                return Err(EbbError::Oracle("update failed".to_string()));
            }
            Ok(())
        }

        fn twap(&self) -> Result<Amount, EbbError> {
            self.consult()
        }
    }

    #[derive(Default)]
    struct TestBoardroom {
        grants: Vec<Amount>,
        fail: bool,
    }

    impl Boardroom for TestBoardroom {
        fn allocate_seigniorage(&mut self, amount: Amount) -> Result<(), EbbError> {
            if self.fail {
                return Err(EbbError::InvalidState(
                    "boardroom rejected the grant".to_string(),
                ));
            }
            self.grants.push(amount);
            Ok(())
        }
    }

    fn share_pool() -> RewardPools {
        let schedule =
            ContinuousSchedule::new(2 * WAD, 0, 1_000_000 * WAD, 0, 1_000_000 * WAD).unwrap();
        RewardPools::new(
            account(OPERATOR),
            account(SHARE_POOL),
            TokenId::Share,
            EmissionSchedule::Continuous(schedule),
        )
    }

    fn treasury() -> Treasury {
        Treasury::new(
            account(OPERATOR),
            account(TREASURY),
            account(BOARDROOM),
            0,
            3_600,
            PriceRegimeConfig::new(WAD).unwrap(),
            SupplyRatchetState::new(1_000_000 * WAD, 400),
            TreasuryParams::default(),
            2 * WAD,
            WAD,
        )
        .unwrap()
    }

    fn ledger_with_supply(supply: Amount) -> TokenLedger {
        let mut ledger = TokenLedger::new();
        ledger.mint(TokenId::Ebb, &account(ALICE), supply).unwrap();
        ledger
    }

    #[test]
    fn test_buy_bonds_zero_amount() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD / 2);
        let mut boardroom = TestBoardroom::default();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        let result = treasury.buy_bonds(account(ALICE), 0, WAD / 2, 100, &mut ctx);
        assert!(matches!(result, Err(EbbError::InvalidState(_))));
    }

    #[test]
    fn test_buy_bonds_price_moved() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD / 2);
        let mut boardroom = TestBoardroom::default();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        let result = treasury.buy_bonds(account(ALICE), WAD, WAD / 2 + 1, 100, &mut ctx);
        assert!(matches!(result, Err(EbbError::PriceMoved(_))));
    }

    #[test]
    fn test_buy_bonds_rejected_at_peg() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD);
        let mut boardroom = TestBoardroom::default();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        let result = treasury.buy_bonds(account(ALICE), WAD, WAD, 100, &mut ctx);
        assert!(matches!(result, Err(EbbError::InvalidState(_))));
    }

    #[test]
    fn test_redeem_bonds_rejected_at_peg() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        ledger.mint(TokenId::Bond, &account(ALICE), WAD).unwrap();
        let mut oracle = TestOracle::at(WAD);
        let mut boardroom = TestBoardroom::default();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        let result = treasury.redeem_bonds(account(ALICE), WAD, WAD, 100, &mut ctx);
        assert!(matches!(result, Err(EbbError::InvalidState(_))));
    }

    #[test]
    fn test_buy_bonds_requires_contraction_budget() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD / 2);
        let mut boardroom = TestBoardroom::default();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        // No epoch has rolled a budget yet
        let result = treasury.buy_bonds(account(ALICE), WAD, WAD / 2, 100, &mut ctx);
        assert!(matches!(result, Err(EbbError::InvalidState(_))));
    }

    fn advance_once(
        treasury: &mut Treasury,
        ledger: &mut TokenLedger,
        oracle: &mut TestOracle,
        boardroom: &mut TestBoardroom,
        pool: &mut RewardPools,
        now: u64,
    ) {
        let mut ctx = TreasuryCtx {
            ledger,
            oracle,
            boardroom,
            stats: None,
        };
        treasury
            .allocate_seigniorage(account(ALICE), now, &mut ctx, pool)
            .unwrap();
    }

    #[test]
    fn test_buy_bonds_decrements_budget_exactly() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD / 2);
        let mut boardroom = TestBoardroom::default();
        let mut pool = share_pool();
        advance_once(
            &mut treasury,
            &mut ledger,
            &mut oracle,
            &mut boardroom,
            &mut pool,
            3_600,
        );
        let budget = treasury.burnable_ebb_left();
        assert!(budget > 0);

        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        let bonds = treasury
            .buy_bonds(account(ALICE), 10 * WAD, WAD / 2, 3_700, &mut ctx)
            .unwrap();
        assert_eq!(treasury.burnable_ebb_left(), budget - 10 * WAD);
        // Default config has no discount percent: bonds 1:1 at peg rate
        assert_eq!(bonds, 10 * WAD);
        assert_eq!(ledger.balance_of(TokenId::Bond, &account(ALICE)), 10 * WAD);
        assert!(matches!(
            treasury.events().last(),
            Some(TreasuryEvent::BoughtBonds {
                timestamp: 3_700,
                ..
            })
        ));
    }

    #[test]
    fn test_buy_bonds_respects_debt_ceiling() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD / 2);
        let mut boardroom = TestBoardroom::default();
        let mut pool = share_pool();
        advance_once(
            &mut treasury,
            &mut ledger,
            &mut oracle,
            &mut boardroom,
            &mut pool,
            3_600,
        );
        // Debt ceiling is 35% of supply; nearly fill it with bonds
        ledger
            .mint(TokenId::Bond, &account(ALICE), 360 * WAD)
            .unwrap();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        let result = treasury.buy_bonds(account(ALICE), 10 * WAD, WAD / 2, 3_700, &mut ctx);
        assert!(matches!(result, Err(EbbError::InvalidState(_))));
    }

    #[test]
    fn test_allocate_rejected_before_window() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD);
        let mut boardroom = TestBoardroom::default();
        let mut pool = share_pool();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        let result =
            treasury.allocate_seigniorage(account(ALICE), 3_599, &mut ctx, &mut pool);
        assert!(matches!(result, Err(EbbError::EpochNotOpen(_))));
        assert_eq!(treasury.epoch(), 0);
    }

    #[test]
    fn test_bootstrap_epoch_funds_boardroom() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD / 2);
        let mut boardroom = TestBoardroom::default();
        let mut pool = share_pool();
        advance_once(
            &mut treasury,
            &mut ledger,
            &mut oracle,
            &mut boardroom,
            &mut pool,
            3_600,
        );
        // 4.5% of 1000 minted to the boardroom even below peg
        assert_eq!(boardroom.grants, vec![45 * WAD]);
        assert_eq!(
            ledger.balance_of(TokenId::Ebb, &account(BOARDROOM)),
            45 * WAD
        );
        assert_eq!(treasury.epoch(), 1);
    }

    #[test]
    fn test_oracle_update_failure_is_swallowed() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD);
        oracle.fail_update = true;
        let mut boardroom = TestBoardroom::default();
        let mut pool = share_pool();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        treasury
            .allocate_seigniorage(account(ALICE), 3_600, &mut ctx, &mut pool)
            .unwrap();
        assert_eq!(treasury.epoch(), 1);
    }

    #[test]
    fn test_oracle_consult_failure_is_fatal() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD);
        oracle.fail_consult = true;
        let mut boardroom = TestBoardroom::default();
        let mut pool = share_pool();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        let result =
            treasury.allocate_seigniorage(account(ALICE), 3_600, &mut ctx, &mut pool);
        assert!(matches!(result, Err(EbbError::Oracle(_))));
        assert_eq!(treasury.epoch(), 0);
    }

    #[test]
    fn test_failed_boardroom_rolls_back_everything() {
        let mut treasury = treasury();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD / 2);
        let mut boardroom = TestBoardroom::default();
        boardroom.fail = true;
        let mut pool = share_pool();
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        let result =
            treasury.allocate_seigniorage(account(ALICE), 3_600, &mut ctx, &mut pool);
        assert!(result.is_err());
        // The aborted advance minted nothing and left no state behind
        assert_eq!(treasury.epoch(), 0);
        assert_eq!(ledger.total_supply(TokenId::Ebb), 1_000 * WAD);
        assert_eq!(ledger.balance_of(TokenId::Ebb, &account(BOARDROOM)), 0);
        assert_eq!(ledger.balance_of(TokenId::Ebb, &account(TREASURY)), 0);
        assert!(treasury.events().is_empty());

        // Once the boardroom recovers, the same window mints exactly once
        boardroom.fail = false;
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        treasury
            .allocate_seigniorage(account(ALICE), 3_600, &mut ctx, &mut pool)
            .unwrap();
        assert_eq!(treasury.epoch(), 1);
        assert_eq!(ledger.total_supply(TokenId::Ebb), 1_045 * WAD);
        assert_eq!(boardroom.grants, vec![45 * WAD]);
    }

    #[test]
    fn test_caller_salary_minted() {
        let mut treasury = treasury();
        treasury
            .set_caller_salary(account(OPERATOR), 2 * WAD)
            .unwrap();
        let mut ledger = ledger_with_supply(1_000 * WAD);
        let mut oracle = TestOracle::at(WAD);
        let mut boardroom = TestBoardroom::default();
        let mut pool = share_pool();
        let caller = account(42);
        let mut ctx = TreasuryCtx {
            ledger: &mut ledger,
            oracle: &mut oracle,
            boardroom: &mut boardroom,
            stats: None,
        };
        treasury
            .allocate_seigniorage(caller, 3_600, &mut ctx, &mut pool)
            .unwrap();
        assert_eq!(ledger.balance_of(TokenId::Ebb, &caller), 2 * WAD);
    }

    #[test]
    fn test_governance_setters_require_operator() {
        let mut treasury = treasury();
        assert!(treasury.set_epoch_length(account(ALICE), 7_200).is_err());
        assert!(treasury.set_epoch_length(account(OPERATOR), 7_200).is_ok());
        assert!(treasury
            .set_fund(account(ALICE), FundKind::Dao, account(7), 1_000)
            .is_err());
    }

    #[test]
    fn test_set_operator_hands_over_control() {
        let mut treasury = treasury();
        treasury
            .set_operator(account(OPERATOR), account(9))
            .unwrap();
        assert!(treasury.set_epoch_length(account(OPERATOR), 7_200).is_err());
        assert!(treasury.set_epoch_length(account(9), 7_200).is_ok());
    }
}
