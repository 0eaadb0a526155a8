// crates/ebb-daemon/src/scheduler.rs
//
// Epoch scheduler for the Ebb Protocol daemon.
//
// Drives simulated time forward in fixed ticks, steps the price walk,
// and advances the treasury whenever the next epoch window opens.

use std::time::Duration;

use chrono::DateTime;

use ebb_core::account::{AccountId, TokenId};
use ebb_core::ledger::TokenLedger;
use ebb_core::token::Wad;
use ebb_rewards::pool::RewardPools;
use ebb_treasury::{Treasury, TreasuryCtx};

use crate::boardroom::{EpochChronicle, LoggingBoardroom};
use crate::oracle::SimOracle;

/// Scheduler that owns the protocol state and ticks it forward.
pub struct EpochScheduler {
    treasury: Treasury,
    ledger: TokenLedger,
    oracle: SimOracle,
    boardroom: LoggingBoardroom,
    chronicle: EpochChronicle,
    share_pool: RewardPools,
    /// Genesis staking pools on a tiered emission schedule.
    genesis_pool: RewardPools,
    /// The account credited with epoch-advance salaries.
    caller: AccountId,
    /// Simulated wall clock, unix seconds.
    now: u64,
    seconds_per_tick: u64,
    tick_interval: Duration,
}

impl EpochScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        treasury: Treasury,
        ledger: TokenLedger,
        oracle: SimOracle,
        share_pool: RewardPools,
        genesis_pool: RewardPools,
        caller: AccountId,
        start_time: u64,
        seconds_per_tick: u64,
        tick_interval: Duration,
    ) -> Self {
        Self {
            treasury,
            ledger,
            oracle,
            boardroom: LoggingBoardroom::default(),
            chronicle: EpochChronicle::default(),
            share_pool,
            genesis_pool,
            caller,
            now: start_time,
            seconds_per_tick,
            tick_interval,
        }
    }

    pub fn chronicle(&self) -> &EpochChronicle {
        &self.chronicle
    }

    /// Run the scheduler loop until a shutdown signal arrives.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        tracing::info!(
            epoch_length = self.treasury.next_epoch_point() - self.now,
            seconds_per_tick = self.seconds_per_tick,
            "epoch scheduler started"
        );

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("epoch scheduler received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(self.tick_interval) => {
                    self.tick();
                }
            }
        }

        match serde_json::to_string_pretty(self.chronicle.records()) {
            Ok(dump) => println!("{}", dump),
            Err(e) => tracing::warn!("could not serialize epoch chronicle: {}", e),
        }
        Ok(())
    }

    /// Advance simulated time one tick and roll the epoch if due.
    pub fn tick(&mut self) {
        self.now += self.seconds_per_tick;
        self.oracle.step();

        for pool_id in 0..self.genesis_pool.pools().len() {
            if let Err(e) = self.genesis_pool.update_pool(pool_id, self.now) {
                tracing::warn!(pool = pool_id, "genesis pool update failed: {}", e);
            }
        }

        if self.now < self.treasury.next_epoch_point() {
            return;
        }

        let mut ctx = TreasuryCtx {
            ledger: &mut self.ledger,
            oracle: &mut self.oracle,
            boardroom: &mut self.boardroom,
            stats: Some(&mut self.chronicle),
        };
        match self
            .treasury
            .allocate_seigniorage(self.caller, self.now, &mut ctx, &mut self.share_pool)
        {
            Ok(()) => {
                let when = DateTime::from_timestamp(self.now as i64, 0)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| self.now.to_string());
                tracing::info!(
                    epoch = self.treasury.epoch(),
                    time = %when,
                    price = %Wad(self.treasury.previous_epoch_price()),
                    supply = %Wad(self.ledger.total_supply(TokenId::Ebb)),
                    reserve = %Wad(self.treasury.reserve()),
                    bond_budget = %Wad(self.treasury.burnable_ebb_left()),
                    "epoch advanced"
                );
            }
            Err(e) => {
                tracing::error!("epoch advance failed: {}", e);
            }
        }
    }
}
