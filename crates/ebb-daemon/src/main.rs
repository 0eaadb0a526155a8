// crates/ebb-daemon/src/main.rs
//
// Binary entrypoint for the Ebb Protocol daemon.
//
// Initializes tracing, parses CLI arguments, loads configuration,
// wires the ledger, treasury, and share pool together, and runs the
// epoch scheduler against a simulated market.

mod boardroom;
mod config;
mod oracle;
mod scheduler;

use std::time::Duration;

use clap::Parser;

use config::DaemonConfig;
use oracle::SimOracle;
use scheduler::EpochScheduler;

use ebb_core::account::{account, TokenId};
use ebb_core::ledger::TokenLedger;
use ebb_core::token::{Amount, WAD};
use ebb_rewards::pool::RewardPools;
use ebb_rewards::schedule::{ContinuousSchedule, EmissionSchedule, Tier, TieredSchedule};
use ebb_treasury::{PriceRegimeConfig, SupplyRatchetState, Treasury, TreasuryParams};

const OPERATOR_TAG: u8 = 1;
const TREASURY_TAG: u8 = 2;
const BOARDROOM_TAG: u8 = 3;
const SHARE_POOL_TAG: u8 = 4;
const GENESIS_TAG: u8 = 5;
const CALLER_TAG: u8 = 6;
const GENESIS_POOL_TAG: u8 = 7;

/// Ebb Protocol daemon — drives the treasury epoch by epoch.
#[derive(Parser, Debug)]
#[command(name = "ebb-daemon", version = "0.1.0", about = "Ebb Protocol epoch daemon")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "ebb.toml")]
    config: String,

    /// Seed for the simulated price walk.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn wad(whole: u64) -> Amount {
    Amount::from(whole) * WAD
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match DaemonConfig::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!(
                "could not load config from {}: {}. Using defaults.",
                args.config, e
            );
            DaemonConfig::default()
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone())),
        )
        .init();

    tracing::info!("Ebb Protocol Daemon v0.1.0");
    tracing::info!(
        epoch_length = config.epoch_length,
        bootstrap_epochs = config.bootstrap_epochs,
        genesis_supply = config.genesis_supply,
        "configuration loaded"
    );

    let mut ledger = TokenLedger::new();
    ledger.mint(
        TokenId::Ebb,
        &account(GENESIS_TAG),
        wad(config.genesis_supply),
    )?;

    let mut params = TreasuryParams::default();
    params.set_bootstrap(
        config.bootstrap_epochs,
        Amount::from(config.bootstrap_expansion_bps),
    )?;

    let mut ratchet = SupplyRatchetState::new(wad(config.supply_target), 400);
    ratchet.set_max_supply_expansion_bps(Amount::from(config.max_expansion_bps))?;

    let treasury = Treasury::new(
        account(OPERATOR_TAG),
        account(TREASURY_TAG),
        account(BOARDROOM_TAG),
        0,
        config.epoch_length,
        PriceRegimeConfig::new(WAD)?,
        ratchet,
        params,
        wad(config.share_rate_expansion),
        wad(config.share_rate_contraction),
    )?;

    let schedule = ContinuousSchedule::new(
        wad(config.share_rate_expansion),
        0,
        wad(config.share_cap),
        wad(config.share_rate_contraction),
        wad(config.share_rate_expansion),
    )?;
    let mut share_pool = RewardPools::new(
        account(OPERATOR_TAG),
        account(SHARE_POOL_TAG),
        TokenId::Share,
        EmissionSchedule::Continuous(schedule),
    );
    share_pool.add_pool(account(OPERATOR_TAG), TokenId::Lp(0), 100, 0)?;

    // Genesis staking: front-loaded EBB emission over the first month,
    // paid from the genesis allocation rather than fresh supply.
    let tiers = TieredSchedule::new(vec![
        Tier {
            end_time: 7 * 86_400,
            rate_per_second: wad(2),
        },
        Tier {
            end_time: 30 * 86_400,
            rate_per_second: wad(1),
        },
    ])?;
    let mut genesis_pool = RewardPools::new(
        account(OPERATOR_TAG),
        account(GENESIS_POOL_TAG),
        TokenId::Ebb,
        EmissionSchedule::Tiered(tiers),
    );
    genesis_pool.add_pool(account(OPERATOR_TAG), TokenId::Ebb, 100, 0)?;
    let genesis_reserve = wad(config.genesis_supply) / 4;
    ledger.transfer(
        TokenId::Ebb,
        &account(GENESIS_TAG),
        &account(GENESIS_POOL_TAG),
        genesis_reserve,
    )?;
    genesis_pool.deposit(account(GENESIS_TAG), 0, wad(10_000), 0, &mut ledger)?;

    let oracle = SimOracle::new(WAD, config.price_volatility_bps, args.seed);

    let mut scheduler = EpochScheduler::new(
        treasury,
        ledger,
        oracle,
        share_pool,
        genesis_pool,
        account(CALLER_TAG),
        0,
        config.seconds_per_tick,
        Duration::from_millis(config.tick_interval_ms),
    );
    scheduler.run().await
}
