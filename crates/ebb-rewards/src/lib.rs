// crates/ebb-rewards/src/lib.rs
//
// ebb-rewards: emission schedules and the multi-pool reward-accrual
// engine for the Ebb Protocol.
//
// The engine keeps a time-weighted accumulated-reward-per-share ledger
// for each staking pool and is agnostic of the emission schedule behind
// it. The protocol instantiates it twice: a genesis pool paying EBB on
// a tiered fixed schedule, and a share pool paying FLOW on a continuous
// adjustable schedule retuned by the treasury each epoch.

pub mod pool;
pub mod schedule;

pub use pool::{PoolEvent, PoolInfo, RewardPools, UserStake};
pub use schedule::{ContinuousSchedule, EmissionSchedule, Tier, TieredSchedule};
