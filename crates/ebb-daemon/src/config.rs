// crates/ebb-daemon/src/config.rs
//
// Runtime configuration for the Ebb Protocol daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Epoch length in seconds (1 to 24 hours).
    #[serde(default = "default_epoch_length")]
    pub epoch_length: u64,

    /// Number of bootstrap epochs with fixed expansion.
    #[serde(default = "default_bootstrap_epochs")]
    pub bootstrap_epochs: u64,

    /// Expansion minted per bootstrap epoch, in bps of supply.
    #[serde(default = "default_bootstrap_expansion_bps")]
    pub bootstrap_expansion_bps: u64,

    /// Initial per-epoch expansion cap, in bps of supply.
    #[serde(default = "default_max_expansion_bps")]
    pub max_expansion_bps: u64,

    /// Genesis supply of the primary token, in whole tokens.
    #[serde(default = "default_genesis_supply")]
    pub genesis_supply: u64,

    /// First supply-ratchet target, in whole tokens.
    #[serde(default = "default_supply_target")]
    pub supply_target: u64,

    /// Share emission rate during expansion, whole tokens per second.
    #[serde(default = "default_share_rate_expansion")]
    pub share_rate_expansion: u64,

    /// Share emission rate during contraction, whole tokens per second.
    #[serde(default = "default_share_rate_contraction")]
    pub share_rate_contraction: u64,

    /// Total share emission cap, in whole tokens.
    #[serde(default = "default_share_cap")]
    pub share_cap: u64,

    /// How many simulated seconds pass per scheduler tick.
    #[serde(default = "default_seconds_per_tick")]
    pub seconds_per_tick: u64,

    /// Wall-clock milliseconds between scheduler ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Volatility of the simulated price walk, in bps per tick.
    #[serde(default = "default_price_volatility_bps")]
    pub price_volatility_bps: u64,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_epoch_length() -> u64 {
    21_600
}

fn default_bootstrap_epochs() -> u64 {
    21
}

fn default_bootstrap_expansion_bps() -> u64 {
    450
}

fn default_max_expansion_bps() -> u64 {
    400
}

fn default_genesis_supply() -> u64 {
    100_000
}

fn default_supply_target() -> u64 {
    500_000
}

fn default_share_rate_expansion() -> u64 {
    2
}

fn default_share_rate_contraction() -> u64 {
    1
}

fn default_share_cap() -> u64 {
    10_000_000
}

fn default_seconds_per_tick() -> u64 {
    600
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

fn default_price_volatility_bps() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            epoch_length: default_epoch_length(),
            bootstrap_epochs: default_bootstrap_epochs(),
            bootstrap_expansion_bps: default_bootstrap_expansion_bps(),
            max_expansion_bps: default_max_expansion_bps(),
            genesis_supply: default_genesis_supply(),
            supply_target: default_supply_target(),
            share_rate_expansion: default_share_rate_expansion(),
            share_rate_contraction: default_share_rate_contraction(),
            share_cap: default_share_cap(),
            seconds_per_tick: default_seconds_per_tick(),
            tick_interval_ms: default_tick_interval_ms(),
            price_volatility_bps: default_price_volatility_bps(),
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.epoch_length, 21_600);
        assert_eq!(config.bootstrap_epochs, 21);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: DaemonConfig = toml::from_str("epoch_length = 3600").unwrap();
        assert_eq!(config.epoch_length, 3_600);
        assert_eq!(config.bootstrap_epochs, 21);
    }
}
