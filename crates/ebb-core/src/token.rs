// crates/ebb-core/src/token.rs
//
// Token units and display helpers for the Ebb Protocol.
//
// All internal accounting uses "wad" — 18-decimal fixed point.
// 1 token = 10^18 wad. Rates and prices are also wad values
// (a price of 1.0 is exactly WAD). Percentages are basis points.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of wad in one whole token. 1 token = 10^18 wad.
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// Basis-point denominator. 10_000 bps = 100%.
pub const BPS: u128 = 10_000;

/// Type alias for a token amount in wad.
pub type Amount = u128;

/// A wad-denominated amount with human-readable display.
///
/// Wraps an amount in wad (the smallest denomination). All arithmetic
/// is performed in integer wad to avoid floating-point errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Wad(pub u128);

impl Wad {
    /// Create a wad amount from a whole-token value.
    pub fn from_whole(tokens: u128) -> Self {
        Self(tokens * WAD)
    }

    /// Returns zero.
    pub fn zero() -> Self {
        Self(0)
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WAD;
        let frac = self.0 % WAD;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            // Display up to 18 decimal places, trimming trailing zeros
            let frac_str = format!("{:018}", frac);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{}", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wad_constant() {
        assert_eq!(WAD, 10u128.pow(18));
    }

    #[test]
    fn test_from_whole() {
        assert_eq!(Wad::from_whole(1).0, WAD);
        assert_eq!(Wad::from_whole(42).0, 42 * WAD);
    }

    #[test]
    fn test_display_whole() {
        assert_eq!(format!("{}", Wad::from_whole(42)), "42");
    }

    #[test]
    fn test_display_fractional() {
        assert_eq!(format!("{}", Wad(WAD + WAD / 2)), "1.5");
    }

    #[test]
    fn test_display_zero() {
        assert_eq!(format!("{}", Wad::zero()), "0");
    }

    #[test]
    fn test_display_small_fraction() {
        assert_eq!(format!("{}", Wad(1)), "0.000000000000000001");
    }
}
