// crates/ebb-core/src/fixed.rs
//
// Checked fixed-point arithmetic on wad (18-decimal) amounts.
//
// Every economic calculation in the protocol goes through these helpers:
// arithmetic that would overflow or divide by zero aborts the operation
// with `EbbError::Arithmetic` instead of wrapping. The single exception
// is the treasury's reserve reduction, which deliberately saturates at
// its call site rather than using these helpers.

use crate::error::EbbError;
use crate::token::{Amount, BPS, WAD};

/// `a + b`, failing on overflow.
pub fn checked_add(a: Amount, b: Amount) -> Result<Amount, EbbError> {
    a.checked_add(b)
        .ok_or_else(|| EbbError::Arithmetic(format!("addition overflow: {} + {}", a, b)))
}

/// `a - b`, failing on underflow.
pub fn checked_sub(a: Amount, b: Amount) -> Result<Amount, EbbError> {
    a.checked_sub(b)
        .ok_or_else(|| EbbError::Arithmetic(format!("subtraction underflow: {} - {}", a, b)))
}

/// `a * b`, failing on overflow.
pub fn checked_mul(a: Amount, b: Amount) -> Result<Amount, EbbError> {
    a.checked_mul(b)
        .ok_or_else(|| EbbError::Arithmetic(format!("multiplication overflow: {} * {}", a, b)))
}

/// `a * b / denom` with a checked intermediate product and a
/// zero-denominator guard.
pub fn mul_div(a: Amount, b: Amount, denom: Amount) -> Result<Amount, EbbError> {
    if denom == 0 {
        return Err(EbbError::Arithmetic("division by zero".to_string()));
    }
    Ok(checked_mul(a, b)? / denom)
}

/// Multiply two wad values: `a * b / WAD`.
pub fn wad_mul(a: Amount, b: Amount) -> Result<Amount, EbbError> {
    mul_div(a, b, WAD)
}

/// Divide two wad values: `a * WAD / b`.
pub fn wad_div(a: Amount, b: Amount) -> Result<Amount, EbbError> {
    mul_div(a, WAD, b)
}

/// Take a basis-point fraction of an amount: `amount * bps / 10_000`.
pub fn bps_of(amount: Amount, bps: Amount) -> Result<Amount, EbbError> {
    mul_div(amount, bps, BPS)
}
