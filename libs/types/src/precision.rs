//! Full-width integer helpers with explicit rounding
//!
//! Bond arithmetic multiplies three 256-bit quantities before dividing, so
//! every mul-div here goes through a 512-bit intermediate. Rounding
//! direction is part of each function's contract, never incidental.

use crate::error::AmountError;
use ethers_core::types::{U256, U512};
use rust_decimal::Decimal;

/// 10^decimals, the number of base units in one whole token
pub fn scale_factor(decimals: u8) -> U256 {
    U256::exp10(decimals as usize)
}

/// ⌊a · b ÷ denom⌋ with a 512-bit intermediate
pub fn mul_div_floor(a: U256, b: U256, denom: U256) -> Result<U256, AmountError> {
    if denom.is_zero() {
        return Err(AmountError::DivisionByZero);
    }
    let wide = a.full_mul(b) / U512::from(denom);
    U256::try_from(wide).map_err(|_| AmountError::Overflow)
}

/// ⌈a · b ÷ denom⌉ with a 512-bit intermediate
pub fn mul_div_ceil(a: U256, b: U256, denom: U256) -> Result<U256, AmountError> {
    if denom.is_zero() {
        return Err(AmountError::DivisionByZero);
    }
    let wide_denom = U512::from(denom);
    let product = a.full_mul(b);
    let mut quotient = product / wide_denom;
    if product % wide_denom != U512::zero() {
        quotient += U512::one();
    }
    U256::try_from(quotient).map_err(|_| AmountError::Overflow)
}

/// Convert a raw base-unit quantity into a whole-token `Decimal`
///
/// Fails when the raw value exceeds the 96-bit `Decimal` mantissa; spot
/// prices and rate fractions are the only consumers, so the bound is never
/// hit by realistic pool reserves.
pub fn to_decimal(raw: U256, decimals: u8) -> Result<Decimal, AmountError> {
    if raw > U256::from(u128::MAX) {
        return Err(AmountError::PrecisionLoss {
            value: raw.to_string(),
        });
    }
    Decimal::try_from_i128_with_scale(raw.as_u128() as i128, decimals as u32).map_err(|_| {
        AmountError::PrecisionLoss {
            value: raw.to_string(),
        }
    })
}
