//! # Tranche Types Library
//!
//! Shared value types for the tranche-loan computation stack.
//!
//! ## Design Philosophy
//!
//! - **No Precision Loss**: all financial quantities are exact base-unit
//!   integers (`U256`); fractions (prices, discounts) are `Decimal`
//! - **Type Safety**: every amount carries its currency identity, and every
//!   arithmetic operation between amounts fails on a currency mismatch
//! - **Immutability**: tokens and amounts are plain value objects; nothing
//!   in this crate mutates after construction
//!
//! ## Integration Points
//!
//! - **Consumers**: `tranche-amm` (venue quoting), `tranche-loan`
//!   (bond arithmetic, sale routing)
//! - **Input Sources**: indexer snapshots with string-encoded integers

pub mod amount;
pub mod error;
pub mod precision;
pub mod token;

pub use amount::CurrencyAmount;
pub use error::AmountError;
pub use precision::{mul_div_ceil, mul_div_floor, scale_factor, to_decimal};
pub use token::Token;

/// Common numeric types for exact base-unit arithmetic
pub use ethers_core::types::{U256, U512};
pub use rust_decimal::Decimal;
