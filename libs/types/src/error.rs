//! Error types for exact amount arithmetic
//!
//! Every arithmetic operation between currency amounts is checked: mixing
//! currencies, overflowing 256 bits, or dividing by zero surfaces here
//! instead of producing a silently wrong quantity.

use thiserror::Error;

/// Errors from currency-amount arithmetic and conversions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Operands are denominated in different currencies
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    /// Result exceeds 256 bits
    #[error("Overflow in base-unit arithmetic")]
    Overflow,

    /// Division by a zero quantity
    #[error("Division by zero in base-unit arithmetic")]
    DivisionByZero,

    /// Value too large to represent as a `Decimal` fraction
    #[error("Value {value} cannot be represented as a decimal fraction")]
    PrecisionLoss { value: String },
}
