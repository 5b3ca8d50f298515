//! Exact currency amounts
//!
//! A `CurrencyAmount` pairs a raw base-unit integer with its token
//! identity. Arithmetic between amounts of different currencies is a bug
//! in the caller, so every binary operation checks identities first.

use crate::error::AmountError;
use crate::precision::to_decimal;
use crate::token::Token;
use ethers_core::types::U256;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;

/// An exact quantity of one token, in base units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyAmount {
    currency: Token,
    raw: U256,
}

impl CurrencyAmount {
    pub fn from_raw(currency: Token, raw: U256) -> Self {
        Self { currency, raw }
    }

    pub fn zero(currency: Token) -> Self {
        Self::from_raw(currency, U256::zero())
    }

    pub fn currency(&self) -> &Token {
        &self.currency
    }

    /// Raw quantity in base units (quantity × 10^decimals)
    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    fn check_currency(&self, other: &Self) -> Result<(), AmountError> {
        if self.currency != other.currency {
            return Err(AmountError::CurrencyMismatch {
                expected: self.currency.label().to_string(),
                actual: other.currency.label().to_string(),
            });
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, AmountError> {
        self.check_currency(other)?;
        let raw = self.raw.checked_add(other.raw).ok_or(AmountError::Overflow)?;
        Ok(Self::from_raw(self.currency.clone(), raw))
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, AmountError> {
        self.check_currency(other)?;
        let raw = self.raw.checked_sub(other.raw).ok_or(AmountError::Overflow)?;
        Ok(Self::from_raw(self.currency.clone(), raw))
    }

    /// Compare two amounts of the same currency
    pub fn compare(&self, other: &Self) -> Result<Ordering, AmountError> {
        self.check_currency(other)?;
        Ok(self.raw.cmp(&other.raw))
    }

    pub fn lt(&self, other: &Self) -> Result<bool, AmountError> {
        Ok(self.compare(other)? == Ordering::Less)
    }

    pub fn le(&self, other: &Self) -> Result<bool, AmountError> {
        Ok(self.compare(other)? != Ordering::Greater)
    }

    pub fn ge(&self, other: &Self) -> Result<bool, AmountError> {
        Ok(self.compare(other)? != Ordering::Less)
    }

    /// Whole-token quantity as a `Decimal`, for display and rate math
    pub fn as_decimal(&self) -> Result<Decimal, AmountError> {
        to_decimal(self.raw, self.currency.decimals)
    }
}

impl fmt::Display for CurrencyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.raw, self.currency.label())
    }
}
