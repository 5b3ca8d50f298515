//! Single ranked claim on a bond's collateral pool
//!
//! Immutable view over one tranche's snapshot data. Never mutated after
//! construction; every derived value is computed on demand.

use crate::error::BondError;
use tranche_types::{mul_div_floor, CurrencyAmount, Token, U256};

/// One ranked claim: seniority index 0 is repaid first
#[derive(Debug, Clone)]
pub struct Tranche {
    address: String,
    index: u32,
    ratio: u32,
    token: Token,
    total_supply: U256,
    total_collateral: U256,
    collateral: Token,
}

impl Tranche {
    pub(crate) fn new(
        address: String,
        index: u32,
        ratio: u32,
        token: Token,
        total_supply: U256,
        total_collateral: U256,
        collateral: Token,
    ) -> Self {
        Self {
            address,
            index,
            ratio,
            token,
            total_supply,
            total_collateral,
            collateral,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Seniority index, ascending (0 = most senior)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Integer share of [`crate::TRANCHE_RATIO_GRANULARITY`]
    pub fn ratio(&self) -> u32 {
        self.ratio
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// This tranche's allocated share of bond-level collateral, base units
    pub fn total_collateral(&self) -> U256 {
        self.total_collateral
    }

    /// Collateral returned for `amount` of this tranche's token:
    /// ⌊totalCollateral · raw ÷ totalSupply⌋
    pub fn redeem_value(&self, amount: &CurrencyAmount) -> Result<CurrencyAmount, BondError> {
        if amount.currency() != &self.token {
            return Err(BondError::InvalidInputCurrency {
                expected: self.token.label().to_string(),
                got: amount.currency().label().to_string(),
            });
        }
        let raw = mul_div_floor(self.total_collateral, amount.raw(), self.total_supply)?;
        Ok(CurrencyAmount::from_raw(self.collateral.clone(), raw))
    }
}
