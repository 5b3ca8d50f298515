//! Shared fixtures: a flat (impact-free) venue and canonical bonds
#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tranche_amm::{AmmError, AmmVenue};
use tranche_loan::{Bond, BondSnapshot, TokenSnapshot, TrancheSnapshot};
use tranche_types::{mul_div_ceil, mul_div_floor, scale_factor, CurrencyAmount, Token, U256};

/// Infinite-depth venue quoting a fixed whole-token rate with no price
/// impact: 1 token0 = num/den token1. Keeps sale-routing arithmetic exact
/// so expected schedules can be computed by hand.
#[derive(Debug, Clone)]
pub struct FlatVenue {
    token0: Token,
    token1: Token,
    num: u64,
    den: u64,
}

impl FlatVenue {
    pub fn new(token0: Token, token1: Token, num: u64, den: u64) -> Self {
        Self {
            token0,
            token1,
            num,
            den,
        }
    }

    /// 1:1 venue
    pub fn par(token0: Token, token1: Token) -> Self {
        Self::new(token0, token1, 1, 1)
    }

    fn convert(
        &self,
        raw: U256,
        from: &Token,
        to: &Token,
        num: u64,
        den: u64,
        round_up: bool,
    ) -> Result<U256, AmmError> {
        let scaled = raw.checked_mul(U256::from(num)).ok_or_else(|| {
            AmmError::Amount(tranche_types::AmountError::Overflow)
        })?;
        let numerator = scaled
            .checked_mul(scale_factor(to.decimals))
            .ok_or_else(|| AmmError::Amount(tranche_types::AmountError::Overflow))?;
        let denominator = U256::from(den)
            .checked_mul(scale_factor(from.decimals))
            .ok_or_else(|| AmmError::Amount(tranche_types::AmountError::Overflow))?;
        let out = if round_up {
            mul_div_ceil(numerator, U256::one(), denominator)?
        } else {
            mul_div_floor(numerator, U256::one(), denominator)?
        };
        Ok(out)
    }
}

#[async_trait]
impl AmmVenue for FlatVenue {
    fn token0(&self) -> &Token {
        &self.token0
    }

    fn token1(&self) -> &Token {
        &self.token1
    }

    fn token0_price(&self) -> Result<Decimal, AmmError> {
        Ok(Decimal::from(self.num) / Decimal::from(self.den))
    }

    fn token1_price(&self) -> Result<Decimal, AmmError> {
        Ok(Decimal::from(self.den) / Decimal::from(self.num))
    }

    async fn get_output_amount(
        &self,
        amount_in: &CurrencyAmount,
    ) -> Result<(CurrencyAmount, Arc<dyn AmmVenue>), AmmError> {
        let (out_raw, out_token) = if amount_in.currency() == &self.token0 {
            (
                self.convert(
                    amount_in.raw(),
                    &self.token0,
                    &self.token1,
                    self.num,
                    self.den,
                    false,
                )?,
                self.token1.clone(),
            )
        } else if amount_in.currency() == &self.token1 {
            (
                self.convert(
                    amount_in.raw(),
                    &self.token1,
                    &self.token0,
                    self.den,
                    self.num,
                    false,
                )?,
                self.token0.clone(),
            )
        } else {
            return Err(AmmError::InvalidCurrency {
                token: amount_in.currency().label().to_string(),
                token0: self.token0.label().to_string(),
                token1: self.token1.label().to_string(),
            });
        };
        Ok((
            CurrencyAmount::from_raw(out_token, out_raw),
            Arc::new(self.clone()),
        ))
    }

    async fn get_input_amount(
        &self,
        amount_out: &CurrencyAmount,
    ) -> Result<(CurrencyAmount, Arc<dyn AmmVenue>), AmmError> {
        let (in_raw, in_token) = if amount_out.currency() == &self.token1 {
            (
                self.convert(
                    amount_out.raw(),
                    &self.token1,
                    &self.token0,
                    self.den,
                    self.num,
                    true,
                )?,
                self.token0.clone(),
            )
        } else if amount_out.currency() == &self.token0 {
            (
                self.convert(
                    amount_out.raw(),
                    &self.token0,
                    &self.token1,
                    self.num,
                    self.den,
                    true,
                )?,
                self.token1.clone(),
            )
        } else {
            return Err(AmmError::InvalidCurrency {
                token: amount_out.currency().label().to_string(),
                token0: self.token0.label().to_string(),
                token1: self.token1.label().to_string(),
            });
        };
        Ok((
            CurrencyAmount::from_raw(in_token, in_raw),
            Arc::new(self.clone()),
        ))
    }
}

pub fn token_snapshot(id: &str, symbol: &str, decimals: u8, supply: &str) -> TokenSnapshot {
    TokenSnapshot {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        decimals: decimals.to_string(),
        total_supply: supply.to_string(),
    }
}

pub fn tranche_snapshot(id: &str, index: u32, ratio: u32, decimals: u8) -> TrancheSnapshot {
    TrancheSnapshot {
        id: id.to_string(),
        index: index.to_string(),
        ratio: ratio.to_string(),
        total_collateral: "10000000".to_string(),
        token: token_snapshot(id, &format!("TRANCHE-{index}"), decimals, "10000000"),
    }
}

/// 200/300/500 bond at par (totalDebt = totalCollateral = 30M), 6-decimal
/// collateral and tranche tokens
pub fn par_bond_snapshot() -> BondSnapshot {
    BondSnapshot {
        id: "0xb0nd".to_string(),
        maturity_date: "1735689600".to_string(),
        is_mature: false,
        total_debt: "30000000".to_string(),
        total_collateral: "30000000".to_string(),
        collateral: token_snapshot("0xc011", "AMPL", 6, "500000000000"),
        tranches: vec![
            tranche_snapshot("0xaaaa", 0, 200, 6),
            tranche_snapshot("0xbbbb", 1, 300, 6),
            tranche_snapshot("0xcccc", 2, 500, 6),
        ],
    }
}

pub fn par_bond() -> Arc<Bond> {
    Arc::new(Bond::from_snapshot(&par_bond_snapshot()).unwrap())
}

pub fn loan_token() -> Token {
    Token::new("0x10a4", 6, Some("USDB".into()), None)
}

pub fn amount(token: &Token, raw: u64) -> CurrencyAmount {
    CurrencyAmount::from_raw(token.clone(), U256::from(raw))
}

/// One flat venue per non-residual tranche at the given rate
pub fn flat_venues(bond: &Bond, loan: &Token, num: u64, den: u64) -> Vec<Arc<dyn AmmVenue>> {
    bond.tranches()[..bond.tranches().len() - 1]
        .iter()
        .map(|t| {
            Arc::new(FlatVenue::new(t.token().clone(), loan.clone(), num, den))
                as Arc<dyn AmmVenue>
        })
        .collect()
}
