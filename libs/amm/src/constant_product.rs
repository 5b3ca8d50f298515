//! Constant-product venue with exact integer math
//!
//! Mirrors on-chain x·y=k arithmetic: output quotes floor in the pool's
//! favor, input quotes round up by one base unit so the quoted input is
//! always sufficient, and the fee remains in the reserves after the trade.

use crate::error::AmmError;
use crate::venue::AmmVenue;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tranche_types::{mul_div_floor, CurrencyAmount, Token, U256};

/// Fee in basis points (30 = 0.3%)
pub const DEFAULT_FEE_BPS: u32 = 30;

const BPS_DENOMINATOR: u32 = 10_000;

/// Immutable constant-product pool snapshot
#[derive(Debug, Clone)]
pub struct ConstantProductVenue {
    reserve0: CurrencyAmount,
    reserve1: CurrencyAmount,
    fee_bps: u32,
}

impl ConstantProductVenue {
    pub fn new(
        reserve0: CurrencyAmount,
        reserve1: CurrencyAmount,
        fee_bps: u32,
    ) -> Result<Self, AmmError> {
        if reserve0.currency() == reserve1.currency() {
            return Err(AmmError::DuplicateTokens {
                token: reserve0.currency().label().to_string(),
            });
        }
        if reserve0.is_zero() || reserve1.is_zero() {
            return Err(AmmError::ZeroReserves);
        }
        Ok(Self {
            reserve0,
            reserve1,
            fee_bps,
        })
    }

    pub fn with_default_fee(
        reserve0: CurrencyAmount,
        reserve1: CurrencyAmount,
    ) -> Result<Self, AmmError> {
        Self::new(reserve0, reserve1, DEFAULT_FEE_BPS)
    }

    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    pub fn reserve0(&self) -> &CurrencyAmount {
        &self.reserve0
    }

    pub fn reserve1(&self) -> &CurrencyAmount {
        &self.reserve1
    }

    /// Reserves oriented as (input side, output side) for `token_in`
    fn oriented(&self, token_in: &Token) -> Result<(&CurrencyAmount, &CurrencyAmount), AmmError> {
        if self.token0() == token_in {
            Ok((&self.reserve0, &self.reserve1))
        } else if self.token1() == token_in {
            Ok((&self.reserve1, &self.reserve0))
        } else {
            Err(AmmError::InvalidCurrency {
                token: token_in.label().to_string(),
                token0: self.token0().label().to_string(),
                token1: self.token1().label().to_string(),
            })
        }
    }

    /// Post-trade snapshot: the full input (fee included) joins the
    /// reserves, the realized output leaves them
    fn apply_trade(
        &self,
        amount_in: &CurrencyAmount,
        amount_out: &CurrencyAmount,
    ) -> Result<Self, AmmError> {
        let (new0, new1) = if self.token0() == amount_in.currency() {
            (
                self.reserve0.checked_add(amount_in)?,
                self.reserve1.checked_sub(amount_out)?,
            )
        } else {
            (
                self.reserve0.checked_sub(amount_out)?,
                self.reserve1.checked_add(amount_in)?,
            )
        };
        Ok(Self {
            reserve0: new0,
            reserve1: new1,
            fee_bps: self.fee_bps,
        })
    }
}

#[async_trait]
impl AmmVenue for ConstantProductVenue {
    fn token0(&self) -> &Token {
        self.reserve0.currency()
    }

    fn token1(&self) -> &Token {
        self.reserve1.currency()
    }

    fn token0_price(&self) -> Result<Decimal, AmmError> {
        Ok(self.reserve1.as_decimal()? / self.reserve0.as_decimal()?)
    }

    fn token1_price(&self) -> Result<Decimal, AmmError> {
        Ok(self.reserve0.as_decimal()? / self.reserve1.as_decimal()?)
    }

    async fn get_output_amount(
        &self,
        amount_in: &CurrencyAmount,
    ) -> Result<(CurrencyAmount, Arc<dyn AmmVenue>), AmmError> {
        let (reserve_in, reserve_out) = self.oriented(amount_in.currency())?;

        // out = (in·(10000−fee)·R_out) / (R_in·10000 + in·(10000−fee))
        let amount_in_with_fee = amount_in
            .raw()
            .checked_mul(U256::from(BPS_DENOMINATOR - self.fee_bps))
            .ok_or(tranche_types::AmountError::Overflow)?;
        let denominator = reserve_in
            .raw()
            .checked_mul(U256::from(BPS_DENOMINATOR))
            .and_then(|d| d.checked_add(amount_in_with_fee))
            .ok_or(tranche_types::AmountError::Overflow)?;
        let out_raw = mul_div_floor(amount_in_with_fee, reserve_out.raw(), denominator)?;

        let amount_out = CurrencyAmount::from_raw(reserve_out.currency().clone(), out_raw);
        let next = self.apply_trade(amount_in, &amount_out)?;
        Ok((amount_out, Arc::new(next)))
    }

    async fn get_input_amount(
        &self,
        amount_out: &CurrencyAmount,
    ) -> Result<(CurrencyAmount, Arc<dyn AmmVenue>), AmmError> {
        let (reserve_in, reserve_out) = self.oriented(amount_out.currency())?;
        // `oriented` treats its argument as the input side; for an
        // exact-output quote the roles flip.
        let (reserve_in, reserve_out) = (reserve_out, reserve_in);

        if amount_out.raw() >= reserve_out.raw() {
            return Err(AmmError::InsufficientLiquidity {
                requested: amount_out.raw().to_string(),
                reserve: reserve_out.raw().to_string(),
            });
        }

        // in = (R_in·out·10000) / ((R_out−out)·(10000−fee)) + 1
        let numerator_scale = amount_out
            .raw()
            .checked_mul(U256::from(BPS_DENOMINATOR))
            .ok_or(tranche_types::AmountError::Overflow)?;
        let denominator = (reserve_out.raw() - amount_out.raw())
            .checked_mul(U256::from(BPS_DENOMINATOR - self.fee_bps))
            .ok_or(tranche_types::AmountError::Overflow)?;
        let in_raw = mul_div_floor(reserve_in.raw(), numerator_scale, denominator)?
            .checked_add(U256::one())
            .ok_or(tranche_types::AmountError::Overflow)?;

        let amount_in = CurrencyAmount::from_raw(reserve_in.currency().clone(), in_raw);
        let next = self.apply_trade(&amount_in, amount_out)?;
        Ok((amount_in, Arc::new(next)))
    }
}
