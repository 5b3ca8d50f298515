//! Bond entity: ordered tranches over one collateral pool
//!
//! Built once from an indexer snapshot, then read-only. Every operation
//! returns new values; the arithmetic is exact base-unit integer math with
//! floor division, matching the on-chain accounting it mirrors. The one
//! deliberate exception is [`Bond::get_required_deposit`], which rounds up
//! so the returned deposit always mints at least the requested output.

use crate::error::BondError;
use crate::snapshot::{BondSnapshot, TokenSnapshot, TrancheSnapshot};
use crate::tranche::Tranche;
use tranche_types::{mul_div_ceil, mul_div_floor, CurrencyAmount, Token, U256};

/// Fixed denominator against which integer tranche ratios are expressed
pub const TRANCHE_RATIO_GRANULARITY: u32 = 1000;

/// Immutable bond snapshot: ≥2 tranches sorted by ascending seniority index
#[derive(Debug, Clone)]
pub struct Bond {
    address: String,
    maturity_date: u64,
    is_mature: bool,
    total_debt: U256,
    total_collateral: U256,
    collateral: Token,
    tranches: Vec<Tranche>,
}

fn parse_u256(field: &'static str, value: &str) -> Result<U256, BondError> {
    U256::from_dec_str(value).map_err(|_| BondError::InvalidSnapshot {
        field,
        value: value.to_string(),
    })
}

fn parse_int<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, BondError> {
    value.parse().map_err(|_| BondError::InvalidSnapshot {
        field,
        value: value.to_string(),
    })
}

fn parse_token(snapshot: &TokenSnapshot) -> Result<Token, BondError> {
    Ok(Token::new(
        snapshot.id.clone(),
        parse_int("token.decimals", &snapshot.decimals)?,
        Some(snapshot.symbol.clone()),
        Some(snapshot.name.clone()),
    ))
}

impl Bond {
    /// Parse and validate an indexer snapshot
    pub fn from_snapshot(snapshot: &BondSnapshot) -> Result<Self, BondError> {
        if snapshot.tranches.len() < 2 {
            return Err(BondError::TooFewTranches {
                got: snapshot.tranches.len(),
            });
        }
        let collateral = parse_token(&snapshot.collateral)?;

        let mut indexed: Vec<(u32, &TrancheSnapshot)> = Vec::with_capacity(snapshot.tranches.len());
        for t in &snapshot.tranches {
            indexed.push((parse_int("tranche.index", &t.index)?, t));
        }
        indexed.sort_by_key(|(index, _)| *index);

        let mut tranches = Vec::with_capacity(indexed.len());
        for (index, t) in indexed {
            tranches.push(Tranche::new(
                t.id.clone(),
                index,
                parse_int("tranche.ratio", &t.ratio)?,
                parse_token(&t.token)?,
                parse_u256("tranche.token.totalSupply", &t.token.total_supply)?,
                parse_u256("tranche.totalCollateral", &t.total_collateral)?,
                collateral.clone(),
            ));
        }

        Ok(Self {
            address: snapshot.id.clone(),
            maturity_date: parse_int("maturityDate", &snapshot.maturity_date)?,
            is_mature: snapshot.is_mature,
            total_debt: parse_u256("totalDebt", &snapshot.total_debt)?,
            total_collateral: parse_u256("totalCollateral", &snapshot.total_collateral)?,
            collateral,
            tranches,
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn maturity_date(&self) -> u64 {
        self.maturity_date
    }

    pub fn is_mature(&self) -> bool {
        self.is_mature
    }

    pub fn total_debt(&self) -> U256 {
        self.total_debt
    }

    pub fn total_collateral(&self) -> U256 {
        self.total_collateral
    }

    pub fn collateral(&self) -> &Token {
        &self.collateral
    }

    /// Tranches in ascending seniority order (0 = most senior)
    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }

    /// The most junior tranche, retained as leveraged exposure
    pub fn residual_tranche(&self) -> &Tranche {
        // from_snapshot rejects bonds with fewer than two tranches
        self.tranches.last().expect("bond has at least two tranches")
    }

    /// Debt-to-collateral ratio: totalDebt · 100 ÷ totalCollateral
    pub fn dcr(&self) -> Result<U256, BondError> {
        Ok(mul_div_floor(
            self.total_debt,
            U256::from(100u64),
            self.total_collateral,
        )?)
    }

    fn check_collateral_currency(&self, amount: &CurrencyAmount) -> Result<(), BondError> {
        if amount.currency() != &self.collateral {
            return Err(BondError::InvalidInputCurrency {
                expected: self.collateral.label().to_string(),
                got: amount.currency().label().to_string(),
            });
        }
        Ok(())
    }

    /// Tranche tokens minted for a collateral deposit, in seniority order
    ///
    /// Bootstrap (zero bond collateral): out_i = ⌊in · ratio_i ÷ granularity⌋.
    /// Steady state: out_i = ⌊in · ratio_i · totalDebt ÷ (granularity · totalCollateral)⌋.
    pub fn deposit(&self, collateral_input: &CurrencyAmount) -> Result<Vec<CurrencyAmount>, BondError> {
        self.check_collateral_currency(collateral_input)?;

        let input = collateral_input.raw();
        let granularity = U256::from(TRANCHE_RATIO_GRANULARITY);
        let mut outputs = Vec::with_capacity(self.tranches.len());
        for tranche in &self.tranches {
            let scaled = input
                .checked_mul(U256::from(tranche.ratio()))
                .ok_or(tranche_types::AmountError::Overflow)?;
            let raw = if self.total_collateral.is_zero() {
                mul_div_floor(scaled, U256::one(), granularity)?
            } else {
                let denom = granularity
                    .checked_mul(self.total_collateral)
                    .ok_or(tranche_types::AmountError::Overflow)?;
                mul_div_floor(scaled, self.total_debt, denom)?
            };
            outputs.push(CurrencyAmount::from_raw(tranche.token().clone(), raw));
        }
        Ok(outputs)
    }

    /// Redeem a single tranche amount after maturity
    pub fn redeem_mature(&self, tranche_amount: &CurrencyAmount) -> Result<CurrencyAmount, BondError> {
        if !self.is_mature {
            return Err(BondError::NotMature);
        }

        let tranche = self
            .tranches
            .iter()
            .find(|t| t.token() == tranche_amount.currency())
            .ok_or_else(|| BondError::UnknownTrancheToken {
                token: tranche_amount.currency().label().to_string(),
            })?;

        // Coarse raw-value bound against the tranche's collateral share,
        // independent of decimals
        if tranche_amount.raw() > tranche.total_collateral() {
            return Err(BondError::InsufficientCollateral {
                requested: tranche_amount.raw().to_string(),
                available: tranche.total_collateral().to_string(),
            });
        }

        tranche.redeem_value(tranche_amount)
    }

    /// Redeem one amount per tranche, in seniority order, before maturity
    pub fn redeem(&self, tranche_inputs: &[CurrencyAmount]) -> Result<CurrencyAmount, BondError> {
        if tranche_inputs.len() != self.tranches.len() {
            return Err(BondError::InvalidRedeemArity {
                expected: self.tranches.len(),
                got: tranche_inputs.len(),
            });
        }

        let mut total_redeemed = U256::zero();
        for (i, (input, tranche)) in tranche_inputs.iter().zip(&self.tranches).enumerate() {
            if input.currency() != tranche.token() {
                return Err(BondError::MisorderedRedeem {
                    index: i,
                    expected: tranche.token().label().to_string(),
                    got: input.currency().label().to_string(),
                });
            }
            total_redeemed = total_redeemed
                .checked_add(input.raw())
                .ok_or(tranche_types::AmountError::Overflow)?;
        }

        if total_redeemed > self.total_collateral {
            return Err(BondError::InsufficientCollateral {
                requested: total_redeemed.to_string(),
                available: self.total_collateral.to_string(),
            });
        }

        let raw = mul_div_floor(total_redeemed, self.total_collateral, self.total_debt)?;
        Ok(CurrencyAmount::from_raw(self.collateral.clone(), raw))
    }

    /// Collateral deposit that mints at least `desired_tranche_output` of
    /// one target tranche: the algebraic inverse of [`Bond::deposit`]
    /// restricted to that tranche, rounded up
    pub fn get_required_deposit(
        &self,
        desired_tranche_output: &CurrencyAmount,
    ) -> Result<CurrencyAmount, BondError> {
        let tranche = self
            .tranches
            .iter()
            .find(|t| t.token() == desired_tranche_output.currency())
            .ok_or_else(|| BondError::InvalidTarget {
                token: desired_tranche_output.currency().label().to_string(),
            })?;

        let granularity = U256::from(TRANCHE_RATIO_GRANULARITY);
        let ratio = U256::from(tranche.ratio());
        let desired = desired_tranche_output.raw();

        let raw = if self.total_collateral.is_zero() {
            mul_div_ceil(desired, granularity, ratio)?
        } else {
            let scaled = desired
                .checked_mul(granularity)
                .ok_or(tranche_types::AmountError::Overflow)?;
            let denom = ratio
                .checked_mul(self.total_debt)
                .ok_or(tranche_types::AmountError::Overflow)?;
            mul_div_ceil(scaled, self.total_collateral, denom)?
        };
        Ok(CurrencyAmount::from_raw(self.collateral.clone(), raw))
    }
}
