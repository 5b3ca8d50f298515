//! Multi-venue sale routing and deposit sizing
//!
//! Binds a bond to one AMM venue per non-residual tranche, all paired
//! against one shared loan currency. Sales are routed strictly in
//! seniority order: senior liquidity carries the least price impact and
//! the smallest risk premium, so front-loading it minimizes the aggregate
//! discount for any target amount. Deposit sizing has no closed form
//! (independent price-impact curves compose across venues), so the minimum
//! is found by a bounded binary search between zero and the senior-only
//! sizing.

use crate::bond::Bond;
use crate::error::LoanError;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;
use tranche_amm::AmmVenue;
use tranche_types::{mul_div_floor, scale_factor, AmountError, CurrencyAmount, Token, U256};

/// Result of a borrow: per-tranche unsold remainders plus loan proceeds
#[derive(Debug, Clone)]
pub struct BorrowOutput {
    /// One entry per tranche in seniority order; the last entry is the
    /// untouched residual allocation
    pub tranche_tokens: Vec<CurrencyAmount>,
    /// Total realized loan-currency proceeds
    pub currency_output: CurrencyAmount,
}

/// Routes tranche sales through per-tranche AMM venues
pub struct LoanManager {
    bond: Arc<Bond>,
    venues: Vec<Arc<dyn AmmVenue>>,
    loan_currency: Token,
}

/// Scale the smaller-decimal side up so both raw quantities share one scale
fn normalize_decimals(
    a: U256,
    a_decimals: u8,
    b: U256,
    b_decimals: u8,
) -> Result<(U256, U256), AmountError> {
    let scale = |raw: U256, diff: u8| {
        raw.checked_mul(scale_factor(diff))
            .ok_or(AmountError::Overflow)
    };
    if a_decimals < b_decimals {
        Ok((scale(a, b_decimals - a_decimals)?, b))
    } else {
        Ok((a, scale(b, a_decimals - b_decimals)?))
    }
}

/// Signed fraction (numerator ÷ denominator) at 10^-9 resolution
fn signed_ratio(numerator: U256, denominator: U256, negative: bool) -> Result<Decimal, LoanError> {
    const SCALE: u32 = 9;
    let scaled = mul_div_floor(numerator, U256::exp10(SCALE as usize), denominator)?;
    if scaled > U256::from(u128::MAX) {
        return Err(LoanError::Amount(AmountError::PrecisionLoss {
            value: scaled.to_string(),
        }));
    }
    let magnitude = Decimal::try_from_i128_with_scale(scaled.as_u128() as i128, SCALE).map_err(
        |_| {
            LoanError::Amount(AmountError::PrecisionLoss {
                value: scaled.to_string(),
            })
        },
    )?;
    Ok(if negative { -magnitude } else { magnitude })
}

impl LoanManager {
    /// Sentinel sale meaning "sell the entire execution-time allocation";
    /// emitted instead of a literal amount when the plan feeds an exact
    /// on-chain call that must tolerate slippage between quote and
    /// execution
    pub const SELL_ALL: U256 = U256::MAX;

    /// Bind `bond` to one venue per non-residual tranche
    ///
    /// Fails unless venue\[i\] pairs tranche\[i\]'s token against the one
    /// loan currency shared by every venue.
    pub fn new(bond: Arc<Bond>, venues: Vec<Arc<dyn AmmVenue>>) -> Result<Self, LoanError> {
        // No venue for the residual tranche: it is retained, never sold
        let expected = bond.tranches().len() - 1;
        if venues.len() != expected {
            return Err(LoanError::InvalidVenueCount {
                expected,
                got: venues.len(),
            });
        }
        if venues.is_empty() {
            return Err(LoanError::NoVenues);
        }

        let mut loan_currency: Option<Token> = None;
        for (i, (venue, tranche)) in venues.iter().zip(bond.tranches()).enumerate() {
            if !venue.involves(tranche.token()) {
                return Err(LoanError::UnmatchedVenue {
                    index: i,
                    tranche: tranche.token().label().to_string(),
                });
            }
            let other = venue.other_token(tranche.token())?.clone();
            match &loan_currency {
                None => loan_currency = Some(other),
                Some(expected) if *expected != other => {
                    return Err(LoanError::MixedLoanCurrency {
                        expected: expected.label().to_string(),
                        got: other.label().to_string(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            bond,
            venues,
            // venues is non-empty, so the currency was derived
            loan_currency: loan_currency.ok_or(LoanError::NoVenues)?,
        })
    }

    pub fn bond(&self) -> &Arc<Bond> {
        &self.bond
    }

    pub fn venues(&self) -> &[Arc<dyn AmmVenue>] {
        &self.venues
    }

    /// The loan currency shared by every venue
    pub fn loan_currency(&self) -> &Token {
        &self.loan_currency
    }

    fn check_loan_currency(&self, amount: &CurrencyAmount) -> Result<(), LoanError> {
        if amount.currency() != &self.loan_currency {
            return Err(LoanError::InvalidLoanCurrency {
                expected: self.loan_currency.label().to_string(),
                got: amount.currency().label().to_string(),
            });
        }
        Ok(())
    }

    fn check_deposit_currency(&self, amount: &CurrencyAmount) -> Result<(), LoanError> {
        if amount.currency() != self.bond.collateral() {
            return Err(LoanError::InvalidDepositCurrency {
                expected: self.bond.collateral().label().to_string(),
                got: amount.currency().label().to_string(),
            });
        }
        Ok(())
    }

    /// Spot price of tranche `index` quoted in the loan currency
    pub fn tranche_price(&self, index: usize) -> Result<Decimal, LoanError> {
        let venue = self
            .venues
            .get(index)
            .ok_or(LoanError::TrancheIndexOutOfRange {
                index,
                len: self.venues.len(),
            })?;
        let tranche_token = self.bond.tranches()[index].token();
        if venue.token0() == tranche_token {
            Ok(venue.token0_price()?)
        } else {
            Ok(venue.token1_price()?)
        }
    }

    /// Aggregate discount for selling `sales` (one per venue)
    ///
    /// Positive means the seller receives less than face value, negative a
    /// premium. Raw quantities are normalized for any decimal mismatch
    /// between loan and collateral currency before comparison.
    pub async fn discount(&self, sales: &[CurrencyAmount]) -> Result<Decimal, LoanError> {
        if sales.len() != self.venues.len() {
            return Err(LoanError::InvalidSalesCount {
                expected: self.venues.len(),
                got: sales.len(),
            });
        }

        let mut total_in = U256::zero();
        let mut total_out = CurrencyAmount::zero(self.loan_currency.clone());
        for (sale, venue) in sales.iter().zip(&self.venues) {
            let (amount_out, _) = venue.get_output_amount(sale).await?;
            total_out = total_out.checked_add(&amount_out)?;
            total_in = total_in
                .checked_add(sale.raw())
                .ok_or(AmountError::Overflow)?;
        }

        if total_out.is_zero() {
            return Err(LoanError::ZeroSaleOutput);
        }

        let (in_normalized, out_normalized) = normalize_decimals(
            total_in,
            self.bond.collateral().decimals,
            total_out.raw(),
            self.loan_currency.decimals,
        )?;
        if in_normalized >= out_normalized {
            signed_ratio(in_normalized - out_normalized, out_normalized, false)
        } else {
            signed_ratio(out_normalized - in_normalized, out_normalized, true)
        }
    }

    /// Rate of return for buying tranche `tranche_index` with `deposit`
    /// loan currency: (output − deposit) ÷ deposit, decimal-normalized
    pub async fn lender_interest(
        &self,
        deposit: &CurrencyAmount,
        tranche_index: usize,
    ) -> Result<Decimal, LoanError> {
        self.check_loan_currency(deposit)?;
        let venue = self
            .venues
            .get(tranche_index)
            .ok_or(LoanError::TrancheIndexOutOfRange {
                index: tranche_index,
                len: self.venues.len(),
            })?;

        let (output, _) = venue.get_output_amount(deposit).await?;
        let (out_normalized, deposit_normalized) = normalize_decimals(
            output.raw(),
            output.currency().decimals,
            deposit.raw(),
            self.loan_currency.decimals,
        )?;
        if out_normalized >= deposit_normalized {
            signed_ratio(out_normalized - deposit_normalized, deposit_normalized, false)
        } else {
            signed_ratio(deposit_normalized - out_normalized, deposit_normalized, true)
        }
    }

    /// Sale schedule meeting `desired_output` from a `deposit` of
    /// collateral, filling venues in seniority order
    ///
    /// With `contract_input` set the plan feeds an exact on-chain call:
    /// full-allocation sales become the [`Self::SELL_ALL`] sentinel and the
    /// result is padded with zero sales to one entry per tranche.
    pub async fn sales(
        &self,
        desired_output: &CurrencyAmount,
        deposit: &CurrencyAmount,
        contract_input: bool,
    ) -> Result<Vec<CurrencyAmount>, LoanError> {
        self.check_loan_currency(desired_output)?;
        self.check_deposit_currency(deposit)?;

        let minted = self.bond.deposit(deposit)?;
        let mut sales = Vec::with_capacity(self.bond.tranches().len());
        let mut running_output = CurrencyAmount::zero(self.loan_currency.clone());

        for (i, venue) in self.venues.iter().enumerate() {
            let tranche = &self.bond.tranches()[i];
            let allocation = &minted[i];

            if running_output.ge(desired_output)? {
                // Target already satisfied by more senior sales
                sales.push(CurrencyAmount::zero(tranche.token().clone()));
                continue;
            }

            let (max_output, _) = venue.get_output_amount(allocation).await?;
            let reachable = running_output.checked_add(&max_output)?;
            if reachable.lt(desired_output)? {
                // Whole allocation is not enough: sell all of it
                debug!(
                    tranche = i,
                    sold = %allocation,
                    realized = %max_output,
                    "selling full tranche allocation"
                );
                sales.push(if contract_input {
                    CurrencyAmount::from_raw(tranche.token().clone(), Self::SELL_ALL)
                } else {
                    allocation.clone()
                });
                running_output = reachable;
            } else {
                // This venue can finish the fill: solve for the remainder
                let remainder = desired_output.checked_sub(&running_output)?;
                let (partial_input, _) = venue.get_input_amount(&remainder).await?;
                debug!(
                    tranche = i,
                    sold = %partial_input,
                    realized = %remainder,
                    "selling partial tranche allocation"
                );
                sales.push(partial_input);
                running_output = desired_output.clone();
            }
        }

        if contract_input {
            // Downstream call sites need fixed arity: one entry per tranche
            for tranche in &self.bond.tranches()[sales.len()..] {
                sales.push(CurrencyAmount::zero(tranche.token().clone()));
            }
        }

        if !running_output.ge(desired_output)? {
            return Err(LoanError::InsufficientDeposit {
                desired: desired_output.raw().to_string(),
                achieved: running_output.raw().to_string(),
            });
        }
        Ok(sales)
    }

    /// Deposit sized so the senior venue alone realizes `desired_output`,
    /// the maximum useful collateralization for that target
    ///
    /// Verified forward: the sized deposit must realize at least
    /// `desired_output` through [`Self::borrow_max`].
    pub async fn maximum_required_deposit(
        &self,
        desired_output: &CurrencyAmount,
    ) -> Result<CurrencyAmount, LoanError> {
        self.check_loan_currency(desired_output)?;

        let (senior_input, _) = self.venues[0].get_input_amount(desired_output).await?;
        let deposit = self.bond.get_required_deposit(&senior_input)?;

        let forward = self.borrow_max(&deposit).await?;
        if !forward.currency_output.ge(desired_output)? {
            return Err(LoanError::InsufficientLiquidity {
                desired: desired_output.raw().to_string(),
                achieved: forward.currency_output.raw().to_string(),
            });
        }
        Ok(deposit)
    }

    /// Smallest deposit, at search resolution, guaranteed to realize
    /// `desired_output` by selling across all non-residual tranches
    ///
    /// No closed-form inverse exists for the composed price-impact curves,
    /// so this is a bounded binary search: at most 10 rounds, stopping
    /// early once the bracket narrows to one whole unit of the deposit
    /// currency. The ≤1-unit, ≤10-round tolerance is the contract, not an
    /// accident.
    pub async fn minimum_required_deposit(
        &self,
        desired_output: &CurrencyAmount,
    ) -> Result<CurrencyAmount, LoanError> {
        let collateral = self.bond.collateral().clone();
        let one_unit = collateral.one_token();
        let mut max = self.maximum_required_deposit(desired_output).await?.raw();
        let mut min = U256::zero();

        for round in 0..10 {
            if max - min <= one_unit {
                break;
            }
            let mid = min + (max - min) / 2;
            let probe = CurrencyAmount::from_raw(collateral.clone(), mid);
            let realized = self.borrow_max(&probe).await?.currency_output;
            debug!(round, mid = %mid, realized = %realized, "deposit search probe");
            if realized.lt(desired_output)? {
                min = mid;
            } else {
                max = mid;
            }
        }

        Ok(CurrencyAmount::from_raw(collateral, max))
    }

    /// Mint against `collateral_amount` and sell every non-residual
    /// allocation; the residual tranche is returned untouched
    pub async fn borrow_max(
        &self,
        collateral_amount: &CurrencyAmount,
    ) -> Result<BorrowOutput, LoanError> {
        self.check_deposit_currency(collateral_amount)?;
        let minted = self.bond.deposit(collateral_amount)?;

        let mut currency_output = CurrencyAmount::zero(self.loan_currency.clone());
        let mut tranche_tokens = Vec::with_capacity(minted.len());
        for (allocation, venue) in minted[..minted.len() - 1].iter().zip(&self.venues) {
            let (amount_out, _) = venue.get_output_amount(allocation).await?;
            currency_output = currency_output.checked_add(&amount_out)?;
            tranche_tokens.push(CurrencyAmount::zero(allocation.currency().clone()));
        }
        // residual allocation is retained, not sold
        tranche_tokens.push(minted[minted.len() - 1].clone());

        Ok(BorrowOutput {
            tranche_tokens,
            currency_output,
        })
    }

    /// Mint against `collateral_amount` and sell only the caller-supplied
    /// `sales` (one per venue), returning per-tranche unsold remainders
    pub async fn borrow(
        &self,
        collateral_amount: &CurrencyAmount,
        sales: &[CurrencyAmount],
    ) -> Result<BorrowOutput, LoanError> {
        self.check_deposit_currency(collateral_amount)?;
        if sales.len() != self.venues.len() {
            return Err(LoanError::InvalidSalesCount {
                expected: self.venues.len(),
                got: sales.len(),
            });
        }
        let minted = self.bond.deposit(collateral_amount)?;

        let mut currency_output = CurrencyAmount::zero(self.loan_currency.clone());
        let mut tranche_tokens = Vec::with_capacity(minted.len());
        for (i, (sale, venue)) in sales.iter().zip(&self.venues).enumerate() {
            let allocation = &minted[i];
            if !sale.le(allocation)? {
                return Err(LoanError::InvalidSale { index: i });
            }
            let (amount_out, _) = venue.get_output_amount(sale).await?;
            currency_output = currency_output.checked_add(&amount_out)?;
            tranche_tokens.push(allocation.checked_sub(sale)?);
        }
        tranche_tokens.push(minted[minted.len() - 1].clone());

        Ok(BorrowOutput {
            tranche_tokens,
            currency_output,
        })
    }
}
