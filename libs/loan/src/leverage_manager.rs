//! Iterative borrow/swap-back leverage loop
//!
//! Each round borrows against the collateral balance, keeps the residual
//! tranche, and swaps the loan proceeds back into collateral through an
//! ordered venue path. Post-trade venue snapshots are threaded between
//! rounds: swapping through a stale snapshot would double-count the path's
//! liquidity.

use crate::error::LoanError;
use crate::loan_manager::LoanManager;
use std::sync::Arc;
use tracing::debug;
use tranche_amm::AmmVenue;
use tranche_types::CurrencyAmount;

/// Accumulated leveraged position after all iterations
#[derive(Debug, Clone)]
pub struct LeverageOutput {
    /// Total residual (most junior) tranche tokens retained
    pub residual_output: CurrencyAmount,
    /// Final collateral balance left unswapped
    pub collateral_output: CurrencyAmount,
}

/// Binds a loan manager to a swap-back path from loan currency to collateral
pub struct LeverageManager {
    loan_manager: Arc<LoanManager>,
    swap_back_path: Vec<Arc<dyn AmmVenue>>,
}

impl LeverageManager {
    /// Fails unless walking the path token-by-token from the loan currency
    /// terminates at the bond's collateral currency
    pub fn new(
        loan_manager: Arc<LoanManager>,
        swap_back_path: Vec<Arc<dyn AmmVenue>>,
    ) -> Result<Self, LoanError> {
        let mut current = loan_manager.loan_currency().clone();
        for (i, venue) in swap_back_path.iter().enumerate() {
            current = venue
                .other_token(&current)
                .map_err(|_| LoanError::InvalidSwapPath {
                    detail: format!(
                        "venue {i} does not pair {}",
                        current.label()
                    ),
                })?
                .clone();
        }
        if &current != loan_manager.bond().collateral() {
            return Err(LoanError::InvalidSwapPath {
                detail: format!(
                    "path ends at {}, expected collateral {}",
                    current.label(),
                    loan_manager.bond().collateral().label()
                ),
            });
        }

        Ok(Self {
            loan_manager,
            swap_back_path,
        })
    }

    pub fn loan_manager(&self) -> &Arc<LoanManager> {
        &self.loan_manager
    }

    pub fn swap_back_path(&self) -> &[Arc<dyn AmmVenue>] {
        &self.swap_back_path
    }

    /// Build a leveraged position over `iterations` borrow/swap-back rounds
    ///
    /// Returns the accumulated residual-tranche total and whatever
    /// collateral balance remains unswapped after the last round.
    pub async fn lever(
        &self,
        collateral_amount: &CurrencyAmount,
        iterations: u32,
    ) -> Result<LeverageOutput, LoanError> {
        let bond = self.loan_manager.bond();
        if collateral_amount.currency() != bond.collateral() {
            return Err(LoanError::InvalidCollateral {
                expected: bond.collateral().label().to_string(),
                got: collateral_amount.currency().label().to_string(),
            });
        }

        let mut path = self.swap_back_path.clone();
        let mut residual_output =
            CurrencyAmount::zero(bond.residual_tranche().token().clone());
        let mut collateral_balance = collateral_amount.clone();

        for round in 0..iterations {
            let borrowed = self.loan_manager.borrow_max(&collateral_balance).await?;
            // the last entry is the whole residual allocation
            let residual = borrowed
                .tranche_tokens
                .last()
                .ok_or(LoanError::NoVenues)?;
            residual_output = residual_output.checked_add(residual)?;

            let (collateral_out, next_path) =
                Self::swap_back(&borrowed.currency_output, &path).await?;
            debug!(
                round,
                borrowed = %borrowed.currency_output,
                swapped = %collateral_out,
                residual = %residual_output,
                "leverage round complete"
            );
            path = next_path;
            collateral_balance = collateral_out;
        }

        Ok(LeverageOutput {
            residual_output,
            collateral_output: collateral_balance,
        })
    }

    /// Swap `amount` through the path sequentially, collecting the final
    /// output and the post-trade snapshot of every venue
    async fn swap_back(
        amount: &CurrencyAmount,
        path: &[Arc<dyn AmmVenue>],
    ) -> Result<(CurrencyAmount, Vec<Arc<dyn AmmVenue>>), LoanError> {
        let mut current = amount.clone();
        let mut next_path = Vec::with_capacity(path.len());
        for venue in path {
            let (output, next_venue) = venue.get_output_amount(&current).await?;
            current = output;
            next_path.push(next_venue);
        }
        Ok((current, next_path))
    }
}
