//! Venue capability trait
//!
//! One trait per pricing model family; the loan engine only ever sees this
//! interface. Quote calls may suspend (an implementation may defer to an
//! external pricing service), hence the async signatures, but each call is
//! a pure function of the snapshot it is invoked on.

use crate::error::AmmError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;
use tranche_types::{CurrencyAmount, Token};

/// An immutable AMM pool snapshot with exact-input/exact-output quoting
///
/// Quoting returns the realized amount together with the post-trade venue
/// snapshot. The receiver is never mutated; selling twice through the same
/// snapshot deliberately double-counts liquidity and is the caller's bug.
#[async_trait]
pub trait AmmVenue: Send + Sync + fmt::Debug {
    fn token0(&self) -> &Token;

    fn token1(&self) -> &Token;

    /// Spot price of token0 denominated in token1, decimal-adjusted
    fn token0_price(&self) -> Result<Decimal, AmmError>;

    /// Spot price of token1 denominated in token0, decimal-adjusted
    fn token1_price(&self) -> Result<Decimal, AmmError>;

    /// Quote an exact-input trade
    async fn get_output_amount(
        &self,
        amount_in: &CurrencyAmount,
    ) -> Result<(CurrencyAmount, Arc<dyn AmmVenue>), AmmError>;

    /// Quote an exact-output trade
    async fn get_input_amount(
        &self,
        amount_out: &CurrencyAmount,
    ) -> Result<(CurrencyAmount, Arc<dyn AmmVenue>), AmmError>;

    /// Whether `token` sits on either side of this venue
    fn involves(&self, token: &Token) -> bool {
        self.token0() == token || self.token1() == token
    }

    /// The opposite side of the venue from `token`
    fn other_token(&self, token: &Token) -> Result<&Token, AmmError> {
        if self.token0() == token {
            Ok(self.token1())
        } else if self.token1() == token {
            Ok(self.token0())
        } else {
            Err(AmmError::InvalidCurrency {
                token: token.label().to_string(),
                token0: self.token0().label().to_string(),
                token1: self.token1().label().to_string(),
            })
        }
    }
}
