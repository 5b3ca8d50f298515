//! Venue quoting errors

use thiserror::Error;
use tranche_types::AmountError;

/// Errors surfaced by AMM venue quotes
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    /// The quoted amount's token is on neither side of the venue
    #[error("Invalid currency for venue: {token} does not pair {token0}/{token1}")]
    InvalidCurrency {
        token: String,
        token0: String,
        token1: String,
    },

    /// Desired output meets or exceeds the available reserve
    #[error("Insufficient liquidity: requested {requested} of reserve {reserve}")]
    InsufficientLiquidity { requested: String, reserve: String },

    /// Venue constructed or quoted with an empty reserve
    #[error("Zero reserves in venue")]
    ZeroReserves,

    /// Both sides of a venue hold the same token
    #[error("Venue sides must be distinct tokens: {token}")]
    DuplicateTokens { token: String },

    #[error(transparent)]
    Amount(#[from] AmountError),
}
