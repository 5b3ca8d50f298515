//! Errors for bond arithmetic and loan routing
//!
//! Three families: validation (mismatched currencies, wrong arity),
//! insufficiency (collateral or liquidity too low for a target), and
//! structural (malformed bond, unmatched venue pairing). Everything
//! surfaces synchronously at the point of violation; nothing is retried.

use thiserror::Error;
use tranche_amm::AmmError;
use tranche_types::AmountError;

/// Errors from bond construction and proportional mint/redeem math
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BondError {
    /// A bond needs a senior and at least one subordinate claim
    #[error("Bond requires at least 2 tranches, got {got}")]
    TooFewTranches { got: usize },

    /// A snapshot field failed to parse
    #[error("Invalid snapshot field {field}: {value:?}")]
    InvalidSnapshot { field: &'static str, value: String },

    /// Amount is not denominated in the expected token
    #[error("Invalid input currency: expected {expected}, got {got}")]
    InvalidInputCurrency { expected: String, got: String },

    /// Post-maturity redemption attempted before maturity
    #[error("Bond is not mature")]
    NotMature,

    /// Amount's currency matches no tranche token of this bond
    #[error("Unknown tranche token {token}")]
    UnknownTrancheToken { token: String },

    /// Redemption exceeds the collateral backing it
    #[error("Insufficient collateral: requested {requested}, available {available}")]
    InsufficientCollateral { requested: String, available: String },

    /// `redeem` requires exactly one amount per tranche
    #[error("Invalid redeem arity: expected {expected} tranche amounts, got {got}")]
    InvalidRedeemArity { expected: usize, got: usize },

    /// `redeem` inputs must follow seniority order
    #[error("Misordered redeem input at index {index}: expected {expected}, got {got}")]
    MisorderedRedeem {
        index: usize,
        expected: String,
        got: String,
    },

    /// Desired output of `get_required_deposit` matches no tranche token
    #[error("Invalid deposit target: {token} is not a tranche token")]
    InvalidTarget { token: String },

    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Errors from loan routing and leverage iteration
#[derive(Debug, Error)]
pub enum LoanError {
    /// One venue per non-residual tranche is required
    #[error("Invalid venue count: expected {expected}, got {got}")]
    InvalidVenueCount { expected: usize, got: usize },

    /// A loan manager without venues cannot route anything
    #[error("No venues")]
    NoVenues,

    /// Venue does not reference its tranche's token on either side
    #[error("Venue {index} does not pair tranche token {tranche}")]
    UnmatchedVenue { index: usize, tranche: String },

    /// All venues must share one loan currency
    #[error("Mixed loan currencies across venues: expected {expected}, got {got}")]
    MixedLoanCurrency { expected: String, got: String },

    /// Amount must be denominated in the shared loan currency
    #[error("Invalid loan currency: expected {expected}, got {got}")]
    InvalidLoanCurrency { expected: String, got: String },

    /// Deposit must be denominated in the bond's collateral
    #[error("Invalid deposit currency: expected {expected}, got {got}")]
    InvalidDepositCurrency { expected: String, got: String },

    /// One sale per venue is required
    #[error("Invalid sales count: expected {expected}, got {got}")]
    InvalidSalesCount { expected: usize, got: usize },

    /// A sale exceeds its minted tranche allocation
    #[error("Invalid sale at index {index}: exceeds minted allocation")]
    InvalidSale { index: usize },

    /// Selling every non-residual allocation still misses the target
    #[error("Insufficient deposit: desired {desired}, achievable {achieved}")]
    InsufficientDeposit { desired: String, achieved: String },

    /// Even the senior-only sizing cannot realize the target forward
    #[error("Insufficient liquidity: desired {desired}, achievable {achieved}")]
    InsufficientLiquidity { desired: String, achieved: String },

    /// Discount is undefined when the quoted proceeds are zero
    #[error("Zero sale output")]
    ZeroSaleOutput,

    /// Tranche index outside the venue range
    #[error("Tranche index {index} out of range ({len} venues)")]
    TrancheIndexOutOfRange { index: usize, len: usize },

    /// Leverage input must be the bond's collateral
    #[error("Invalid collateral: expected {expected}, got {got}")]
    InvalidCollateral { expected: String, got: String },

    /// Swap-back path does not lead from loan currency to collateral
    #[error("Invalid swap-back path: {detail}")]
    InvalidSwapPath { detail: String },

    #[error(transparent)]
    Bond(#[from] BondError),

    #[error(transparent)]
    Amm(#[from] AmmError),

    #[error(transparent)]
    Amount(#[from] AmountError),
}
