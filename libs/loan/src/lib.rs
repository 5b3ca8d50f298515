//! # Tranche Loan Library
//!
//! Off-chain allocation and sale-routing engine for tranche-based
//! structured-finance bonds.
//!
//! ## Purpose
//!
//! Computes how collateral deposited into a bond is allocated among ranked
//! claim tokens, how those tokens redeem for collateral, and how a
//! collateralized loan is synthesized by minting tranche tokens and selling
//! the non-residual ones through AMM venues while retaining the most junior
//! tranche as leveraged exposure.
//!
//! ## Architecture Role
//!
//! Snapshot data flows into pure value objects ([`Bond`], [`Tranche`]);
//! [`LoanManager`] binds a bond to one AMM venue per non-residual tranche
//! and routes sales; [`LeverageManager`] adds a swap-back path and the
//! borrow/swap-back iteration. Control flows strictly downward through
//! sequential, data-dependent quote calls; venues are persistent
//! snapshots, so no shared mutable state exists anywhere in the chain.
//!
//! ## Quick Start
//!
//! ```ignore
//! let bond = Arc::new(Bond::from_snapshot(&snapshot)?);
//! let manager = LoanManager::new(bond, venues)?;
//! let sales = manager.sales(&desired_output, &deposit, false).await?;
//! let discount = manager.discount(&sales).await?;
//! ```

pub mod bond;
pub mod error;
pub mod leverage_manager;
pub mod loan_manager;
pub mod snapshot;
pub mod tranche;

pub use bond::{Bond, TRANCHE_RATIO_GRANULARITY};
pub use error::{BondError, LoanError};
pub use leverage_manager::{LeverageManager, LeverageOutput};
pub use loan_manager::{BorrowOutput, LoanManager};
pub use snapshot::{BondSnapshot, TokenSnapshot, TrancheSnapshot};
pub use tranche::Tranche;
