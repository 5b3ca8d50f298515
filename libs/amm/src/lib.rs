//! # Tranche AMM Library
//!
//! AMM venue capability for the tranche-loan computation stack.
//!
//! ## Purpose
//!
//! Defines the quoting interface the loan engine consumes (exact-input and
//! exact-output quotes against an immutable pool snapshot) plus a
//! constant-product reference model with precise integer formulas.
//!
//! ## Design Philosophy
//!
//! - **Persistent snapshots**: quoting never mutates a venue; every quote
//!   returns the post-trade venue as a new value. Price impact is
//!   path-dependent, so stale snapshots must stay valid for comparison.
//! - **Model polymorphism**: callers are generic over [`AmmVenue`], never
//!   over a concrete pricing curve; concentrated-liquidity or other models
//!   slot in behind the same trait.
//! - **Exact integer math**: quotes floor in the pool's favor, mirroring
//!   on-chain constant-product arithmetic.

pub mod constant_product;
pub mod error;
pub mod venue;

pub use constant_product::ConstantProductVenue;
pub use error::AmmError;
pub use venue::AmmVenue;
