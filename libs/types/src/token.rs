//! Token identity
//!
//! A token is identified by its address; indexers emit addresses with
//! inconsistent checksum casing, so identity comparison is
//! case-insensitive.

use crate::precision::scale_factor;
use ethers_core::types::U256;
use serde::{Deserialize, Serialize};

/// Immutable token identity: address plus display metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub address: String,
    pub decimals: u8,
    pub symbol: Option<String>,
    pub name: Option<String>,
}

impl Token {
    pub fn new(
        address: impl Into<String>,
        decimals: u8,
        symbol: Option<String>,
        name: Option<String>,
    ) -> Self {
        Self {
            address: address.into(),
            decimals,
            symbol,
            name,
        }
    }

    /// Bare identity without display metadata
    pub fn from_address(address: impl Into<String>, decimals: u8) -> Self {
        Self::new(address, decimals, None, None)
    }

    /// One whole token in base units (10^decimals)
    pub fn one_token(&self) -> U256 {
        scale_factor(self.decimals)
    }

    /// Short label for error messages
    pub fn label(&self) -> &str {
        self.symbol.as_deref().unwrap_or(&self.address)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address.eq_ignore_ascii_case(&other.address)
    }
}

impl Eq for Token {}

/// Whether any token in `tokens` shares `needle`'s identity
pub fn contains_token(tokens: &[&Token], needle: &Token) -> bool {
    tokens.iter().any(|t| *t == needle)
}
