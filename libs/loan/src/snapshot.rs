//! Indexer snapshot schema
//!
//! Wire shape of bond data as emitted by the external indexer: camelCase
//! fields, every integer a decimal string (subgraph convention, values
//! routinely exceed 64 bits). Parsing into typed values happens in
//! [`crate::bond::Bond::from_snapshot`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSnapshot {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub decimals: String,
    pub total_supply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrancheSnapshot {
    pub id: String,
    pub index: String,
    pub ratio: String,
    pub total_collateral: String,
    pub token: TokenSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondSnapshot {
    pub id: String,
    pub maturity_date: String,
    pub is_mature: bool,
    pub total_debt: String,
    pub total_collateral: String,
    pub collateral: TokenSnapshot,
    pub tranches: Vec<TrancheSnapshot>,
}
