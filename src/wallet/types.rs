use serde::{Deserialize, Serialize};

use crate::config::currencies::{CryptoMeta, FiatMeta};

/// Crypto balance merged with catalog metadata and the current unit price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    pub id: String,
    pub symbol: String,
    pub display_name: String,
    /// Never negative
    pub balance: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub chain: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl BalanceEntry {
    pub fn new(meta: &CryptoMeta, balance: f64, unit_price: f64, address: Option<String>) -> Self {
        Self {
            id: meta.id.clone(),
            symbol: meta.symbol.clone(),
            display_name: meta.name.clone(),
            balance: clamp_balance(balance),
            unit_price,
            chain: meta.chain.clone(),
            address,
        }
    }

    pub fn zero(meta: &CryptoMeta, unit_price: f64) -> Self {
        Self::new(meta, 0.0, unit_price, None)
    }

    /// Balance valued at the current unit price
    pub fn value(&self) -> f64 {
        let value = self.balance * self.unit_price;
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiatBalanceEntry {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub balance: f64,
    /// Units per reference unit
    pub rate: f64,
}

impl FiatBalanceEntry {
    pub fn new(meta: &FiatMeta, balance: f64) -> Self {
        Self {
            code: meta.code.clone(),
            name: meta.name.clone(),
            symbol: meta.symbol.clone(),
            balance: clamp_balance(balance),
            rate: meta.rate,
        }
    }
}

/// Result of a refresh that never fails outright: the data now in the store,
/// plus a notice when some of it is a fallback
#[derive(Debug, Clone, PartialEq)]
pub struct Refresh<T> {
    pub data: T,
    pub warning: Option<String>,
}

impl<T> Refresh<T> {
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }
}

/// Notices collected by a full refresh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshSummary {
    pub warnings: Vec<String>,
}

pub(crate) fn clamp_balance(balance: f64) -> f64 {
    if balance.is_finite() && balance > 0.0 {
        balance
    } else {
        0.0
    }
}
