//! Field-resolution table for raw history records.
//!
//! The backend has shipped several shapes over time; each canonical field
//! lists the raw names it may appear under, first match wins. Dotted names
//! descend into nested objects.

use serde_json::Value;

use crate::api::flex_value;

pub type FieldChain = &'static [&'static str];

pub const ID: FieldChain = &["id", "_id", "transactionId"];
pub const TYPE: FieldChain = &["type", "transactionType"];
pub const CURRENCY: FieldChain = &["currency", "symbol", "cryptoId"];
pub const HUMAN_AMOUNT: FieldChain = &["humanAmount", "amountFormatted"];
pub const RAW_AMOUNT: FieldChain = &["amount"];
pub const VALUE: FieldChain = &["value", "usdValue"];
pub const COUNTERPARTY: FieldChain = &["address", "toAddress"];
pub const TIMESTAMP: FieldChain = &["timestamp", "createdAt"];
pub const STATUS: FieldChain = &["status"];
pub const TX_HASH: FieldChain = &["txHash", "hash"];
pub const DIRECTION: FieldChain = &["direction"];
pub const CATEGORY: FieldChain = &["category"];
pub const FROM_ADDRESS: FieldChain = &["fromAddress"];
pub const TO_ADDRESS: FieldChain = &["toAddress"];
pub const CREATED_AT: FieldChain = &["createdAt"];
pub const TIME_AGO: FieldChain = &["timeAgo"];
pub const METADATA: FieldChain = &["metadata"];

pub const FROM_ASSET: FieldChain = &["fromCryptoId", "fromCurrency", "fromSymbol"];
pub const TO_ASSET: FieldChain = &["toCryptoId", "toCurrency", "toSymbol"];
pub const FROM_SYMBOL: FieldChain = &["fromSymbol", "fromCurrency"];
pub const TO_SYMBOL: FieldChain = &["toSymbol", "toCurrency"];
pub const FROM_HUMAN_AMOUNT: FieldChain = &["fromHumanAmount"];
pub const FROM_RAW_AMOUNT: FieldChain = &["fromAmount"];
pub const TO_HUMAN_AMOUNT: FieldChain = &["toHumanAmount"];
pub const TO_RAW_AMOUNT: FieldChain = &["toAmount"];

fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(raw, |value, key| value.get(key))
}

/// First present, non-null, non-empty value in the chain
pub fn first_value<'a>(raw: &'a Value, chain: FieldChain) -> Option<&'a Value> {
    chain.iter().find_map(|path| match lookup(raw, path) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(value),
    })
}

/// First field rendered as text; numbers are accepted for ids and amounts
pub fn first_str(raw: &Value, chain: FieldChain) -> Option<String> {
    chain.iter().find_map(|path| match lookup(raw, path) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// First field that parses as a finite number
pub fn first_number(raw: &Value, chain: FieldChain) -> Option<f64> {
    chain
        .iter()
        .find_map(|path| lookup(raw, path).and_then(flex_value))
}
