// src/reconcile/mod.rs
//! Maps heterogeneous backend history records onto [`TransactionRecord`]

pub mod fields;
mod grouping;

use serde_json::Value;
use std::collections::HashMap;

use crate::config::currencies::{CryptoMeta, CurrencyCatalog};
use crate::transaction::{ConversionLeg, TransactionKind, TransactionRecord};
use fields::*;

pub use grouping::{group_by_day, group_by_day_local, DayGroup};

/// Normalize a history payload. Pure; output has exactly one record per input.
///
/// `prices` holds live unit prices by currency id; the catalog's reference
/// price is used for ids without one.
pub fn reconcile(
    raw: &[Value],
    catalog: &CurrencyCatalog,
    prices: &HashMap<String, f64>,
) -> Vec<TransactionRecord> {
    let records: Vec<TransactionRecord> = raw
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize(index, entry, catalog, prices))
        .collect();
    log::debug!("Reconciled {} history records", records.len());
    records
}

fn normalize(
    index: usize,
    raw: &Value,
    catalog: &CurrencyCatalog,
    prices: &HashMap<String, f64>,
) -> TransactionRecord {
    if !raw.is_object() {
        log::warn!("History record {} is not an object, using defaults", index);
    }

    let raw_type = first_str(raw, TYPE);
    let kind = raw_type
        .as_deref()
        .map(TransactionKind::from_raw)
        .unwrap_or_default();

    let currency = first_str(raw, CURRENCY);
    let meta = currency.as_deref().and_then(|c| catalog.find_crypto(c));
    let asset_id = meta
        .map(|m| m.id.clone())
        .or_else(|| currency.as_ref().map(|c| c.trim().to_lowercase()));
    let symbol = meta
        .map(|m| m.symbol.clone())
        .or_else(|| currency.as_ref().map(|c| c.trim().to_uppercase()));

    let amount = first_number(raw, HUMAN_AMOUNT)
        .or_else(|| first_number(raw, RAW_AMOUNT))
        .unwrap_or(0.0);

    let price = unit_price(asset_id.as_deref(), meta, prices);
    let computed_value = match price {
        Some(price) => amount.abs() * price,
        None => first_number(raw, VALUE).map(f64::abs).unwrap_or(0.0),
    };

    TransactionRecord {
        id: first_str(raw, ID).unwrap_or_else(|| format!("local-{}", index)),
        kind,
        raw_type,
        asset_id,
        symbol,
        amount,
        raw_amount: first_str(raw, RAW_AMOUNT),
        counterparty_address: first_str(raw, COUNTERPARTY),
        timestamp: first_str(raw, TIMESTAMP),
        computed_value: if computed_value.is_finite() { computed_value } else { 0.0 },
        status: first_str(raw, STATUS),
        tx_hash: first_str(raw, TX_HASH),
        direction: first_str(raw, DIRECTION),
        category: first_str(raw, CATEGORY),
        from_address: first_str(raw, FROM_ADDRESS),
        to_address: first_str(raw, TO_ADDRESS),
        created_at: first_str(raw, CREATED_AT),
        time_ago: first_str(raw, TIME_AGO),
        metadata: first_value(raw, METADATA).cloned(),
        conversion: if kind.is_exchange() {
            conversion_leg(raw, catalog)
        } else {
            None
        },
    }
}

// A zero or missing price counts as unresolvable
fn unit_price(
    asset_id: Option<&str>,
    meta: Option<&CryptoMeta>,
    prices: &HashMap<String, f64>,
) -> Option<f64> {
    asset_id
        .and_then(|id| prices.get(id).copied())
        .filter(|p| p.is_finite() && *p > 0.0)
        .or_else(|| meta.map(|m| m.price).filter(|p| p.is_finite() && *p > 0.0))
}

fn conversion_leg(raw: &Value, catalog: &CurrencyCatalog) -> Option<ConversionLeg> {
    let from = first_str(raw, FROM_ASSET);
    let to = first_str(raw, TO_ASSET);
    if from.is_none() && to.is_none() {
        return None;
    }

    let (from_asset_id, from_resolved) = resolve_side(from.as_deref(), catalog);
    let (to_asset_id, to_resolved) = resolve_side(to.as_deref(), catalog);

    Some(ConversionLeg {
        from_asset_id,
        to_asset_id,
        from_symbol: from_resolved.or_else(|| first_str(raw, FROM_SYMBOL)),
        to_symbol: to_resolved.or_else(|| first_str(raw, TO_SYMBOL)),
        from_amount: first_number(raw, FROM_HUMAN_AMOUNT)
            .or_else(|| first_number(raw, FROM_RAW_AMOUNT))
            .unwrap_or(0.0),
        to_amount: first_number(raw, TO_HUMAN_AMOUNT)
            .or_else(|| first_number(raw, TO_RAW_AMOUNT))
            .unwrap_or(0.0),
        from_raw_amount: first_str(raw, FROM_RAW_AMOUNT),
        to_raw_amount: first_str(raw, TO_RAW_AMOUNT),
    })
}

/// Resolved (id, symbol) for one side of a conversion; crypto first, then fiat
fn resolve_side(key: Option<&str>, catalog: &CurrencyCatalog) -> (Option<String>, Option<String>) {
    let Some(key) = key else {
        return (None, None);
    };
    if let Some(meta) = catalog.find_crypto(key) {
        return (Some(meta.id.clone()), Some(meta.symbol.clone()));
    }
    if let Some(fiat) = catalog.fiat_by_code(key) {
        return (Some(fiat.code.to_lowercase()), Some(fiat.code.clone()));
    }
    (None, None)
}
