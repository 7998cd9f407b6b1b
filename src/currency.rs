// src/currency.rs
//! Amount formatting and quote-derived display figures

use crate::config::currencies::CurrencyCatalog;
use crate::quote::{Direction, Quote, QuoteFee, QuoteParams};

/// Fee estimate used on swaps whose quote carries no fee
const ESTIMATED_SWAP_FEE_RATE: f64 = 0.01;

/// Format an amount with the fiat symbol from the catalog; unknown codes use "$"
pub fn format_currency_amount(amount: f64, currency_code: &str, catalog: &CurrencyCatalog) -> String {
    let symbol = catalog
        .fiat_by_code(currency_code)
        .map_or("$", |fiat| fiat.symbol.as_str());
    format!("{}{:.2}", symbol, amount)
}

/// Amount in the reference currency expressed in `currency_code`
pub fn convert_from_reference(amount: f64, currency_code: &str, catalog: &CurrencyCatalog) -> f64 {
    let rate = catalog.fiat_by_code(currency_code).map_or(1.0, |fiat| fiat.rate);
    amount * rate
}

pub fn convert_to_reference(amount: f64, currency_code: &str, catalog: &CurrencyCatalog) -> f64 {
    match catalog.fiat_by_code(currency_code) {
        Some(fiat) if fiat.rate > 0.0 => amount / fiat.rate,
        _ => amount,
    }
}

/// Crypto amount with precision scaled to magnitude, e.g. "0.0012 BTC", "12.50 SOL"
pub fn format_crypto_amount(amount: f64, symbol: &str) -> String {
    let magnitude = amount.abs();
    if magnitude == 0.0 {
        return format!("0 {}", symbol);
    }
    let precision = if magnitude >= 1_000.0 {
        2
    } else if magnitude >= 1.0 {
        4
    } else {
        6
    };
    format!("{:.*} {}", precision, amount, symbol)
}

// ══════════════════════════════════════════════════════════════════════════════
// Convert
// ══════════════════════════════════════════════════════════════════════════════

/// Spread charged on a convert, valued in the reference currency:
/// `amount × unit_price × spread_bps / 10000`
pub fn convert_fee_estimate(amount: f64, unit_price: f64, spread_bps: f64) -> f64 {
    let fee = amount * unit_price * spread_bps / 10_000.0;
    if fee.is_finite() {
        fee
    } else {
        0.0
    }
}

/// Spread as a percentage (100 bps -> 1.0)
pub fn convert_fee_percentage(spread_bps: f64) -> f64 {
    spread_bps / 100.0
}

/// Fee line shown under a convert quote, e.g. "1% (-$475.00)"
pub fn convert_fee_display(quote: &Quote, unit_price: f64) -> Option<String> {
    let QuoteFee::Bps(bps) = quote.fee else {
        return None;
    };
    let crypto_amount = match &quote.params {
        QuoteParams::Convert {
            direction: Direction::Sell,
            amount,
            ..
        } => *amount,
        QuoteParams::Convert {
            direction: Direction::Buy,
            ..
        } => quote.to_amount,
        QuoteParams::Swap { .. } => return None,
    };
    Some(format!(
        "{}% (-${:.2})",
        convert_fee_percentage(bps),
        convert_fee_estimate(crypto_amount, unit_price, bps)
    ))
}

/// What the user receives: fiat when selling, crypto when buying
pub fn convert_receive_display(quote: &Quote, catalog: &CurrencyCatalog) -> String {
    match &quote.params {
        QuoteParams::Convert {
            direction: Direction::Sell,
            fiat,
            ..
        } => format_currency_amount(quote.to_amount, fiat, catalog),
        QuoteParams::Convert {
            direction: Direction::Buy,
            crypto,
            ..
        } => format!("{:.8} {}", quote.to_amount, crypto.to_uppercase()),
        QuoteParams::Swap { to, .. } => format!("{:.6} {}", quote.to_amount, to.to_uppercase()),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Swap
// ══════════════════════════════════════════════════════════════════════════════

/// e.g. "7000.000000 USDT"
pub fn swap_receive_display(quote: &Quote, to_symbol: &str) -> String {
    format!("{:.6} {}", quote.to_amount, to_symbol)
}

/// e.g. "1 ETH ≈ 3500.000000 USDT"
pub fn swap_rate_display(quote: &Quote, from_symbol: &str, to_symbol: &str) -> Option<String> {
    if quote.from_amount <= 0.0 {
        return None;
    }
    let rate = quote.to_amount / quote.from_amount;
    rate.is_finite()
        .then(|| format!("1 {} ≈ {:.6} {}", from_symbol, rate, to_symbol))
}

/// Quoted fee as "$3.50", or a 1% estimate "~$35.00" valued at `from_unit_price`
pub fn swap_fee_display(quote: &Quote, from_unit_price: f64) -> String {
    match quote.fee {
        QuoteFee::Amount(fee) => format!("${:.2}", fee),
        _ => {
            let estimate = quote.from_amount * from_unit_price * ESTIMATED_SWAP_FEE_RATE;
            format!("~${:.2}", if estimate.is_finite() { estimate } else { 0.0 })
        }
    }
}
