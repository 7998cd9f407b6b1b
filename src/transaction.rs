// src/transaction.rs
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::api::flex_value;

/// Canonical transaction kind. The backend's own label is kept in `raw_type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Send,
    Receive,
    Convert,
    Swap,
    Interaction,
    Approval,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TransactionKind {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "send" | "withdraw" | "withdrawal" => TransactionKind::Send,
            "receive" | "deposit" => TransactionKind::Receive,
            "convert" => TransactionKind::Convert,
            "swap" => TransactionKind::Swap,
            "interaction" => TransactionKind::Interaction,
            "approval" => TransactionKind::Approval,
            _ => TransactionKind::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Send => "Send",
            TransactionKind::Receive => "Receive",
            TransactionKind::Convert => "Convert",
            TransactionKind::Swap => "Swap",
            TransactionKind::Interaction => "Interaction",
            TransactionKind::Approval => "Approval",
            TransactionKind::Unknown => "Transaction",
        }
    }

    /// Convert and swap records carry a from/to pair
    pub fn is_exchange(&self) -> bool {
        matches!(self, TransactionKind::Convert | TransactionKind::Swap)
    }
}

/// Both sides of a convert or swap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionLeg {
    pub from_asset_id: Option<String>,
    pub to_asset_id: Option<String>,
    pub from_symbol: Option<String>,
    pub to_symbol: Option<String>,
    pub from_amount: f64,
    pub to_amount: f64,
    pub from_raw_amount: Option<String>,
    pub to_raw_amount: Option<String>,
}

/// One history entry in canonical shape.
///
/// Records are produced by the reconciliation mapper and never mutated afterwards.
/// `computed_value` is always finite and non-negative; direction is carried by `kind`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub kind: TransactionKind,
    pub raw_type: Option<String>,
    pub asset_id: Option<String>,
    pub symbol: Option<String>,
    pub amount: f64,
    pub raw_amount: Option<String>,
    pub counterparty_address: Option<String>,
    /// ISO-8601 as sent by the backend
    pub timestamp: Option<String>,
    #[serde(deserialize_with = "finite_or_zero")]
    pub computed_value: f64,
    pub status: Option<String>,
    pub tx_hash: Option<String>,
    pub direction: Option<String>,
    pub category: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub created_at: Option<String>,
    pub time_ago: Option<String>,
    pub metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion: Option<ConversionLeg>,
}

// Cached records written by older builds may carry strings, nulls or NaN here
fn finite_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(flex_value(&value).map(f64::abs).unwrap_or(0.0))
}

/// Two-line amount rendering used by history rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountLine {
    pub primary: String,
    pub secondary: String,
}

impl TransactionRecord {
    /// e.g. "Convert BTC to NGN", "Send BTC"
    pub fn title(&self) -> String {
        let base = match (self.kind, &self.raw_type) {
            (TransactionKind::Unknown, Some(raw)) if !raw.trim().is_empty() => capitalize(raw.trim()),
            (kind, _) => kind.label().to_string(),
        };

        if self.kind.is_exchange() {
            let leg = self.conversion.clone().unwrap_or_default();
            return format!(
                "{} {} to {}",
                base,
                leg.from_symbol.unwrap_or_default(),
                leg.to_symbol.unwrap_or_default()
            );
        }

        match &self.symbol {
            Some(symbol) if !symbol.is_empty() => format!("{} {}", base, symbol),
            _ => base,
        }
    }

    pub fn amount_line(&self) -> AmountLine {
        let symbol = self.symbol.clone().unwrap_or_default();
        let value = format!("${:.2}", self.computed_value);
        match self.kind {
            TransactionKind::Send => AmountLine {
                primary: format!("-{} {}", self.amount.abs(), symbol),
                secondary: value,
            },
            TransactionKind::Receive => AmountLine {
                primary: format!("+{} {}", self.amount.abs(), symbol),
                secondary: value,
            },
            TransactionKind::Convert | TransactionKind::Swap => {
                let leg = self.conversion.clone().unwrap_or_default();
                AmountLine {
                    primary: format!("+{:.4} {}", leg.to_amount, leg.to_symbol.unwrap_or_default()),
                    secondary: format!("-{} {}", leg.from_amount, leg.from_symbol.unwrap_or_default()),
                }
            }
            TransactionKind::Interaction | TransactionKind::Approval => AmountLine {
                primary: symbol,
                secondary: String::new(),
            },
            TransactionKind::Unknown => AmountLine {
                primary: format!("{} {}", self.amount, symbol),
                secondary: value,
            },
        }
    }
}

/// Shorten long chain addresses to `0x1234...abcd`; internal transfer labels lose their prefix
pub fn format_address(address: &str) -> String {
    if let Some(rest) = address.strip_prefix("Internal: ") {
        return rest.to_string();
    }
    let chars: Vec<char> = address.chars().collect();
    if chars.len() > 20 {
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        return format!("{}...{}", head, tail);
    }
    address.to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(kind: TransactionKind) -> TransactionRecord {
        TransactionRecord {
            id: "t1".into(),
            kind,
            symbol: Some("BTC".into()),
            amount: -0.25,
            computed_value: 23_750.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_kind_from_raw() {
        assert_eq!(TransactionKind::from_raw("withdraw"), TransactionKind::Send);
        assert_eq!(TransactionKind::from_raw("Deposit"), TransactionKind::Receive);
        assert_eq!(TransactionKind::from_raw("swap"), TransactionKind::Swap);
        assert_eq!(TransactionKind::from_raw("stake"), TransactionKind::Unknown);
    }

    #[test]
    fn test_titles() {
        assert_eq!(record(TransactionKind::Send).title(), "Send BTC");

        let mut convert = record(TransactionKind::Convert);
        convert.conversion = Some(ConversionLeg {
            from_symbol: Some("BTC".into()),
            to_symbol: Some("NGN".into()),
            ..Default::default()
        });
        assert_eq!(convert.title(), "Convert BTC to NGN");

        let mut unknown = record(TransactionKind::Unknown);
        unknown.raw_type = Some("stake".into());
        unknown.symbol = None;
        assert_eq!(unknown.title(), "Stake");
    }

    #[test]
    fn test_amount_lines_carry_sign_by_kind() {
        let send = record(TransactionKind::Send).amount_line();
        assert_eq!(send.primary, "-0.25 BTC");
        assert_eq!(send.secondary, "$23750.00");

        let receive = record(TransactionKind::Receive).amount_line();
        assert_eq!(receive.primary, "+0.25 BTC");

        let mut swap = record(TransactionKind::Swap);
        swap.conversion = Some(ConversionLeg {
            from_symbol: Some("ETH".into()),
            to_symbol: Some("USDT".into()),
            from_amount: 2.0,
            to_amount: 7000.0,
            ..Default::default()
        });
        let line = swap.amount_line();
        assert_eq!(line.primary, "+7000.0000 USDT");
        assert_eq!(line.secondary, "-2 ETH");
    }

    #[test]
    fn test_format_address() {
        assert_eq!(format_address("Internal: savings"), "savings");
        assert_eq!(format_address("0x1234567890abcdef1234567890abcdef"), "0x1234...cdef");
        assert_eq!(format_address("short"), "short");
    }

    #[test]
    fn test_cached_record_values_are_revalidated() {
        let records: Vec<TransactionRecord> = serde_json::from_value(json!([
            {"id": "a", "kind": "send", "computedValue": "12.5"},
            {"id": "b", "kind": "bridge", "computedValue": null},
            {"id": "c"}
        ]))
        .unwrap();

        assert_eq!(records[0].computed_value, 12.5);
        assert_eq!(records[1].kind, TransactionKind::Unknown);
        assert_eq!(records[1].computed_value, 0.0);
        assert_eq!(records[2].computed_value, 0.0);
    }
}
