// Wire types for the wallet REST API
// Field names follow the backend's camelCase JSON

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::quote::Direction;

/// A number the backend sends either as a JSON number or as a decimal string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlexNumber {
    Number(f64),
    Text(String),
}

impl FlexNumber {
    /// Finite numeric value, `None` when the text does not parse
    pub fn value(&self) -> Option<f64> {
        let parsed = match self {
            FlexNumber::Number(n) => Some(*n),
            FlexNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        parsed.filter(|v| v.is_finite())
    }
}

/// Read a `FlexNumber` out of an arbitrary JSON value
pub fn flex_value(value: &Value) -> Option<f64> {
    serde_json::from_value::<FlexNumber>(value.clone())
        .ok()
        .and_then(|n| n.value())
}

// ══════════════════════════════════════════════════════════════════════════════
// Balances
// ══════════════════════════════════════════════════════════════════════════════

/// One row of `GET /v1/wallet/balances/{userId}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBalance {
    pub currency: String,
    #[serde(rename = "balanceFormatted", default)]
    pub balance_formatted: Option<FlexNumber>,
    #[serde(default)]
    pub address: Option<String>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Quotes
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertQuoteRequest {
    pub crypto: String,
    pub fiat: String,
    pub amount: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertQuotePayload {
    #[serde(default)]
    pub quote_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rate: Option<FlexNumber>,
    #[serde(default)]
    pub crypto_amount: Option<FlexNumber>,
    #[serde(default)]
    pub fiat_amount: Option<FlexNumber>,
    #[serde(default)]
    pub spread_bps: Option<FlexNumber>,
}

impl ConvertQuotePayload {
    pub fn reference(&self) -> Option<String> {
        self.quote_id.clone().or_else(|| self.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuoteRequest {
    pub from_currency: String,
    pub to_currency: String,
    pub from_amount: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuotePayload {
    #[serde(default)]
    pub quote_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub rate: Option<FlexNumber>,
    #[serde(default)]
    pub to_amount: Option<FlexNumber>,
    #[serde(default)]
    pub fee_amount: Option<FlexNumber>,
}

impl SwapQuotePayload {
    pub fn reference(&self) -> Option<String> {
        self.quote_id.clone().or_else(|| self.id.clone())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Mutating requests (all carry an Idempotency-Key header)
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertExecuteRequest {
    pub crypto: String,
    pub fiat: String,
    pub amount: f64,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    pub client_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapExecuteRequest {
    pub user_id: String,
    pub from_currency: String,
    pub to_currency: String,
    pub from_amount: String,
    pub quote_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub currency: String,
    pub amount: String,
    pub to_address: String,
    pub passcode: String,
    pub chain: String,
}

/// Backend acknowledgement of a mutating request
#[derive(Debug, Clone, PartialEq)]
pub struct TransferAck {
    pub message: Option<String>,
    pub reference: Option<String>,
    pub raw: Value,
}

impl TransferAck {
    pub fn from_body(body: Value) -> Self {
        let message = body.get("message").and_then(Value::as_str).map(str::to_string);
        let reference = ["id", "transactionId", "txHash", "reference"]
            .iter()
            .find_map(|field| {
                body.get("data")
                    .and_then(|data| data.get(*field))
                    .or_else(|| body.get(*field))
                    .and_then(|v| match v {
                        Value::String(s) if !s.is_empty() => Some(s.clone()),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
            });
        Self { message, reference, raw: body }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Bank resolution and auth
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankResolveRequest {
    pub account_number: String,
    pub bank_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}
