use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

use crate::api::{ConvertQuotePayload, SwapQuotePayload};
use crate::error::ValidationError;

/// How long a quote may authorize a transfer after local receipt
pub const QUOTE_VALIDITY: Duration = Duration::from_secs(5);

/// Quiet period after the last parameter edit before a quote is fetched
pub const QUOTE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Convert direction: `Sell` is crypto to fiat, `Buy` is fiat to crypto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "buy",
            Direction::Sell => "sell",
        }
    }
}

/// What a quote is priced for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuoteParams {
    /// `amount` is in crypto units when selling, fiat units when buying
    Convert {
        crypto: String,
        fiat: String,
        amount: f64,
        direction: Direction,
    },
    Swap { from: String, to: String, amount: f64 },
}

impl QuoteParams {
    pub fn amount(&self) -> f64 {
        match self {
            QuoteParams::Convert { amount, .. } | QuoteParams::Swap { amount, .. } => *amount,
        }
    }

    /// Conditions a quote request must satisfy before it is sent
    pub fn validate(&self) -> Result<(), ValidationError> {
        let amount = self.amount();
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        match self {
            QuoteParams::Convert { crypto, fiat, .. } => {
                if crypto.trim().is_empty() {
                    return Err(ValidationError::MissingField("crypto"));
                }
                if fiat.trim().is_empty() {
                    return Err(ValidationError::MissingField("fiat"));
                }
            }
            QuoteParams::Swap { from, to, .. } => {
                if from.trim().is_empty() {
                    return Err(ValidationError::MissingField("from"));
                }
                if to.trim().is_empty() {
                    return Err(ValidationError::MissingField("to"));
                }
                if from.eq_ignore_ascii_case(to) {
                    return Err(ValidationError::SameAsset);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteFee {
    /// Spread in basis points (convert)
    Bps(f64),
    /// Absolute fee in the reference currency (swap)
    Amount(f64),
    None,
}

/// A priced quote captured at `issued_at`
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub quote_id: Option<String>,
    pub params: QuoteParams,
    pub rate: Option<f64>,
    pub from_amount: f64,
    pub to_amount: f64,
    pub fee: QuoteFee,
    pub issued_at: Instant,
}

impl Quote {
    pub fn from_convert(params: QuoteParams, payload: &ConvertQuotePayload, issued_at: Instant) -> Self {
        let direction = match &params {
            QuoteParams::Convert { direction, .. } => *direction,
            QuoteParams::Swap { .. } => Direction::Sell,
        };
        let received = match direction {
            Direction::Sell => payload.fiat_amount.as_ref(),
            Direction::Buy => payload.crypto_amount.as_ref(),
        };
        let fee = payload
            .spread_bps
            .as_ref()
            .and_then(|bps| bps.value())
            .map(QuoteFee::Bps)
            .unwrap_or(QuoteFee::None);

        Self {
            quote_id: payload.reference(),
            from_amount: params.amount(),
            to_amount: received.and_then(|v| v.value()).unwrap_or(0.0),
            rate: payload.rate.as_ref().and_then(|r| r.value()),
            fee,
            params,
            issued_at,
        }
    }

    pub fn from_swap(params: QuoteParams, payload: &SwapQuotePayload, issued_at: Instant) -> Self {
        let from_amount = params.amount();
        let to_amount = payload
            .to_amount
            .as_ref()
            .and_then(|v| v.value())
            .unwrap_or(0.0);
        let rate = payload
            .rate
            .as_ref()
            .and_then(|r| r.value())
            .or_else(|| (from_amount > 0.0).then(|| to_amount / from_amount));
        let fee = payload
            .fee_amount
            .as_ref()
            .and_then(|f| f.value())
            .map(QuoteFee::Amount)
            .unwrap_or(QuoteFee::None);

        Self {
            quote_id: payload.reference(),
            params,
            rate,
            from_amount,
            to_amount,
            fee,
            issued_at,
        }
    }

    pub fn expires_at(&self) -> Instant {
        self.issued_at + QUOTE_VALIDITY
    }

    pub fn is_valid_at(&self, now: Instant) -> bool {
        now < self.expires_at()
    }

    /// Whole seconds shown on the countdown, rounded up
    pub fn seconds_left(&self, now: Instant) -> u64 {
        let remaining = self.expires_at().saturating_duration_since(now);
        let secs = remaining.as_secs();
        if remaining.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}
