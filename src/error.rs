// src/error.rs
use thiserror::Error;

/// Errors surfaced by the wallet layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalletError {
    /// Network unreachable, non-2xx without a usable message, or a non-JSON body
    #[error("{0}")]
    Transport(String),
    /// Backend answered `success: false`; the message is shown verbatim
    #[error("{0}")]
    Rejected(String),
    #[error("Session expired. Please log in again.")]
    Unauthorized,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("No active wallet session")]
    NoSession,
}

impl WalletError {
    /// Business rejections and validation failures are not worth retrying as-is
    pub fn is_transport(&self) -> bool {
        matches!(self, WalletError::Transport(_))
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            WalletError::Transport(format!("Request timed out: {}", e))
        } else {
            WalletError::Transport(format!("Network error: {}", e))
        }
    }
}

/// A client-side condition that blocks submission before any network call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Amount must be greater than 0")]
    NonPositiveAmount,
    #[error("You don't have enough {symbol} (available {available}, requested {requested})")]
    InsufficientBalance {
        symbol: String,
        available: f64,
        requested: f64,
    },
    #[error("Cannot swap the same asset")]
    SameAsset,
    #[error("{0} is not supported for this operation")]
    UnsupportedAsset(String),
    #[error("Please select a network for {0}")]
    NetworkRequired(String),
    #[error("{network} is not a supported network for {symbol}")]
    UnsupportedNetwork { symbol: String, network: String },
    #[error("Please enter a valid wallet address")]
    InvalidAddress,
    #[error("Please enter your PIN to complete the transaction")]
    PasscodeRequired,
    #[error("Invalid account number. Must be 10 digits")]
    InvalidAccountNumber,
    #[error("No quote available. Please wait for the quote to load or try again.")]
    NoQuote,
    #[error("Quote expired. Refresh Rate to continue.")]
    QuoteExpired,
    #[error("Quote does not match the current amount or assets")]
    QuoteMismatch,
    #[error("No pending transaction to authorize")]
    NoPendingIntent,
}

/// Error from the local write-through cache
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct StorageError(String);

impl From<String> for StorageError {
    fn from(s: String) -> Self {
        StorageError(s)
    }
}

impl From<&str> for StorageError {
    fn from(s: &str) -> Self {
        StorageError(s.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError(format!("IO error: {}", e))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError(format!("Serialization error: {}", e))
    }
}

/// Terminal failure of a user-facing action, e.g. "Swap failed: Insufficient liquidity"
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{action} failed: {source}")]
pub struct TransferFailure {
    pub action: &'static str,
    #[source]
    pub source: WalletError,
}

impl TransferFailure {
    pub fn new(action: &'static str, source: impl Into<WalletError>) -> Self {
        Self {
            action,
            source: source.into(),
        }
    }
}
