//! Client library for the HyperX custodial wallet.
//!
//! Keeps wallet state in sync with the backend, gates convert and swap
//! transfers on short-lived quotes, and makes every transfer attempt
//! idempotent. Rendering is left to the embedding shell.

pub mod api;
pub mod bank;
pub mod config;
pub mod currency;
pub mod error;
pub mod flow;
pub mod idempotency;
pub mod prices;
pub mod quote;
pub mod reconcile;
pub mod storage;
pub mod transaction;
pub mod wallet;

pub use api::{HttpBackend, WalletBackend};
pub use config::ApiConfig;
pub use error::{StorageError, TransferFailure, ValidationError, WalletError};
pub use flow::{PendingIntent, SendRequest, TransferFlow, TransferOutcome, TransferRequest};
pub use idempotency::{generate_key, IdempotencyKey};
pub use quote::{Direction, Quote, QuoteManager, QuoteState, QuoteUpdate};
pub use transaction::{TransactionKind, TransactionRecord};
pub use wallet::WalletStore;
