// src/flow/mod.rs
//! Transfer flows: one controller for convert, swap and send.
//!
//! A flow walks an intent through `submit` (validation, quote check, key minting)
//! and `authorize` (passcode, execution, post-transfer refresh). The idempotency
//! key minted at submit is reused on every authorization attempt of that intent.

mod convert;
mod send;
mod swap;
mod validation;

pub use send::SendRequest;
pub use validation::{default_chain, resolve_chain, validate_address};

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::api::{TransferAck, WalletBackend};
use crate::error::{TransferFailure, ValidationError, WalletError};
use crate::idempotency::{generate_key, IdempotencyKey};
use crate::quote::{Direction, Quote, QuoteManager, QuoteParams, QuoteUpdate};
use crate::wallet::WalletStore;

/// A user-initiated transfer
#[derive(Debug, Clone, PartialEq)]
pub enum TransferRequest {
    /// `amount` is crypto when selling, fiat when buying
    Convert {
        crypto: String,
        fiat: String,
        amount: f64,
        direction: Direction,
    },
    Swap {
        from: String,
        to: String,
        amount: f64,
    },
    Send(SendRequest),
}

impl TransferRequest {
    /// Name used in failure and success messages
    pub fn action(&self) -> &'static str {
        match self {
            TransferRequest::Convert { .. } => convert::ACTION,
            TransferRequest::Swap { .. } => swap::ACTION,
            TransferRequest::Send(_) => send::ACTION,
        }
    }

    pub fn needs_quote(&self) -> bool {
        !matches!(self, TransferRequest::Send(_))
    }
}

/// The intent awaiting authorization
#[derive(Debug, Clone, PartialEq)]
pub struct PendingIntent {
    pub request: TransferRequest,
    /// Quote the intent was confirmed against; `None` for sends
    pub quote: Option<Quote>,
    pub idempotency_key: IdempotencyKey,
    /// Authorization attempts made so far
    pub attempts: u32,
}

/// Acknowledged transfer
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub action: &'static str,
    pub message: String,
    pub reference: Option<String>,
    pub idempotency_key: IdempotencyKey,
    /// Notices from the post-transfer refresh
    pub warnings: Vec<String>,
    pub raw: Value,
}

impl TransferOutcome {
    fn new(action: &'static str, ack: TransferAck, key: IdempotencyKey, warnings: Vec<String>) -> Self {
        Self {
            action,
            message: ack
                .message
                .unwrap_or_else(|| format!("{} successful", action)),
            reference: ack.reference,
            idempotency_key: key,
            warnings,
            raw: ack.raw,
        }
    }
}

/// Controller for one transfer screen. Owns the quote manager and at most one pending intent.
pub struct TransferFlow<B: WalletBackend> {
    backend: Arc<B>,
    store: Arc<WalletStore<B>>,
    quotes: QuoteManager<B>,
    pending: Mutex<Option<PendingIntent>>,
}

impl<B: WalletBackend> TransferFlow<B> {
    pub fn new(backend: Arc<B>, store: Arc<WalletStore<B>>) -> Self {
        Self {
            quotes: QuoteManager::new(Arc::clone(&backend)),
            backend,
            store,
            pending: Mutex::new(None),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.quotes = self.quotes.with_debounce(debounce);
        self
    }

    pub fn quotes(&self) -> &QuoteManager<B> {
        &self.quotes
    }

    pub fn store(&self) -> &WalletStore<B> {
        &self.store
    }

    pub async fn pending(&self) -> Option<PendingIntent> {
        self.pending.lock().await.clone()
    }

    fn quote_params(&self, request: &TransferRequest) -> Option<QuoteParams> {
        match request {
            TransferRequest::Convert {
                crypto,
                fiat,
                amount,
                direction,
            } => Some(convert::quote_params(crypto, fiat, *amount, *direction)),
            TransferRequest::Swap { from, to, amount } => {
                Some(swap::quote_params(self.store.catalog(), from, to, *amount))
            }
            TransferRequest::Send(_) => None,
        }
    }

    /// Amount or asset edited: debounce, fetch, and start the countdown on success
    pub async fn request_quote(&self, request: &TransferRequest) -> QuoteUpdate {
        let Some(params) = self.quote_params(request) else {
            return QuoteUpdate::Invalid(ValidationError::NoQuote);
        };
        let update = self.quotes.request_quote(params).await;
        if matches!(update, QuoteUpdate::Quoted(_)) {
            self.quotes.spawn_countdown().await;
        }
        update
    }

    /// "Refresh Rate"
    pub async fn refresh_quote(&self) -> QuoteUpdate {
        let update = self.quotes.refresh().await;
        if matches!(update, QuoteUpdate::Quoted(_)) {
            self.quotes.spawn_countdown().await;
        }
        update
    }

    fn validate(&self, request: &TransferRequest) -> Result<(), ValidationError> {
        match request {
            TransferRequest::Convert {
                crypto,
                fiat,
                amount,
                direction,
            } => convert::validate(&self.store, crypto, fiat, *amount, *direction),
            TransferRequest::Swap { from, to, amount } => swap::validate(&self.store, from, to, *amount),
            TransferRequest::Send(details) => send::prepare(&self.store, details).map(|_| ()),
        }
    }

    /// The live quote, provided it was priced for exactly this request
    async fn matching_quote(&self, request: &TransferRequest) -> Result<Option<Quote>, ValidationError> {
        let Some(params) = self.quote_params(request) else {
            return Ok(None);
        };
        let quote = self.quotes.usable_quote().await?;
        if quote.params != params {
            return Err(ValidationError::QuoteMismatch);
        }
        Ok(Some(quote))
    }

    /// Confirm a transfer and move it to the passcode step.
    ///
    /// Resubmitting the same request keeps the pending intent's key; any other
    /// request replaces the intent with a fresh key.
    pub async fn submit(&self, request: TransferRequest) -> Result<PendingIntent, TransferFailure> {
        let action = request.action();
        self.validate(&request)
            .map_err(|e| TransferFailure::new(action, e))?;
        let quote = self
            .matching_quote(&request)
            .await
            .map_err(|e| TransferFailure::new(action, e))?;

        let mut pending = self.pending.lock().await;
        let intent = match pending.take() {
            Some(existing) if existing.request == request => PendingIntent { quote, ..existing },
            _ => {
                let key = generate_key();
                log::info!("New {} intent {}", action, key);
                PendingIntent {
                    request,
                    quote,
                    idempotency_key: key,
                    attempts: 0,
                }
            }
        };
        *pending = Some(intent.clone());
        Ok(intent)
    }

    /// Execute the pending intent with the captured passcode.
    ///
    /// The quote is re-checked first, so an intent confirmed on a quote that
    /// has since expired is blocked here without a network call. On failure the
    /// intent and its key are kept for another attempt. The intent lock is not
    /// held while the backend call runs, so [`cancel`](Self::cancel) stays
    /// responsive.
    pub async fn authorize(&self, passcode: &str) -> Result<TransferOutcome, TransferFailure> {
        let (intent, user_id) = {
            let mut pending = self.pending.lock().await;
            let Some(intent) = pending.as_mut() else {
                return Err(TransferFailure::new("Transfer", ValidationError::NoPendingIntent));
            };
            let action = intent.request.action();

            validation::require_passcode(passcode).map_err(|e| TransferFailure::new(action, e))?;
            intent.quote = self
                .matching_quote(&intent.request)
                .await
                .map_err(|e| TransferFailure::new(action, e))?;
            let user_id = self
                .store
                .user_id()
                .ok_or_else(|| TransferFailure::new(action, WalletError::NoSession))?;
            intent.attempts += 1;
            (intent.clone(), user_id)
        };
        let action = intent.request.action();
        let key = intent.idempotency_key.clone();
        log::info!("{} attempt {} with key {}", action, intent.attempts, key);

        let result = match (&intent.request, intent.quote.as_ref()) {
            (TransferRequest::Convert { .. }, Some(quote)) => {
                convert::execute(self.backend.as_ref(), quote, &key).await
            }
            (TransferRequest::Swap { .. }, Some(quote)) => {
                swap::execute(self.backend.as_ref(), &user_id, quote, &key).await
            }
            (TransferRequest::Send(details), _) => match send::prepare(&self.store, details) {
                Ok(prepared) => send::execute(self.backend.as_ref(), &prepared, passcode, &key).await,
                Err(e) => Err(e.into()),
            },
            (_, None) => Err(ValidationError::NoQuote.into()),
        };

        let ack = match result {
            Ok(ack) => ack,
            Err(e) => {
                log::error!("{} failed: {}", action, e);
                return Err(TransferFailure::new(action, e));
            }
        };

        {
            let mut pending = self.pending.lock().await;
            // cancelled or replaced while the call was out: leave the newer intent alone
            if pending.as_ref().map(|p| &p.idempotency_key) == Some(&key) {
                *pending = None;
            }
        }
        self.quotes.reset().await;

        let warnings = match self.store.refresh_after_transfer().await {
            Ok(summary) => summary.warnings,
            Err(e) => vec![e.to_string()],
        };
        log::info!("{} completed with key {}", action, key);
        Ok(TransferOutcome::new(action, ack, key, warnings))
    }

    /// Close the passcode step: drop the intent and its key. No network call.
    pub async fn cancel(&self) -> bool {
        let cancelled = self.pending.lock().await.take();
        if let Some(intent) = &cancelled {
            log::info!("Cancelled {} intent {}", intent.request.action(), intent.idempotency_key);
        }
        cancelled.is_some()
    }
}
