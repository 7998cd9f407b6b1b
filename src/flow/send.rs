//! External crypto withdrawal adapter

use serde::{Deserialize, Serialize};

use crate::api::{TransferAck, WalletBackend, WithdrawRequest};
use crate::error::{ValidationError, WalletError};
use crate::flow::validation::{ensure_balance, require_positive, resolve_chain, validate_address};
use crate::idempotency::IdempotencyKey;
use crate::wallet::WalletStore;

pub(crate) const ACTION: &str = "Send";

/// Withdrawal to an external address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Catalog id or symbol
    pub asset: String,
    pub amount: f64,
    pub to_address: String,
    /// Required for multi-chain assets, defaulted otherwise
    pub chain: Option<String>,
}

/// Validated withdrawal, ready to be sent once a passcode is supplied
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PreparedSend {
    pub symbol: String,
    pub amount: f64,
    pub to_address: String,
    pub chain: String,
}

pub(crate) fn prepare<B: WalletBackend>(
    store: &WalletStore<B>,
    request: &SendRequest,
) -> Result<PreparedSend, ValidationError> {
    let meta = store
        .catalog()
        .find_crypto(&request.asset)
        .ok_or_else(|| ValidationError::UnsupportedAsset(request.asset.to_uppercase()))?;
    require_positive(request.amount)?;
    validate_address(&request.to_address)?;
    let chain = resolve_chain(meta, request.chain.as_deref())?;
    ensure_balance(&meta.symbol, store.balance_of(&meta.id), request.amount)?;

    Ok(PreparedSend {
        symbol: meta.symbol.clone(),
        amount: request.amount,
        to_address: request.to_address.trim().to_string(),
        chain,
    })
}

pub(crate) async fn execute<B: WalletBackend + ?Sized>(
    backend: &B,
    prepared: &PreparedSend,
    passcode: &str,
    key: &IdempotencyKey,
) -> Result<TransferAck, WalletError> {
    let request = WithdrawRequest {
        currency: prepared.symbol.clone(),
        amount: prepared.amount.to_string(),
        to_address: prepared.to_address.clone(),
        passcode: passcode.to_string(),
        chain: prepared.chain.clone(),
    };
    log::info!(
        "Withdrawing {} {} on {} to {}",
        prepared.amount,
        prepared.symbol,
        prepared.chain,
        prepared.to_address
    );
    backend.withdraw(&request, key).await
}
