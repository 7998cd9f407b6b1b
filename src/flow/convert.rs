//! Crypto ⇄ fiat conversion adapter

use crate::api::{ConvertExecuteRequest, TransferAck, WalletBackend};
use crate::error::{ValidationError, WalletError};
use crate::flow::validation::{ensure_balance, require_positive};
use crate::idempotency::IdempotencyKey;
use crate::quote::{Direction, Quote, QuoteParams};
use crate::wallet::WalletStore;

pub(crate) const ACTION: &str = "Conversion";

/// Checks run before a convert intent is accepted.
///
/// Selling spends crypto, buying spends fiat; `amount` is in the spent unit.
pub(crate) fn validate<B: WalletBackend>(
    store: &WalletStore<B>,
    crypto: &str,
    fiat: &str,
    amount: f64,
    direction: Direction,
) -> Result<(), ValidationError> {
    require_positive(amount)?;
    let catalog = store.catalog();
    let meta = catalog
        .find_crypto(crypto)
        .filter(|meta| meta.convertible)
        .ok_or_else(|| ValidationError::UnsupportedAsset(crypto.to_uppercase()))?;
    let fiat_meta = catalog
        .fiat_by_code(fiat)
        .ok_or_else(|| ValidationError::UnsupportedAsset(fiat.to_uppercase()))?;

    match direction {
        Direction::Sell => ensure_balance(&meta.symbol, store.balance_of(&meta.id), amount),
        Direction::Buy => ensure_balance(&fiat_meta.code, store.fiat_balance_of(&fiat_meta.code), amount),
    }
}

pub(crate) fn quote_params(crypto: &str, fiat: &str, amount: f64, direction: Direction) -> QuoteParams {
    QuoteParams::Convert {
        crypto: crypto.trim().to_uppercase(),
        fiat: fiat.trim().to_uppercase(),
        amount,
        direction,
    }
}

pub(crate) async fn execute<B: WalletBackend + ?Sized>(
    backend: &B,
    quote: &Quote,
    key: &IdempotencyKey,
) -> Result<TransferAck, WalletError> {
    let QuoteParams::Convert {
        crypto,
        fiat,
        amount,
        direction,
    } = &quote.params
    else {
        return Err(ValidationError::QuoteMismatch.into());
    };

    let request = ConvertExecuteRequest {
        crypto: crypto.clone(),
        fiat: fiat.clone(),
        amount: *amount,
        direction: *direction,
        quote_id: quote.quote_id.clone(),
        client_ref: key.to_string(),
    };
    log::info!(
        "Executing {} {} {} against {} (quote {:?})",
        direction.as_str(),
        amount,
        crypto,
        fiat,
        quote.quote_id
    );
    backend.execute_convert(&request, key).await
}
