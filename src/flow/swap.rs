//! Crypto ⇄ crypto swap adapter

use crate::api::{SwapExecuteRequest, TransferAck, WalletBackend};
use crate::config::currencies::CurrencyCatalog;
use crate::error::{ValidationError, WalletError};
use crate::flow::validation::{ensure_balance, require_positive};
use crate::idempotency::IdempotencyKey;
use crate::quote::{Quote, QuoteParams};
use crate::wallet::WalletStore;

pub(crate) const ACTION: &str = "Swap";

pub(crate) fn validate<B: WalletBackend>(
    store: &WalletStore<B>,
    from: &str,
    to: &str,
    amount: f64,
) -> Result<(), ValidationError> {
    require_positive(amount)?;
    let catalog = store.catalog();
    let from_meta = catalog
        .find_crypto(from)
        .ok_or_else(|| ValidationError::UnsupportedAsset(from.to_uppercase()))?;
    let to_meta = catalog
        .find_crypto(to)
        .ok_or_else(|| ValidationError::UnsupportedAsset(to.to_uppercase()))?;
    if from_meta.id == to_meta.id {
        return Err(ValidationError::SameAsset);
    }
    ensure_balance(&from_meta.symbol, store.balance_of(&from_meta.id), amount)
}

/// Sides are carried as catalog ids so quote and execute name the same assets
pub(crate) fn quote_params(catalog: &CurrencyCatalog, from: &str, to: &str, amount: f64) -> QuoteParams {
    let resolve = |key: &str| {
        catalog
            .find_crypto(key)
            .map(|meta| meta.id.clone())
            .unwrap_or_else(|| key.trim().to_lowercase())
    };
    QuoteParams::Swap {
        from: resolve(from),
        to: resolve(to),
        amount,
    }
}

pub(crate) async fn execute<B: WalletBackend + ?Sized>(
    backend: &B,
    user_id: &str,
    quote: &Quote,
    key: &IdempotencyKey,
) -> Result<TransferAck, WalletError> {
    let QuoteParams::Swap { from, to, amount } = &quote.params else {
        return Err(ValidationError::QuoteMismatch.into());
    };

    let request = SwapExecuteRequest {
        user_id: user_id.to_string(),
        from_currency: from.to_uppercase(),
        to_currency: to.to_uppercase(),
        from_amount: amount.to_string(),
        quote_id: quote.quote_id.clone(),
    };
    log::info!("Executing swap {} {} -> {} (quote {:?})", amount, from, to, quote.quote_id);
    backend.execute_swap(&request, key).await
}
