use crate::config::currencies::CryptoMeta;
use crate::error::ValidationError;

const MIN_ADDRESS_LEN: usize = 10;

pub(crate) fn require_positive(amount: f64) -> Result<(), ValidationError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAmount)
    }
}

pub(crate) fn ensure_balance(symbol: &str, available: f64, requested: f64) -> Result<(), ValidationError> {
    if requested > available {
        return Err(ValidationError::InsufficientBalance {
            symbol: symbol.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

pub(crate) fn require_passcode(passcode: &str) -> Result<(), ValidationError> {
    if passcode.trim().is_empty() {
        return Err(ValidationError::PasscodeRequired);
    }
    Ok(())
}

/// Destination must be present and plausibly long
pub fn validate_address(address: &str) -> Result<(), ValidationError> {
    let address = address.trim();
    if address.is_empty() || address.chars().count() < MIN_ADDRESS_LEN {
        return Err(ValidationError::InvalidAddress);
    }
    Ok(())
}

/// Withdrawal network used when the asset has a single one
pub fn default_chain(symbol: &str) -> &'static str {
    match symbol.to_uppercase().as_str() {
        "BTC" => "bitcoin",
        "SOL" => "solana",
        _ => "ethereum",
    }
}

/// Network for a withdrawal. Multi-chain assets need an explicit pick from their list.
pub fn resolve_chain(meta: &CryptoMeta, requested: Option<&str>) -> Result<String, ValidationError> {
    let requested = requested.map(str::trim).filter(|c| !c.is_empty());

    if meta.is_multi_chain() {
        let Some(chain) = requested else {
            return Err(ValidationError::NetworkRequired(meta.symbol.clone()));
        };
        return meta
            .chains
            .iter()
            .find(|c| c.eq_ignore_ascii_case(chain))
            .cloned()
            .ok_or_else(|| ValidationError::UnsupportedNetwork {
                symbol: meta.symbol.clone(),
                network: chain.to_string(),
            });
    }

    Ok(requested
        .map(str::to_string)
        .unwrap_or_else(|| default_chain(&meta.symbol).to_string()))
}
