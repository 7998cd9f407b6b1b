//! Bank account name lookup for fiat payouts

use crate::api::{BankResolveRequest, WalletBackend};
use crate::error::{ValidationError, WalletError};
use crate::reconcile::fields::{first_str, FieldChain};

const ACCOUNT_NUMBER_LEN: usize = 10;

const ACCOUNT_NAME: FieldChain = &[
    "accountName",
    "account_name",
    "name",
    "data.accountName",
    "data.account_name",
];

/// Look up the holder name for a 10 digit account number.
///
/// Input is checked before any request; a response without a name is a rejection.
pub async fn resolve_account<B: WalletBackend + ?Sized>(
    backend: &B,
    account_number: &str,
    bank_name: &str,
) -> Result<String, WalletError> {
    let account_number = account_number.trim();
    if account_number.len() != ACCOUNT_NUMBER_LEN || !account_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidAccountNumber.into());
    }
    let bank_name = bank_name.trim();
    if bank_name.is_empty() {
        return Err(ValidationError::MissingField("bank_name").into());
    }

    let request = BankResolveRequest {
        account_number: account_number.to_string(),
        bank_name: bank_name.to_string(),
    };
    let body = backend.resolve_bank_account(&request).await?;

    match first_str(&body, ACCOUNT_NAME) {
        Some(name) => {
            log::info!("Resolved account {} at {}", account_number, bank_name);
            Ok(name)
        }
        None => {
            log::warn!("No account name in resolve response for {}", account_number);
            Err(WalletError::Rejected("Could not verify account".to_string()))
        }
    }
}
