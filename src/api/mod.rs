// src/api/mod.rs
//! Backend seam: the wallet REST API the store, quote manager and flows talk to

mod client;
mod types;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::WalletError;
use crate::idempotency::IdempotencyKey;

pub use client::HttpBackend;
pub use types::*;

/// Operations the custodial backend exposes to the client
#[async_trait]
pub trait WalletBackend: Send + Sync {
    /// Raw crypto balance rows for a user
    async fn crypto_balances(&self, user_id: &str) -> Result<Vec<RawBalance>, WalletError>;

    /// Balance for one fiat code; a missing balance field reads as zero
    async fn fiat_balance(&self, user_id: &str, currency_code: &str) -> Result<f64, WalletError>;

    /// Raw, heterogeneous transaction history records
    async fn transaction_history(&self, user_id: &str) -> Result<Vec<Value>, WalletError>;

    /// Latest unit price in the reference currency
    async fn unit_price(&self, currency_id: &str) -> Result<f64, WalletError>;

    async fn convert_quote(&self, request: &ConvertQuoteRequest) -> Result<ConvertQuotePayload, WalletError>;

    async fn swap_quote(&self, request: &SwapQuoteRequest) -> Result<SwapQuotePayload, WalletError>;

    async fn execute_convert(
        &self,
        request: &ConvertExecuteRequest,
        key: &IdempotencyKey,
    ) -> Result<TransferAck, WalletError>;

    async fn execute_swap(
        &self,
        request: &SwapExecuteRequest,
        key: &IdempotencyKey,
    ) -> Result<TransferAck, WalletError>;

    async fn withdraw(
        &self,
        request: &WithdrawRequest,
        key: &IdempotencyKey,
    ) -> Result<TransferAck, WalletError>;

    /// Look up the account holder for a bank account; returns the raw body
    async fn resolve_bank_account(&self, request: &BankResolveRequest) -> Result<Value, WalletError>;
}
