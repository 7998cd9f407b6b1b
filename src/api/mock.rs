//! Scriptable in-memory backend for tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::api::types::*;
use crate::api::WalletBackend;
use crate::error::WalletError;
use crate::idempotency::IdempotencyKey;

#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    CryptoBalances(String),
    FiatBalance(String),
    History(String),
    UnitPrice(String),
    ConvertQuote(ConvertQuoteRequest),
    SwapQuote(SwapQuoteRequest),
    ExecuteConvert(ConvertExecuteRequest, IdempotencyKey),
    ExecuteSwap(SwapExecuteRequest, IdempotencyKey),
    Withdraw(WithdrawRequest, IdempotencyKey),
    ResolveBank(BankResolveRequest),
}

pub struct MockState {
    pub balances: Result<Vec<RawBalance>, WalletError>,
    pub fiat: HashMap<String, Result<f64, WalletError>>,
    pub history: Result<Vec<Value>, WalletError>,
    pub prices: HashMap<String, Result<f64, WalletError>>,
    /// Fiat units per crypto unit quoted for converts
    pub convert_rate: f64,
    pub spread_bps: f64,
    /// Destination units per source unit quoted for swaps
    pub swap_rate: f64,
    pub swap_fee: Option<String>,
    /// Returned instead of a quote while set
    pub quote_error: Option<WalletError>,
    /// Per-call latency for quote requests, consumed front to back
    pub quote_delays: VecDeque<Duration>,
    /// Per-call latency for balance requests
    pub balance_delay: Duration,
    /// Latency for mutating calls
    pub execute_delay: Duration,
    /// Outcomes for mutating calls, consumed front to back; empty means success
    pub execute_results: VecDeque<Result<TransferAck, WalletError>>,
    pub bank: Result<Value, WalletError>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            balances: Ok(Vec::new()),
            fiat: HashMap::new(),
            history: Ok(Vec::new()),
            prices: HashMap::new(),
            convert_rate: 0.0,
            spread_bps: 0.0,
            swap_rate: 0.0,
            swap_fee: None,
            quote_error: None,
            quote_delays: VecDeque::new(),
            balance_delay: Duration::ZERO,
            execute_delay: Duration::ZERO,
            execute_results: VecDeque::new(),
            bank: Ok(Value::Null),
        }
    }
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: MockState) -> Self {
        Self {
            state: Mutex::new(state),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mutate the scripted state between steps of a test
    pub fn update(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Idempotency keys of every mutating call, in order
    pub fn idempotency_keys(&self) -> Vec<IdempotencyKey> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::ExecuteConvert(_, key)
                | MockCall::ExecuteSwap(_, key)
                | MockCall::Withdraw(_, key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.calls().iter().filter(|call| pred(call)).count()
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn next_quote_delay(&self) -> Duration {
        self.state
            .lock()
            .unwrap()
            .quote_delays
            .pop_front()
            .unwrap_or(Duration::ZERO)
    }

    async fn next_execute_result(&self) -> Result<TransferAck, WalletError> {
        let delay = self.state.lock().unwrap().execute_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.state
            .lock()
            .unwrap()
            .execute_results
            .pop_front()
            .unwrap_or_else(|| Ok(TransferAck::from_body(serde_json::json!({"success": true}))))
    }
}

#[async_trait]
impl WalletBackend for MockBackend {
    async fn crypto_balances(&self, user_id: &str) -> Result<Vec<RawBalance>, WalletError> {
        self.record(MockCall::CryptoBalances(user_id.to_string()));
        let delay = self.state.lock().unwrap().balance_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.state.lock().unwrap().balances.clone()
    }

    async fn fiat_balance(&self, _user_id: &str, currency_code: &str) -> Result<f64, WalletError> {
        self.record(MockCall::FiatBalance(currency_code.to_string()));
        self.state
            .lock()
            .unwrap()
            .fiat
            .get(currency_code)
            .cloned()
            .unwrap_or(Ok(0.0))
    }

    async fn transaction_history(&self, user_id: &str) -> Result<Vec<Value>, WalletError> {
        self.record(MockCall::History(user_id.to_string()));
        self.state.lock().unwrap().history.clone()
    }

    async fn unit_price(&self, currency_id: &str) -> Result<f64, WalletError> {
        self.record(MockCall::UnitPrice(currency_id.to_string()));
        self.state
            .lock()
            .unwrap()
            .prices
            .get(currency_id)
            .cloned()
            .unwrap_or_else(|| Err(WalletError::Transport(format!("Invalid rate for {}", currency_id))))
    }

    async fn convert_quote(&self, request: &ConvertQuoteRequest) -> Result<ConvertQuotePayload, WalletError> {
        self.record(MockCall::ConvertQuote(request.clone()));
        let delay = self.next_quote_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock().unwrap();
        if let Some(err) = &state.quote_error {
            return Err(err.clone());
        }
        let fiat_amount = request.amount * state.convert_rate;
        Ok(ConvertQuotePayload {
            quote_id: Some(format!("cq-{}", request.amount)),
            id: None,
            rate: Some(FlexNumber::Number(state.convert_rate)),
            crypto_amount: Some(FlexNumber::Number(request.amount / state.convert_rate)),
            fiat_amount: Some(FlexNumber::Number(fiat_amount)),
            spread_bps: Some(FlexNumber::Number(state.spread_bps)),
        })
    }

    async fn swap_quote(&self, request: &SwapQuoteRequest) -> Result<SwapQuotePayload, WalletError> {
        self.record(MockCall::SwapQuote(request.clone()));
        let delay = self.next_quote_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock().unwrap();
        if let Some(err) = &state.quote_error {
            return Err(err.clone());
        }
        let amount: f64 = request.from_amount.parse().unwrap_or(0.0);
        Ok(SwapQuotePayload {
            quote_id: Some(format!("sq-{}", request.from_amount)),
            id: None,
            rate: None,
            to_amount: Some(FlexNumber::Text((amount * state.swap_rate).to_string())),
            fee_amount: state.swap_fee.clone().map(FlexNumber::Text),
        })
    }

    async fn execute_convert(
        &self,
        request: &ConvertExecuteRequest,
        key: &IdempotencyKey,
    ) -> Result<TransferAck, WalletError> {
        self.record(MockCall::ExecuteConvert(request.clone(), key.clone()));
        self.next_execute_result().await
    }

    async fn execute_swap(
        &self,
        request: &SwapExecuteRequest,
        key: &IdempotencyKey,
    ) -> Result<TransferAck, WalletError> {
        self.record(MockCall::ExecuteSwap(request.clone(), key.clone()));
        self.next_execute_result().await
    }

    async fn withdraw(
        &self,
        request: &WithdrawRequest,
        key: &IdempotencyKey,
    ) -> Result<TransferAck, WalletError> {
        self.record(MockCall::Withdraw(request.clone(), key.clone()));
        self.next_execute_result().await
    }

    async fn resolve_bank_account(&self, request: &BankResolveRequest) -> Result<Value, WalletError> {
        self.record(MockCall::ResolveBank(request.clone()));
        self.state.lock().unwrap().bank.clone()
    }
}
