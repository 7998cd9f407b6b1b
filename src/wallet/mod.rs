// src/wallet/mod.rs
//! Wallet state store: balances, fiat balances, history and prices for one session

mod types;

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{Mutex, MutexGuard};

use crate::api::{RawBalance, WalletBackend};
use crate::config::currencies::{catalog_for, CurrencyCatalog};
use crate::config::ApiConfig;
use crate::error::WalletError;
use crate::prices::{fetch_unit_prices, sanitize_prices, PriceBook};
use crate::reconcile::reconcile;
use crate::storage::{LocalCache, CRYPTO_BALANCES_KEY, FIAT_BALANCES_KEY, TRANSACTIONS_KEY};
use crate::transaction::TransactionRecord;

pub use types::*;

#[derive(Debug, Default)]
struct WalletState {
    user_id: Option<String>,
    crypto: Vec<BalanceEntry>,
    fiat: Vec<FiatBalanceEntry>,
    transactions: Vec<TransactionRecord>,
    prices: PriceBook,
    crypto_warning: Option<String>,
    fiat_warning: Option<String>,
    history_warning: Option<String>,
}

/// Session-scoped wallet state.
///
/// Balances are only ever replaced by a backend fetch (or the cache at startup);
/// nothing here adjusts them locally.
pub struct WalletStore<B: WalletBackend> {
    backend: Arc<B>,
    catalog: CurrencyCatalog,
    cache: LocalCache,
    state: RwLock<WalletState>,
    // One gate per collection so concurrent refreshes of it share one request
    crypto_gate: Mutex<()>,
    fiat_gate: Mutex<()>,
    history_gate: Mutex<()>,
}

impl<B: WalletBackend> WalletStore<B> {
    pub fn new(backend: Arc<B>, catalog: CurrencyCatalog, cache: LocalCache) -> Self {
        let store = Self {
            backend,
            catalog,
            cache,
            state: RwLock::new(WalletState::default()),
            crypto_gate: Mutex::new(()),
            fiat_gate: Mutex::new(()),
            history_gate: Mutex::new(()),
        };
        store.reset_state();
        store
    }

    /// Store for the configured client profile, caching under the configured directory
    pub fn from_config(backend: Arc<B>, config: &ApiConfig) -> Self {
        Self::new(
            backend,
            catalog_for(config.profile).clone(),
            LocalCache::new(config.storage_dir.clone()),
        )
    }

    fn read(&self) -> RwLockReadGuard<'_, WalletState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, WalletState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn reset_state(&self) {
        let prices = PriceBook::from_catalog(&self.catalog);
        let mut state = self.write();
        *state = WalletState {
            crypto: zero_balances(&self.catalog, &prices),
            fiat: self
                .catalog
                .fiat
                .iter()
                .map(|meta| FiatBalanceEntry::new(meta, 0.0))
                .collect(),
            prices,
            ..WalletState::default()
        };
    }

    // ══════════════════════════════════════════════════════════════════════
    // Session
    // ══════════════════════════════════════════════════════════════════════

    /// Start a session: remember the user and show cached data until the first refresh
    pub fn init(&self, user_id: &str) {
        self.reset_state();

        let cached_crypto = self
            .cache
            .load::<Vec<BalanceEntry>>(CRYPTO_BALANCES_KEY)
            .unwrap_or_else(|e| {
                log::warn!("Ignoring cached balances: {}", e);
                None
            });
        let cached_fiat = self
            .cache
            .load::<Vec<FiatBalanceEntry>>(FIAT_BALANCES_KEY)
            .unwrap_or_else(|e| {
                log::warn!("Ignoring cached fiat balances: {}", e);
                None
            });
        let cached_history = self.cached_transactions();

        let mut state = self.write();
        state.user_id = Some(user_id.to_string());
        if let Some(cached) = cached_crypto {
            state.crypto = complete_balances(&self.catalog, &state.prices, &cached);
        }
        if let Some(cached) = cached_fiat {
            for entry in state.fiat.iter_mut() {
                if let Some(hit) = cached.iter().find(|c| c.code.eq_ignore_ascii_case(&entry.code)) {
                    entry.balance = clamp_balance(hit.balance);
                }
            }
        }
        if let Some(cached) = cached_history {
            state.transactions = cached;
        }
        log::info!("Wallet session started for {}", user_id);
    }

    /// End the session: drop all in-memory state and the cached collections
    pub fn teardown(&self) {
        self.reset_state();
        if let Err(e) = self.cache.clear() {
            log::error!("Failed to clear wallet cache: {}", e);
        }
        log::info!("Wallet session cleared");
    }

    pub fn user_id(&self) -> Option<String> {
        self.read().user_id.clone()
    }

    fn require_user(&self) -> Result<String, WalletError> {
        self.user_id().ok_or(WalletError::NoSession)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Snapshots
    // ══════════════════════════════════════════════════════════════════════

    pub fn catalog(&self) -> &CurrencyCatalog {
        &self.catalog
    }

    pub fn crypto_balances(&self) -> Vec<BalanceEntry> {
        self.read().crypto.clone()
    }

    pub fn fiat_balances(&self) -> Vec<FiatBalanceEntry> {
        self.read().fiat.clone()
    }

    pub fn transactions(&self) -> Vec<TransactionRecord> {
        self.read().transactions.clone()
    }

    /// Current crypto balance for an asset id, zero when unknown
    pub fn balance_of(&self, asset_id: &str) -> f64 {
        self.read()
            .crypto
            .iter()
            .find(|entry| entry.id.eq_ignore_ascii_case(asset_id))
            .map_or(0.0, |entry| entry.balance)
    }

    pub fn fiat_balance_of(&self, code: &str) -> f64 {
        self.read()
            .fiat
            .iter()
            .find(|entry| entry.code.eq_ignore_ascii_case(code))
            .map_or(0.0, |entry| entry.balance)
    }

    pub fn unit_price(&self, asset_id: &str) -> f64 {
        self.read().prices.get(asset_id).unwrap_or(0.0)
    }

    pub fn prices_are_stale(&self) -> bool {
        self.read().prices.is_stale()
    }

    /// Σ balance × unit price over crypto entries
    pub fn total_valuation(&self) -> f64 {
        self.read().crypto.iter().map(BalanceEntry::value).sum()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Refresh
    // ══════════════════════════════════════════════════════════════════════

    /// Replace crypto balances from the backend. Never fails: on error every
    /// known currency is shown at zero and a warning is returned.
    pub async fn refresh_crypto_balances(&self, user_id: &str) -> Refresh<Vec<BalanceEntry>> {
        self.crypto_refresh(user_id, RefreshMode::Shared).await
    }

    async fn crypto_refresh(&self, user_id: &str, mode: RefreshMode) -> Refresh<Vec<BalanceEntry>> {
        let Some(_guard) = acquire_gate(&self.crypto_gate, mode).await else {
            let state = self.read();
            return Refresh {
                data: state.crypto.clone(),
                warning: state.crypto_warning.clone(),
            };
        };

        let fetched = self.backend.crypto_balances(user_id).await;
        let mut state = self.write();
        let (entries, warning) = match fetched {
            Ok(rows) => {
                let entries = merge_balances(&self.catalog, &state.prices, &rows);
                log::info!("Loaded {} balance rows into {} entries", rows.len(), entries.len());
                if let Err(e) = self.cache.save(CRYPTO_BALANCES_KEY, &entries) {
                    log::warn!("Failed to cache balances: {}", e);
                }
                (entries, None)
            }
            Err(e) => {
                log::error!("Failed to fetch wallet balances: {}", e);
                (
                    zero_balances(&self.catalog, &state.prices),
                    Some(format!("Could not fetch wallet balances. Using default values. ({})", e)),
                )
            }
        };
        state.crypto = entries.clone();
        state.crypto_warning = warning.clone();
        Refresh { data: entries, warning }
    }

    /// Fetch each supported fiat balance in turn; a failure zeroes only that entry
    pub async fn refresh_fiat_balances(&self, user_id: &str) -> Refresh<Vec<FiatBalanceEntry>> {
        self.fiat_refresh(user_id, RefreshMode::Shared).await
    }

    async fn fiat_refresh(&self, user_id: &str, mode: RefreshMode) -> Refresh<Vec<FiatBalanceEntry>> {
        let Some(_guard) = acquire_gate(&self.fiat_gate, mode).await else {
            let state = self.read();
            return Refresh {
                data: state.fiat.clone(),
                warning: state.fiat_warning.clone(),
            };
        };

        let mut entries = Vec::with_capacity(self.catalog.fiat.len());
        let mut failed = Vec::new();
        for meta in &self.catalog.fiat {
            let balance = match self.backend.fiat_balance(user_id, &meta.code).await {
                Ok(balance) => balance,
                Err(e) => {
                    log::warn!("Failed to fetch {} balance: {}", meta.code, e);
                    failed.push(meta.code.clone());
                    0.0
                }
            };
            entries.push(FiatBalanceEntry::new(meta, balance));
        }

        let warning = if failed.is_empty() {
            if let Err(e) = self.cache.save(FIAT_BALANCES_KEY, &entries) {
                log::warn!("Failed to cache fiat balances: {}", e);
            }
            None
        } else {
            Some(format!("Could not fetch {} balance", failed.join(", ")))
        };

        let mut state = self.write();
        state.fiat = entries.clone();
        state.fiat_warning = warning.clone();
        Refresh { data: entries, warning }
    }

    /// Replace history from the backend, falling back to the cached records on error
    pub async fn refresh_transactions(&self, user_id: &str) -> Refresh<Vec<TransactionRecord>> {
        self.history_refresh(user_id, RefreshMode::Shared).await
    }

    async fn history_refresh(&self, user_id: &str, mode: RefreshMode) -> Refresh<Vec<TransactionRecord>> {
        let Some(_guard) = acquire_gate(&self.history_gate, mode).await else {
            let state = self.read();
            return Refresh {
                data: state.transactions.clone(),
                warning: state.history_warning.clone(),
            };
        };

        let (records, warning) = match self.backend.transaction_history(user_id).await {
            Ok(raw) => {
                let prices = self.read().prices.prices().clone();
                let records = reconcile(&raw, &self.catalog, &prices);
                if let Err(e) = self.cache.save(TRANSACTIONS_KEY, &records) {
                    log::warn!("Failed to cache transactions: {}", e);
                }
                (records, None)
            }
            Err(e) => {
                log::error!("Failed to fetch transaction history: {}", e);
                let cached = self.cached_transactions().unwrap_or_default();
                log::info!("Using {} cached transactions", cached.len());
                (
                    cached,
                    Some(format!("Could not fetch transaction history. Showing saved activity. ({})", e)),
                )
            }
        };

        let mut state = self.write();
        state.transactions = records.clone();
        state.history_warning = warning.clone();
        Refresh { data: records, warning }
    }

    fn cached_transactions(&self) -> Option<Vec<TransactionRecord>> {
        match self.cache.load::<Vec<TransactionRecord>>(TRANSACTIONS_KEY) {
            Ok(records) => records,
            Err(e) => {
                log::error!("Failed to parse cached transactions: {}", e);
                None
            }
        }
    }

    /// Refresh prices when stale, then balances, fiat and history concurrently
    pub async fn refresh_all(&self) -> Result<RefreshSummary, WalletError> {
        let user_id = self.require_user()?;
        if self.prices_are_stale() {
            self.refresh_prices().await;
        }

        let (crypto, fiat, history) = tokio::join!(
            self.refresh_crypto_balances(&user_id),
            self.refresh_fiat_balances(&user_id),
            self.refresh_transactions(&user_id),
        );
        Ok(RefreshSummary {
            warnings: [crypto.warning, fiat.warning, history.warning]
                .into_iter()
                .flatten()
                .collect(),
        })
    }

    /// After a transfer settles: balances first, then history.
    ///
    /// Each collection is fetched anew even when a refresh is already in flight,
    /// since that one may have been answered before the transfer landed.
    pub async fn refresh_after_transfer(&self) -> Result<RefreshSummary, WalletError> {
        let user_id = self.require_user()?;
        let crypto = self.crypto_refresh(&user_id, RefreshMode::Fresh).await;
        let fiat = self.fiat_refresh(&user_id, RefreshMode::Fresh).await;
        let history = self.history_refresh(&user_id, RefreshMode::Fresh).await;
        Ok(RefreshSummary {
            warnings: [crypto.warning, fiat.warning, history.warning]
                .into_iter()
                .flatten()
                .collect(),
        })
    }

    /// Fetch live unit prices for every catalog asset and apply them
    pub async fn refresh_prices(&self) -> usize {
        let ids: Vec<String> = self.catalog.crypto.iter().map(|meta| meta.id.clone()).collect();
        let prices = fetch_unit_prices(self.backend.as_ref(), &ids).await;
        self.apply_price_update(&prices)
    }

    /// Replace unit prices on matching entries. Balances are untouched.
    pub fn apply_price_update(&self, update: &HashMap<String, f64>) -> usize {
        let accepted = sanitize_prices(update);
        let mut state = self.write();
        state.prices.apply(&accepted);

        let mut updated = 0;
        for entry in state.crypto.iter_mut() {
            if let Some(price) = accepted.get(&entry.id) {
                log::debug!("{}: {} -> {}", entry.symbol, entry.unit_price, price);
                entry.unit_price = *price;
                updated += 1;
            }
        }
        updated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshMode {
    /// Join a refresh already in flight instead of issuing another request
    Shared,
    /// Wait out any refresh in flight, then fetch again
    Fresh,
}

/// `Some(guard)` when this caller should run the refresh; `None` once an
/// in-flight refresh it joined has finished
async fn acquire_gate(gate: &Mutex<()>, mode: RefreshMode) -> Option<MutexGuard<'_, ()>> {
    if mode == RefreshMode::Fresh {
        return Some(gate.lock().await);
    }
    match gate.try_lock() {
        Ok(guard) => Some(guard),
        Err(_) => {
            log::debug!("Refresh already in flight, joining it");
            drop(gate.lock().await);
            None
        }
    }
}

fn zero_balances(catalog: &CurrencyCatalog, prices: &PriceBook) -> Vec<BalanceEntry> {
    catalog
        .crypto
        .iter()
        .map(|meta| BalanceEntry::zero(meta, prices.get(&meta.id).unwrap_or(meta.price)))
        .collect()
}

/// One entry per catalog currency, filled from whichever backend rows resolve to it
fn merge_balances(catalog: &CurrencyCatalog, prices: &PriceBook, rows: &[RawBalance]) -> Vec<BalanceEntry> {
    let mut by_id: HashMap<&str, &RawBalance> = HashMap::new();
    for row in rows {
        match catalog.find_crypto(&row.currency) {
            Some(meta) => {
                by_id.entry(meta.id.as_str()).or_insert(row);
            }
            None => log::debug!("Ignoring balance for unsupported currency {}", row.currency),
        }
    }

    catalog
        .crypto
        .iter()
        .map(|meta| {
            let price = prices.get(&meta.id).unwrap_or(meta.price);
            match by_id.get(meta.id.as_str()) {
                Some(row) => BalanceEntry::new(
                    meta,
                    row.balance_formatted.as_ref().and_then(|b| b.value()).unwrap_or(0.0),
                    price,
                    row.address.clone(),
                ),
                None => BalanceEntry::zero(meta, price),
            }
        })
        .collect()
}

/// Cached entries mapped back onto the catalog so no currency goes missing
fn complete_balances(catalog: &CurrencyCatalog, prices: &PriceBook, cached: &[BalanceEntry]) -> Vec<BalanceEntry> {
    catalog
        .crypto
        .iter()
        .map(|meta| {
            let price = prices.get(&meta.id).unwrap_or(meta.price);
            match cached.iter().find(|entry| entry.id == meta.id) {
                Some(entry) => BalanceEntry::new(meta, entry.balance, price, entry.address.clone()),
                None => BalanceEntry::zero(meta, price),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockBackend, MockCall, MockState};
    use crate::api::FlexNumber;
    use crate::config::ClientProfile;
    use serde_json::json;
    use std::time::Duration;

    fn row(currency: &str, balance: &str) -> RawBalance {
        RawBalance {
            currency: currency.to_string(),
            balance_formatted: Some(FlexNumber::Text(balance.to_string())),
            address: None,
        }
    }

    fn store_with(state: MockState, dir: &std::path::Path) -> (Arc<MockBackend>, WalletStore<MockBackend>) {
        let backend = Arc::new(MockBackend::with_state(state));
        let store = WalletStore::new(
            Arc::clone(&backend),
            catalog_for(ClientProfile::Web).clone(),
            LocalCache::new(dir),
        );
        (backend, store)
    }

    #[tokio::test]
    async fn test_every_known_currency_has_an_entry() {
        let dir = tempfile::tempdir().unwrap();
        let known = catalog_for(ClientProfile::Web).crypto.len();

        let (backend, store) = store_with(MockState::default(), dir.path());
        let refresh = store.refresh_crypto_balances("u1").await;
        assert_eq!(refresh.data.len(), known);
        assert!(refresh.data.iter().all(|e| e.balance == 0.0));
        assert!(refresh.warning.is_none());

        backend.update(|s| s.balances = Ok(vec![row("BTC", "0.5"), row("eth", "-3"), row("xrp", "9")]));
        let refresh = store.refresh_crypto_balances("u1").await;
        assert_eq!(refresh.data.len(), known);
        assert_eq!(store.balance_of("btc"), 0.5);
        assert_eq!(store.balance_of("eth"), 0.0);
        assert_eq!(store.balance_of("sol"), 0.0);

        backend.update(|s| s.balances = Err(WalletError::Transport("Network error".into())));
        let refresh = store.refresh_crypto_balances("u1").await;
        assert_eq!(refresh.data.len(), known);
        assert!(refresh.is_fallback());
        assert!(refresh.data.iter().all(|e| e.balance == 0.0));
    }

    #[tokio::test]
    async fn test_fiat_failure_zeroes_only_that_code() {
        let dir = tempfile::tempdir().unwrap();
        let mut fiat = HashMap::new();
        fiat.insert("NGN".to_string(), Ok(250_000.0));
        fiat.insert("ZAR".to_string(), Err(WalletError::Transport("timeout".into())));
        fiat.insert("GHS".to_string(), Ok(40.0));
        let (backend, store) = store_with(MockState { fiat, ..Default::default() }, dir.path());

        let refresh = store.refresh_fiat_balances("u1").await;
        assert_eq!(refresh.data.len(), 4);
        assert_eq!(store.fiat_balance_of("NGN"), 250_000.0);
        assert_eq!(store.fiat_balance_of("ZAR"), 0.0);
        assert_eq!(store.fiat_balance_of("GHS"), 40.0);
        assert!(refresh.warning.unwrap().contains("ZAR"));

        // one request per code, in catalog order
        let codes: Vec<MockCall> = backend.calls();
        assert_eq!(
            codes,
            vec![
                MockCall::FiatBalance("NGN".into()),
                MockCall::FiatBalance("ZAR".into()),
                MockCall::FiatBalance("GHS".into()),
                MockCall::FiatBalance("KES".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_history_falls_back_to_cache() {
        let dir = tempfile::tempdir().unwrap();
        let history = vec![json!({"id": "t1", "type": "receive", "currency": "btc", "amount": "0.1"})];
        let (backend, store) = store_with(
            MockState {
                history: Ok(history),
                ..Default::default()
            },
            dir.path(),
        );

        let first = store.refresh_transactions("u1").await;
        assert_eq!(first.data.len(), 1);
        assert_eq!(first.data[0].computed_value, 9_500.0);

        backend.update(|s| s.history = Err(WalletError::Transport("Network error".into())));
        let second = store.refresh_transactions("u1").await;
        assert!(second.is_fallback());
        assert_eq!(second.data, first.data);
    }

    #[tokio::test]
    async fn test_price_update_leaves_balances_alone() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = store_with(
            MockState {
                balances: Ok(vec![row("btc", "0.5"), row("eth", "2")]),
                ..Default::default()
            },
            dir.path(),
        );
        store.refresh_crypto_balances("u1").await;
        assert_eq!(store.total_valuation(), 0.5 * 95_000.0 + 2.0 * 3_500.0);

        let mut update = HashMap::new();
        update.insert("btc".to_string(), 100_000.0);
        update.insert("doge".to_string(), 0.2);
        update.insert("eth".to_string(), f64::NAN);
        assert_eq!(store.apply_price_update(&update), 1);

        assert_eq!(store.balance_of("btc"), 0.5);
        assert_eq!(store.unit_price("btc"), 100_000.0);
        assert_eq!(store.unit_price("eth"), 3_500.0);
        assert_eq!(store.total_valuation(), 0.5 * 100_000.0 + 2.0 * 3_500.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refreshes_share_one_request() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, store) = store_with(
            MockState {
                balances: Ok(vec![row("btc", "1")]),
                balance_delay: Duration::from_secs(1),
                ..Default::default()
            },
            dir.path(),
        );

        let (a, b) = tokio::join!(
            store.refresh_crypto_balances("u1"),
            store.refresh_crypto_balances("u1")
        );
        assert_eq!(a.data, b.data);
        assert_eq!(backend.count(|c| matches!(c, MockCall::CryptoBalances(_))), 1);

        // once settled, the next trigger fetches again
        store.refresh_crypto_balances("u1").await;
        assert_eq!(backend.count(|c| matches!(c, MockCall::CryptoBalances(_))), 2);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let (_, store) = store_with(
            MockState {
                balances: Ok(vec![row("sol", "12")]),
                history: Ok(vec![json!({"id": "t1", "type": "send", "currency": "sol", "amount": 1})]),
                ..Default::default()
            },
            dir.path(),
        );

        assert_eq!(store.refresh_all().await.unwrap_err(), WalletError::NoSession);

        store.init("u1");
        let summary = store.refresh_all().await.unwrap();
        assert!(summary.warnings.iter().all(|w| !w.contains("balances")));
        assert_eq!(store.balance_of("sol"), 12.0);

        // a fresh store over the same cache shows the cached data immediately
        let (_, reopened) = store_with(MockState::default(), dir.path());
        reopened.init("u1");
        assert_eq!(reopened.balance_of("sol"), 12.0);
        assert_eq!(reopened.transactions().len(), 1);

        reopened.teardown();
        assert!(reopened.user_id().is_none());
        assert_eq!(reopened.balance_of("sol"), 0.0);
        assert!(!dir.path().join("crypto_wallet.json").exists());
    }

    #[tokio::test]
    async fn test_post_transfer_refresh_order() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, store) = store_with(MockState::default(), dir.path());
        store.init("u1");
        store.refresh_after_transfer().await.unwrap();

        let calls = backend.calls();
        assert!(matches!(calls.first(), Some(MockCall::CryptoBalances(_))));
        assert!(matches!(calls.last(), Some(MockCall::History(_))));
        assert_eq!(calls.len(), 1 + 4 + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_post_transfer_refresh_does_not_join_earlier_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let (backend, store) = store_with(
            MockState {
                balances: Ok(vec![row("btc", "1")]),
                balance_delay: Duration::from_secs(2),
                ..Default::default()
            },
            dir.path(),
        );
        let store = Arc::new(store);
        store.init("u1");

        let manual = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.refresh_crypto_balances("u1").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // the transfer settled while the manual refresh was on the wire
        backend.update(|s| s.balances = Ok(vec![row("btc", "0.4")]));
        store.refresh_after_transfer().await.unwrap();
        manual.await.unwrap();

        assert_eq!(backend.count(|c| matches!(c, MockCall::CryptoBalances(_))), 2);
        assert_eq!(store.balance_of("btc"), 0.4);
    }
}
