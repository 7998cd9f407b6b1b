use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::api::{ConvertQuoteRequest, SwapQuoteRequest, WalletBackend};
use crate::error::{ValidationError, WalletError};
use crate::quote::lifecycle::{QuoteLifecycle, QuoteState, QuoteUpdate};
use crate::quote::types::{Quote, QuoteParams, QUOTE_DEBOUNCE};

const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

/// Async driver around [`QuoteLifecycle`]: debounces edits, fetches, and runs the countdown
pub struct QuoteManager<B: WalletBackend> {
    backend: Arc<B>,
    lifecycle: Arc<Mutex<QuoteLifecycle>>,
    countdown: Mutex<Option<JoinHandle<()>>>,
    debounce: Duration,
}

impl<B: WalletBackend> QuoteManager<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            lifecycle: Arc::new(Mutex::new(QuoteLifecycle::new())),
            countdown: Mutex::new(None),
            debounce: QUOTE_DEBOUNCE,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Parameters were edited: wait out the debounce window, then fetch unless superseded
    pub async fn request_quote(&self, params: QuoteParams) -> QuoteUpdate {
        self.stop_countdown().await;
        let generation = self.lifecycle.lock().await.set_params(params.clone());
        if let Err(e) = params.validate() {
            log::debug!("Skipping quote fetch: {}", e);
            return QuoteUpdate::Invalid(e);
        }

        tokio::time::sleep(self.debounce).await;
        self.fetch(generation).await
    }

    /// Manual "Refresh Rate": refetch the current parameters immediately
    pub async fn refresh(&self) -> QuoteUpdate {
        self.stop_countdown().await;
        let (generation, params) = {
            let mut lifecycle = self.lifecycle.lock().await;
            match lifecycle.restart() {
                Some(generation) => (generation, lifecycle.params().cloned()),
                None => return QuoteUpdate::Invalid(ValidationError::NoQuote),
            }
        };
        if let Some(Err(e)) = params.as_ref().map(QuoteParams::validate) {
            return QuoteUpdate::Invalid(e);
        }
        self.fetch(generation).await
    }

    async fn fetch(&self, generation: u64) -> QuoteUpdate {
        let ticket = match self.lifecycle.lock().await.begin_fetch(generation) {
            Some(ticket) => ticket,
            None => return QuoteUpdate::Superseded,
        };

        let params = ticket.params().clone();
        let result = self.fetch_quote(params).await;
        self.lifecycle.lock().await.complete(ticket, result)
    }

    async fn fetch_quote(&self, params: QuoteParams) -> Result<Quote, WalletError> {
        match &params {
            QuoteParams::Convert {
                crypto,
                fiat,
                amount,
                direction,
            } => {
                let request = ConvertQuoteRequest {
                    crypto: crypto.clone(),
                    fiat: fiat.clone(),
                    amount: *amount,
                    direction: *direction,
                };
                let payload = self.backend.convert_quote(&request).await?;
                Ok(Quote::from_convert(params, &payload, Instant::now()))
            }
            QuoteParams::Swap { from, to, amount } => {
                let request = SwapQuoteRequest {
                    from_currency: from.to_uppercase(),
                    to_currency: to.to_uppercase(),
                    from_amount: amount.to_string(),
                };
                let payload = self.backend.swap_quote(&request).await?;
                Ok(Quote::from_swap(params, &payload, Instant::now()))
            }
        }
    }

    /// Force the active quote to expire (parameter edit elsewhere, screen exit)
    pub async fn invalidate(&self) {
        self.stop_countdown().await;
        self.lifecycle.lock().await.invalidate();
    }

    /// Drop parameters and quote entirely, e.g. after a completed transfer
    pub async fn reset(&self) {
        self.stop_countdown().await;
        self.lifecycle.lock().await.reset();
    }

    pub async fn state(&self) -> QuoteState {
        self.lifecycle.lock().await.state().clone()
    }

    /// Seconds left on the active quote, if one is live
    pub async fn seconds_left(&self) -> Option<u64> {
        match self.lifecycle.lock().await.state() {
            QuoteState::Quoted(quote) => Some(quote.seconds_left(Instant::now())),
            _ => None,
        }
    }

    /// Check, at this instant, that a live quote exists and return it
    pub async fn usable_quote(&self) -> Result<Quote, ValidationError> {
        self.lifecycle
            .lock()
            .await
            .usable_quote(Instant::now())
            .cloned()
    }

    /// Start the once-per-second countdown for the quote that is active now,
    /// replacing any earlier one. Returns false when there is no live quote.
    pub async fn spawn_countdown(&self) -> bool {
        let generation = {
            let lifecycle = self.lifecycle.lock().await;
            match lifecycle.state() {
                QuoteState::Quoted(_) => lifecycle.generation(),
                _ => return false,
            }
        };
        let lifecycle = Arc::clone(&self.lifecycle);
        let worker = tokio::spawn(run_countdown(lifecycle, generation));
        if let Some(previous) = self.countdown.lock().await.replace(worker) {
            previous.abort();
        }
        true
    }

    pub async fn countdown_running(&self) -> bool {
        self.countdown
            .lock()
            .await
            .as_ref()
            .map_or(false, |worker| !worker.is_finished())
    }

    async fn stop_countdown(&self) {
        if let Some(worker) = self.countdown.lock().await.take() {
            worker.abort();
        }
    }
}

impl<B: WalletBackend> Drop for QuoteManager<B> {
    fn drop(&mut self) {
        if let Some(worker) = self.countdown.get_mut().take() {
            worker.abort();
        }
    }
}

async fn run_countdown(lifecycle: Arc<Mutex<QuoteLifecycle>>, generation: u64) {
    loop {
        tokio::time::sleep(COUNTDOWN_STEP).await;
        match lifecycle.lock().await.tick(generation, Instant::now()) {
            Some(0) | None => return,
            Some(_) => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockBackend, MockCall, MockState};
    use crate::quote::Direction;

    fn swap_backend() -> Arc<MockBackend> {
        Arc::new(MockBackend::with_state(MockState {
            swap_rate: 3500.0,
            swap_fee: Some("3.50".into()),
            ..Default::default()
        }))
    }

    fn swap(amount: f64) -> QuoteParams {
        QuoteParams::Swap { from: "eth".into(), to: "usdt".into(), amount }
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_collapses_rapid_edits() {
        let backend = swap_backend();
        let manager = Arc::new(QuoteManager::new(Arc::clone(&backend)));

        let first = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.request_quote(swap(1.0)).await })
        };
        tokio::time::sleep(Duration::from_millis(200)).await;
        let second = manager.request_quote(swap(2.0)).await;

        assert_eq!(first.await.unwrap(), QuoteUpdate::Superseded);
        assert!(matches!(second, QuoteUpdate::Quoted(ref q) if q.to_amount == 7000.0));
        assert_eq!(backend.count(|c| matches!(c, MockCall::SwapQuote(_))), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_stale_response_never_overwrites_newer() {
        let backend = swap_backend();
        backend.update(|s| {
            s.quote_delays.push_back(Duration::from_secs(3));
            s.quote_delays.push_back(Duration::from_millis(100));
        });
        let manager = Arc::new(QuoteManager::new(Arc::clone(&backend)));

        let slow = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.request_quote(swap(1.0)).await })
        };
        // let the first request pass its debounce and go on the wire
        tokio::time::sleep(Duration::from_millis(600)).await;
        let fast = manager.request_quote(swap(2.0)).await;
        assert!(matches!(fast, QuoteUpdate::Quoted(_)));

        assert_eq!(slow.await.unwrap(), QuoteUpdate::Superseded);
        match manager.state().await {
            QuoteState::Quoted(q) => assert_eq!(q.params, swap(2.0)),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_params_skip_fetch() {
        let backend = swap_backend();
        let manager = QuoteManager::new(Arc::clone(&backend));

        let update = manager
            .request_quote(QuoteParams::Swap { from: "eth".into(), to: "eth".into(), amount: 1.0 })
            .await;
        assert_eq!(update, QuoteUpdate::Invalid(ValidationError::SameAsset));
        assert!(backend.calls().is_empty());
        assert_eq!(manager.state().await, QuoteState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_moves_to_error() {
        let backend = swap_backend();
        backend.update(|s| s.quote_error = Some(WalletError::Rejected("Unable to get quote".into())));
        let manager = QuoteManager::new(Arc::clone(&backend));

        let update = manager.request_quote(swap(1.0)).await;
        assert_eq!(update, QuoteUpdate::Failed(WalletError::Rejected("Unable to get quote".into())));
        assert!(matches!(manager.state().await, QuoteState::Error(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_expires_and_refresh_restores() {
        let backend = Arc::new(MockBackend::with_state(MockState {
            convert_rate: 95_000_000.0,
            spread_bps: 100.0,
            ..Default::default()
        }));
        let manager = QuoteManager::new(Arc::clone(&backend));
        let params = QuoteParams::Convert {
            crypto: "BTC".into(),
            fiat: "NGN".into(),
            amount: 0.5,
            direction: Direction::Sell,
        };

        assert!(matches!(manager.request_quote(params).await, QuoteUpdate::Quoted(_)));
        assert_eq!(manager.seconds_left().await, Some(5));

        assert!(manager.spawn_countdown().await);
        assert!(manager.countdown_running().await);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(!manager.countdown_running().await);

        assert!(matches!(manager.state().await, QuoteState::Expired(Some(_))));
        assert_eq!(manager.usable_quote().await.unwrap_err(), ValidationError::QuoteExpired);

        // no automatic refetch happened
        assert_eq!(backend.count(|c| matches!(c, MockCall::ConvertQuote(_))), 1);

        assert!(matches!(manager.refresh().await, QuoteUpdate::Quoted(_)));
        assert!(manager.usable_quote().await.is_ok());
        assert_eq!(backend.count(|c| matches!(c, MockCall::ConvertQuote(_))), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_without_params() {
        let manager = QuoteManager::new(swap_backend());
        assert_eq!(manager.refresh().await, QuoteUpdate::Invalid(ValidationError::NoQuote));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_keeps_stale_results_out() {
        let backend = swap_backend();
        backend.update(|s| {
            s.quote_delays.extend([
                Duration::ZERO,
                Duration::from_secs(3),
                Duration::ZERO,
                Duration::from_secs(10),
            ]);
        });
        let manager = Arc::new(QuoteManager::new(Arc::clone(&backend)).with_debounce(Duration::ZERO));

        assert!(matches!(manager.request_quote(swap(1.0)).await, QuoteUpdate::Quoted(_)));
        let stale = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.request_quote(swap(2.0)).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        manager.reset().await;
        assert_eq!(manager.state().await, QuoteState::Idle);

        assert!(matches!(manager.request_quote(swap(3.0)).await, QuoteUpdate::Quoted(_)));
        let pending = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.request_quote(swap(4.0)).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(stale.await.unwrap(), QuoteUpdate::Superseded);
        assert_eq!(manager.state().await, QuoteState::Fetching);

        pending.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_stops_when_superseded_or_reset() {
        let manager = QuoteManager::new(swap_backend()).with_debounce(Duration::ZERO);
        assert!(!manager.spawn_countdown().await);

        assert!(matches!(manager.request_quote(swap(1.0)).await, QuoteUpdate::Quoted(_)));
        assert!(manager.spawn_countdown().await);
        assert!(manager.countdown_running().await);

        // a new edit replaces the quote and takes its countdown with it
        assert!(matches!(manager.request_quote(swap(2.0)).await, QuoteUpdate::Quoted(_)));
        assert!(!manager.countdown_running().await);

        assert!(manager.spawn_countdown().await);
        manager.reset().await;
        assert!(!manager.countdown_running().await);
        assert_eq!(manager.seconds_left().await, None);

        assert!(matches!(manager.request_quote(swap(3.0)).await, QuoteUpdate::Quoted(_)));
        assert!(manager.spawn_countdown().await);
        manager.invalidate().await;
        assert!(!manager.countdown_running().await);
    }
}
