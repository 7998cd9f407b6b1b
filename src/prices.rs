use futures_util::future::join_all;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::api::WalletBackend;
use crate::config::currencies::CurrencyCatalog;

/// Live prices older than this should be refreshed
pub const PRICE_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Unit prices by currency id, seeded with catalog reference prices
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    prices: HashMap<String, f64>,
    refreshed_at: Option<Instant>,
}

impl PriceBook {
    pub fn from_catalog(catalog: &CurrencyCatalog) -> Self {
        let prices = catalog
            .crypto
            .iter()
            .map(|meta| (meta.id.clone(), meta.price))
            .collect();
        Self {
            prices,
            refreshed_at: None,
        }
    }

    pub fn get(&self, currency_id: &str) -> Option<f64> {
        self.prices.get(currency_id).copied()
    }

    pub fn prices(&self) -> &HashMap<String, f64> {
        &self.prices
    }

    /// Merge a live update; returns how many prices were accepted
    pub fn apply(&mut self, update: &HashMap<String, f64>) -> usize {
        let accepted = sanitize_prices(update);
        let count = accepted.len();
        self.prices.extend(accepted);
        if count > 0 {
            self.refreshed_at = Some(Instant::now());
        }
        count
    }

    /// True until the first live refresh, then once the refresh interval has passed
    pub fn is_stale(&self) -> bool {
        match self.refreshed_at {
            Some(at) => at.elapsed() >= PRICE_REFRESH_INTERVAL,
            None => true,
        }
    }
}

/// Drop non-finite and non-positive prices
pub fn sanitize_prices(update: &HashMap<String, f64>) -> HashMap<String, f64> {
    update
        .iter()
        .filter(|(_, price)| price.is_finite() && **price > 0.0)
        .map(|(id, price)| (id.clone(), *price))
        .collect()
}

/// Fetch unit prices for every id concurrently. Failed lookups are logged and left out.
pub async fn fetch_unit_prices<B: WalletBackend + ?Sized>(
    backend: &B,
    currency_ids: &[String],
) -> HashMap<String, f64> {
    let lookups = currency_ids.iter().map(|id| async move {
        match backend.unit_price(id).await {
            Ok(price) => Some((id.clone(), price)),
            Err(e) => {
                log::warn!("Failed to fetch price for {}: {}", id, e);
                None
            }
        }
    });

    let fetched: HashMap<String, f64> = join_all(lookups).await.into_iter().flatten().collect();
    let prices = sanitize_prices(&fetched);
    log::info!("Fetched {} of {} unit prices", prices.len(), currency_ids.len());
    prices
}
