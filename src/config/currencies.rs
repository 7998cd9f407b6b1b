use std::sync::LazyLock;
use serde::{Deserialize, Serialize};

use super::ClientProfile;

/// Static metadata for a supported crypto asset. The backend only reports balances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CryptoMeta {
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Reference unit price used until a live price arrives
    pub price: f64,
    pub chain: Option<String>,
    /// Networks the asset can be withdrawn on; more than one means the user must pick
    #[serde(default)]
    pub chains: Vec<String>,
    /// Whether the convert (crypto <-> fiat) endpoint accepts this asset
    #[serde(default)]
    pub convertible: bool,
}

impl CryptoMeta {
    pub fn is_multi_chain(&self) -> bool {
        self.chains.len() > 1
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiatMeta {
    pub code: String,
    pub name: String,
    pub symbol: String,
    /// Units of this currency per reference unit
    pub rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyCatalog {
    pub crypto: Vec<CryptoMeta>,
    #[serde(default)]
    pub fiat: Vec<FiatMeta>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    web: CurrencyCatalog,
    mobile: CurrencyCatalog,
}

// Embedded at compile time so the catalog works offline
static CURRENCIES_JSON: &str = include_str!("../../assets/currencies.json");

static CATALOGS: LazyLock<(CurrencyCatalog, CurrencyCatalog)> = LazyLock::new(|| {
    parse_catalogs_from_json(CURRENCIES_JSON)
});

fn parse_catalogs_from_json(json_str: &str) -> (CurrencyCatalog, CurrencyCatalog) {
    match serde_json::from_str::<CatalogFile>(json_str) {
        Ok(file) => {
            log::info!(
                "Loaded currency catalogs: web={} crypto/{} fiat, mobile={} crypto",
                file.web.crypto.len(),
                file.web.fiat.len(),
                file.mobile.crypto.len()
            );
            (file.web, file.mobile)
        }
        Err(e) => {
            log::error!("Failed to parse currency catalog JSON: {}", e);
            let fallback = fallback_catalog();
            (fallback.clone(), fallback)
        }
    }
}

/// Minimal catalog used when the embedded asset cannot be parsed
fn fallback_catalog() -> CurrencyCatalog {
    CurrencyCatalog {
        crypto: vec![
            CryptoMeta {
                id: "btc".to_string(),
                symbol: "BTC".to_string(),
                name: "Bitcoin".to_string(),
                price: 95000.0,
                chain: Some("bitcoin".to_string()),
                chains: Vec::new(),
                convertible: true,
            },
            CryptoMeta {
                id: "eth".to_string(),
                symbol: "ETH".to_string(),
                name: "Ethereum".to_string(),
                price: 3500.0,
                chain: Some("ethereum".to_string()),
                chains: Vec::new(),
                convertible: true,
            },
        ],
        fiat: vec![FiatMeta {
            code: "NGN".to_string(),
            name: "Nigerian Naira".to_string(),
            symbol: "₦".to_string(),
            rate: 1200.0,
        }],
    }
}

/// Catalog shipped with the given client profile
pub fn catalog_for(profile: ClientProfile) -> &'static CurrencyCatalog {
    match profile {
        ClientProfile::Web => &CATALOGS.0,
        ClientProfile::Mobile => &CATALOGS.1,
    }
}

impl CurrencyCatalog {
    pub fn new(crypto: Vec<CryptoMeta>, fiat: Vec<FiatMeta>) -> Self {
        Self { crypto, fiat }
    }

    /// Resolve a backend currency string: exact id first, then symbol or id ignoring case
    pub fn find_crypto(&self, key: &str) -> Option<&CryptoMeta> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let lowered = key.to_lowercase();
        self.crypto
            .iter()
            .find(|meta| meta.id == lowered)
            .or_else(|| {
                self.crypto.iter().find(|meta| {
                    meta.symbol.eq_ignore_ascii_case(key) || meta.id.eq_ignore_ascii_case(key)
                })
            })
    }

    pub fn crypto_by_id(&self, id: &str) -> Option<&CryptoMeta> {
        self.crypto.iter().find(|meta| meta.id.eq_ignore_ascii_case(id))
    }

    pub fn fiat_by_code(&self, code: &str) -> Option<&FiatMeta> {
        self.fiat.iter().find(|meta| meta.code.eq_ignore_ascii_case(code))
    }
}
