use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::core::errors::{TxFlowError, TxResult};

/// Ledger node, indexer and explorer endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "NetworkConfig::default_name")]
    pub name: String,
    #[serde(default = "NetworkConfig::default_algod_url")]
    pub algod_url: String,
    /// Sent as `X-Algo-API-Token` when present.
    #[serde(default)]
    pub algod_token: Option<String>,
    #[serde(default = "NetworkConfig::default_indexer_url")]
    pub indexer_url: String,
    #[serde(default)]
    pub indexer_token: Option<String>,
    #[serde(default = "NetworkConfig::default_explorer_url")]
    pub explorer_url: String,
}

impl NetworkConfig {
    fn default_name() -> String { "testnet".to_string() }
    fn default_algod_url() -> String { "https://testnet-api.algonode.cloud".to_string() }
    fn default_indexer_url() -> String { "https://testnet-idx.algonode.cloud".to_string() }
    fn default_explorer_url() -> String { "https://testnet.algoexplorer.io".to_string() }

    pub fn testnet() -> Self {
        Self {
            name: Self::default_name(),
            algod_url: Self::default_algod_url(),
            algod_token: None,
            indexer_url: Self::default_indexer_url(),
            indexer_token: None,
            explorer_url: Self::default_explorer_url(),
        }
    }

    pub fn mainnet() -> Self {
        Self {
            name: "mainnet".to_string(),
            algod_url: "https://mainnet-api.algonode.cloud".to_string(),
            algod_token: None,
            indexer_url: "https://mainnet-idx.algonode.cloud".to_string(),
            indexer_token: None,
            explorer_url: "https://algoexplorer.io".to_string(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

/// Exchange price source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    #[serde(default = "PriceFeedConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "PriceFeedConfig::default_coin_id")]
    pub coin_id: String,
    #[serde(default = "PriceFeedConfig::default_vs_currency")]
    pub vs_currency: String,
    /// Baseline for the portfolio change indicator.
    #[serde(default = "PriceFeedConfig::default_reference_price")]
    pub reference_price: Decimal,
}

impl PriceFeedConfig {
    fn default_base_url() -> String { "https://api.coingecko.com/api/v3".to_string() }
    fn default_coin_id() -> String { "algorand".to_string() }
    fn default_vs_currency() -> String { "usd".to_string() }
    fn default_reference_price() -> Decimal { Decimal::new(30, 2) }
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            coin_id: Self::default_coin_id(),
            vs_currency: Self::default_vs_currency(),
            reference_price: Self::default_reference_price(),
        }
    }
}

/// Chain rules applied while building transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Rounds between first and last valid round.
    #[serde(default = "ChainConfig::default_validity_window")]
    pub validity_window: u64,
    #[serde(default = "ChainConfig::default_max_note_bytes")]
    pub max_note_bytes: usize,
}

impl ChainConfig {
    fn default_validity_window() -> u64 { 1000 }
    fn default_max_note_bytes() -> usize { 1024 }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            validity_window: Self::default_validity_window(),
            max_note_bytes: Self::default_max_note_bytes(),
        }
    }
}

/// Transport settings for the HTTP clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "HttpConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on concurrent per-asset indexer lookups.
    #[serde(default = "HttpConfig::default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,
}

impl HttpConfig {
    fn default_timeout_secs() -> u64 { 30 }
    fn default_max_concurrent_lookups() -> usize { 8 }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout_secs(),
            max_concurrent_lookups: Self::default_max_concurrent_lookups(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub price_feed: PriceFeedConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl AppConfig {
    pub fn testnet() -> Self {
        Self::default()
    }

    pub fn mainnet() -> Self {
        Self { network: NetworkConfig::mainnet(), ..Self::default() }
    }

    /// Parses a TOML document; missing sections fall back to testnet defaults.
    pub fn from_toml_str(content: &str) -> TxResult<Self> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML file from disk.
    pub fn load(path: impl AsRef<Path>) -> TxResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TxFlowError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config for network {} from {}", config.network.name, path.display());
        Ok(config)
    }

    /// Overrides endpoints from `ALGOD_URL`, `ALGOD_TOKEN`, `INDEXER_URL`,
    /// `INDEXER_TOKEN`, `PRICE_FEED_URL` and `EXPLORER_URL`.
    pub fn apply_env_overrides(mut self) -> TxResult<Self> {
        if let Ok(url) = std::env::var("ALGOD_URL") {
            self.network.algod_url = url;
        }
        if let Ok(token) = std::env::var("ALGOD_TOKEN") {
            self.network.algod_token = Some(token);
        }
        if let Ok(url) = std::env::var("INDEXER_URL") {
            self.network.indexer_url = url;
        }
        if let Ok(token) = std::env::var("INDEXER_TOKEN") {
            self.network.indexer_token = Some(token);
        }
        if let Ok(url) = std::env::var("PRICE_FEED_URL") {
            self.price_feed.base_url = url;
        }
        if let Ok(url) = std::env::var("EXPLORER_URL") {
            self.network.explorer_url = url;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> TxResult<()> {
        let urls = [
            ("network.algod_url", &self.network.algod_url),
            ("network.indexer_url", &self.network.indexer_url),
            ("network.explorer_url", &self.network.explorer_url),
            ("price_feed.base_url", &self.price_feed.base_url),
        ];
        for (field, url) in urls {
            if url.trim().is_empty() {
                return Err(TxFlowError::ConfigError(format!("{} must not be empty", field)));
            }
        }
        if self.chain.validity_window == 0 {
            return Err(TxFlowError::ConfigError(
                "chain.validity_window must be at least 1".to_string(),
            ));
        }
        if self.http.timeout_secs == 0 {
            return Err(TxFlowError::ConfigError("http.timeout_secs must be at least 1".to_string()));
        }
        if self.http.max_concurrent_lookups == 0 {
            return Err(TxFlowError::ConfigError(
                "http.max_concurrent_lookups must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
