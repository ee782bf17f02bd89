//! CoinGecko-style price client.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::blockchain::algod::{build_http_client, error_message};
use crate::blockchain::traits::PriceFeed;
use crate::core::config::{AppConfig, PriceFeedConfig};
use crate::core::domain::PriceQuote;
use crate::core::errors::{TxFlowError, TxResult};

pub struct PriceFeedClient {
    config: PriceFeedConfig,
    http_client: HttpClient,
}

impl PriceFeedClient {
    pub fn new(config: PriceFeedConfig, timeout: Duration) -> TxResult<Self> {
        Ok(Self { config, http_client: build_http_client(timeout)? })
    }

    pub fn from_config(config: &AppConfig) -> TxResult<Self> {
        Self::new(config.price_feed.clone(), config.http.timeout())
    }
}

/// Reads `body[coin][currency]` as an exact decimal.
fn extract_price(body: &Value, coin: &str, currency: &str) -> TxResult<Decimal> {
    let number = body
        .get(coin)
        .and_then(|c| c.get(currency))
        .and_then(|p| match p {
            Value::Number(n) => Some(n),
            _ => None,
        })
        .ok_or_else(|| {
            TxFlowError::NetworkError(format!("price feed has no {}/{} quote", coin, currency))
        })?;

    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| TxFlowError::NetworkError(format!("unreadable price {}: {}", text, e)))
}

#[async_trait]
impl PriceFeed for PriceFeedClient {
    async fn current_price(&self) -> TxResult<PriceQuote> {
        let url = format!("{}/simple/price", self.config.base_url.trim_end_matches('/'));
        let response = self
            .http_client
            .get(url)
            .query(&[
                ("ids", self.config.coin_id.as_str()),
                ("vs_currencies", self.config.vs_currency.as_str()),
            ])
            .send()
            .await
            .map_err(|e| TxFlowError::NetworkError(format!("price feed request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(TxFlowError::NetworkError(format!(
                "price feed returned {}: {}",
                status, message
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TxFlowError::NetworkError(format!("cannot decode price feed: {}", e)))?;
        let price = extract_price(&body, &self.config.coin_id, &self.config.vs_currency)?;
        debug!("{} price: {} {}", self.config.coin_id, price, self.config.vs_currency);

        Ok(PriceQuote::new(price, self.config.vs_currency.clone()))
    }
}
