//! Indexer REST client
//!
//! Resolves which of an account's holdings are NFTs and fetches their
//! display metadata.

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::blockchain::algod::{build_http_client, error_message};
use crate::blockchain::traits::Indexer;
use crate::core::config::AppConfig;
use crate::core::domain::{Address, AssetId, Nft};
use crate::core::errors::{TxFlowError, TxResult};

const INDEXER_TOKEN_HEADER: &str = "X-Indexer-API-Token";
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 8;

pub struct IndexerClient {
    base_url: String,
    token: Option<String>,
    lookup_concurrency: usize,
    http_client: HttpClient,
}

#[derive(Debug, Deserialize)]
struct AccountAssetsResponse {
    #[serde(default)]
    assets: Vec<IndexedHolding>,
    #[serde(rename = "next-token")]
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndexedHolding {
    #[serde(rename = "asset-id")]
    asset_id: u64,
    amount: u64,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    asset: IndexedAsset,
}

#[derive(Debug, Deserialize)]
struct IndexedAsset {
    index: u64,
    params: AssetParams,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssetParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "unit-name", default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub total: u64,
    #[serde(default)]
    pub decimals: u32,
}

impl AssetParams {
    /// Pure NFTs have a total of 1 with no decimals; fractional NFTs split
    /// exactly one whole unit (total == 10^decimals).
    pub(crate) fn is_nft(&self) -> bool {
        10u64
            .checked_pow(self.decimals)
            .map(|whole_unit| self.total == whole_unit)
            .unwrap_or(false)
    }
}

impl IndexerClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TxResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            http_client: build_http_client(timeout)?,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Caps how many asset lookups are in flight at once.
    pub fn with_lookup_concurrency(mut self, limit: usize) -> Self {
        self.lookup_concurrency = limit.max(1);
        self
    }

    pub fn from_config(config: &AppConfig) -> TxResult<Self> {
        let client = Self::new(config.network.indexer_url.clone(), config.http.timeout())?
            .with_lookup_concurrency(config.http.max_concurrent_lookups);
        Ok(match &config.network.indexer_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.header(INDEXER_TOKEN_HEADER, token),
            None => req,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> TxResult<T> {
        self.get_optional_json(path, query)
            .await?
            .ok_or_else(|| TxFlowError::NetworkError(format!("indexer returned 404 for {}", path)))
    }

    /// Like `get_json`, but a 404 is `Ok(None)`.
    async fn get_optional_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> TxResult<Option<T>> {
        let response = self
            .authorize(self.http_client.get(format!("{}{}", self.base_url, path)).query(query))
            .send()
            .await
            .map_err(|e| TxFlowError::NetworkError(format!("indexer request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(TxFlowError::NetworkError(format!(
                "indexer returned {} for {}: {}",
                status, path, message
            )));
        }
        response
            .json()
            .await
            .map(Some)
            .map_err(|e| TxFlowError::NetworkError(format!("cannot decode indexer response: {}", e)))
    }

    /// Asset ids the account holds a positive, non-deleted balance of.
    async fn held_asset_ids(&self, address: &Address) -> TxResult<Vec<u64>> {
        let path = format!("/v2/accounts/{}/assets", address);
        let mut ids = Vec::new();
        let mut next: Option<String> = None;

        loop {
            let page: AccountAssetsResponse = match next.as_deref() {
                Some(token) => self.get_json(&path, &[("next", token)]).await?,
                None => self.get_json(&path, &[]).await?,
            };
            ids.extend(
                page.assets
                    .iter()
                    .filter(|h| h.amount > 0 && !h.deleted)
                    .map(|h| h.asset_id),
            );
            match page.next_token {
                Some(token) if !token.is_empty() && !page.assets.is_empty() => next = Some(token),
                _ => break,
            }
        }
        Ok(ids)
    }

    /// `None` when the indexer no longer knows the asset.
    async fn asset_params(&self, asset_id: u64) -> TxResult<Option<IndexedAsset>> {
        let response: Option<AssetResponse> =
            self.get_optional_json(&format!("/v2/assets/{}", asset_id), &[]).await?;
        if response.is_none() {
            warn!("Asset {} not found on the indexer; skipping", asset_id);
        }
        Ok(response.map(|r| r.asset))
    }
}

#[async_trait]
impl Indexer for IndexerClient {
    async fn assets_owned(&self, address: &Address) -> TxResult<Vec<Nft>> {
        let ids = self.held_asset_ids(address).await?;
        debug!("{} holds {} assets with a balance", address.short(), ids.len());

        let assets: Vec<Option<IndexedAsset>> = stream::iter(ids)
            .map(|id| self.asset_params(id))
            .buffered(self.lookup_concurrency)
            .try_collect()
            .await?;

        let nfts: Vec<Nft> = assets
            .into_iter()
            .flatten()
            .filter(|asset| asset.params.is_nft())
            .filter_map(|asset| {
                let id = AssetId::new(asset.index as i64).ok()?;
                Some(Nft {
                    id,
                    name: asset.params.name.unwrap_or_default(),
                    unit_name: asset.params.unit_name.unwrap_or_default(),
                    url: asset.params.url.filter(|u| !u.is_empty()),
                })
            })
            .collect();

        info!("Found {} NFTs for {}", nfts.len(), address.short());
        Ok(nfts)
    }
}
