//! Ledger node (algod) REST client.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::blockchain::traits::LedgerNode;
use crate::core::config::AppConfig;
use crate::core::domain::{AccountInfo, Address, SignedTransaction, SuggestedParams, TxId};
use crate::core::errors::{TxFlowError, TxResult};

pub(crate) const API_TOKEN_HEADER: &str = "X-Algo-API-Token";

/// algod REST client
pub struct AlgodClient {
    base_url: String,
    token: Option<String>,
    http_client: HttpClient,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(rename = "txId")]
    tx_id: String,
}

/// Body of algod error responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

/// Builds the shared HTTP client with the transport-level timeout.
pub(crate) fn build_http_client(timeout: Duration) -> TxResult<HttpClient> {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TxFlowError::ConfigError(format!("cannot build HTTP client: {}", e)))
}

/// Best-effort extraction of a `message` field from an error body.
pub(crate) async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) => serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or_else(|_| if body.is_empty() { status.to_string() } else { body }),
        Err(_) => status.to_string(),
    }
}

impl AlgodClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TxResult<Self> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http_client: build_http_client(timeout)?,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn from_config(config: &AppConfig) -> TxResult<Self> {
        let client = Self::new(config.network.algod_url.clone(), config.http.timeout())?;
        Ok(match &config.network.algod_token {
            Some(token) => client.with_token(token.clone()),
            None => client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.header(API_TOKEN_HEADER, token),
            None => req,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> TxResult<T> {
        let response = self
            .authorize(self.http_client.get(self.url(path)))
            .send()
            .await
            .map_err(|e| TxFlowError::NetworkError(format!("algod request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(TxFlowError::NetworkError(format!(
                "algod returned {} for {}: {}",
                status, path, message
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TxFlowError::NetworkError(format!("cannot decode algod response: {}", e)))
    }
}

#[async_trait]
impl LedgerNode for AlgodClient {
    async fn account_information(&self, address: &Address) -> TxResult<AccountInfo> {
        debug!("Querying account {}", address.short());
        self.get_json(&format!("/v2/accounts/{}", address)).await
    }

    async fn suggested_params(&self) -> TxResult<SuggestedParams> {
        self.get_json("/v2/transactions/params").await
    }

    async fn send_raw_transaction(&self, signed: SignedTransaction) -> TxResult<TxId> {
        info!("Submitting signed transaction ({} bytes)", signed.len());

        let response = self
            .authorize(self.http_client.post(self.url("/v2/transactions")))
            .header(reqwest::header::CONTENT_TYPE, "application/x-binary")
            .body(signed.into_bytes())
            .send()
            .await
            .map_err(|e| TxFlowError::NetworkError(format!("algod request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let message = error_message(response).await;
            warn!("Node rejected transaction: {}", message);
            return Err(TxFlowError::RejectedByLedger(message));
        }
        if !status.is_success() {
            let message = error_message(response).await;
            return Err(TxFlowError::NetworkError(format!(
                "algod returned {} on submit: {}",
                status, message
            )));
        }

        let body: SubmitResponse = response
            .json()
            .await
            .map_err(|e| TxFlowError::NetworkError(format!("cannot decode submit response: {}", e)))?;

        info!("✅ Transaction accepted into pending pool: {}", body.tx_id);
        Ok(TxId(body.tx_id))
    }
}
