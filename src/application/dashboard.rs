//! Application-level container wiring the dashboard components together.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::blockchain::{
    AlgodClient, ChainGateway, ExplorerLinks, Indexer, IndexerClient, LedgerNode, PriceFeed,
    PriceFeedClient,
};
use crate::core::account_cache::{AccountDataCache, InvalidationSignal};
use crate::core::config::AppConfig;
use crate::core::errors::TxResult;
use crate::core::portfolio::PortfolioSummary;
use crate::core::transaction_panel::TransactionPanel;
use crate::core::wallet_session::{WalletConnector, WalletSession};

/// One dashboard session: a wallet session, the account cache following
/// it, and the transaction panel writing through both.
pub struct Dashboard {
    session: Arc<WalletSession>,
    cache: Arc<AccountDataCache>,
    panel: TransactionPanel,
    explorer: ExplorerLinks,
    reference_price: Decimal,
}

impl Dashboard {
    /// Wires the components over already constructed remote clients.
    pub fn new(
        config: &AppConfig,
        node: Arc<dyn LedgerNode>,
        indexer: Arc<dyn Indexer>,
        price_feed: Arc<dyn PriceFeed>,
        connector: Arc<dyn WalletConnector>,
    ) -> Self {
        let gateway = Arc::new(ChainGateway::new(Arc::clone(&node), config.chain.clone()));
        let session = Arc::new(WalletSession::new(connector));
        let cache = Arc::new(AccountDataCache::new(node, indexer, price_feed));
        let invalidation: Arc<dyn InvalidationSignal> = cache.clone();
        let panel = TransactionPanel::new(gateway, Arc::clone(&session), invalidation);

        Self {
            session,
            cache,
            panel,
            explorer: ExplorerLinks::from_config(config),
            reference_price: config.price_feed.reference_price,
        }
    }

    /// Builds the HTTP clients described by `config`.
    pub fn from_config(config: &AppConfig, connector: Arc<dyn WalletConnector>) -> TxResult<Self> {
        config.validate()?;
        let node = Arc::new(AlgodClient::from_config(config)?);
        let indexer = Arc::new(IndexerClient::from_config(config)?);
        let price_feed = Arc::new(PriceFeedClient::from_config(config)?);
        info!("✅ Dashboard configured for {}", config.network.name);
        Ok(Self::new(config, node, indexer, price_feed, connector))
    }

    /// Starts keeping the account cache in step with the session. The task
    /// ends when the dashboard is dropped.
    pub fn start(&self) -> JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        tokio::spawn(cache.follow(self.session.subscribe()))
    }

    pub fn session(&self) -> &Arc<WalletSession> {
        &self.session
    }

    pub fn cache(&self) -> &Arc<AccountDataCache> {
        &self.cache
    }

    pub fn panel(&self) -> &TransactionPanel {
        &self.panel
    }

    pub fn explorer(&self) -> &ExplorerLinks {
        &self.explorer
    }

    pub fn portfolio(&self) -> PortfolioSummary {
        PortfolioSummary::from_snapshot(&self.cache.snapshot(), self.reference_price)
    }
}
