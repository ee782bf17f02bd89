use async_trait::async_trait;

use crate::core::domain::{AccountInfo, Address, Nft, PriceQuote, SignedTransaction, SuggestedParams, TxId};
use crate::core::errors::TxResult;

/// Ledger node RPC surface used by this crate.
#[async_trait]
pub trait LedgerNode: Send + Sync {
    /// Native balance and asset holdings of an account.
    async fn account_information(&self, address: &Address) -> TxResult<AccountInfo>;

    /// Fee and validity parameters for new transactions.
    async fn suggested_params(&self) -> TxResult<SuggestedParams>;

    /// Hands a signed transaction to the node's pending pool.
    ///
    /// Success means acceptance, not finality.
    async fn send_raw_transaction(&self, signed: SignedTransaction) -> TxResult<TxId>;
}

/// Indexer RPC surface used by this crate.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// NFTs currently held by `address`.
    async fn assets_owned(&self, address: &Address) -> TxResult<Vec<Nft>>;
}

/// Exchange price source for the native currency.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn current_price(&self) -> TxResult<PriceQuote>;
}
