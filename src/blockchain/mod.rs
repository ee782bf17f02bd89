pub mod algod;
pub mod explorer;
pub mod gateway;
pub mod indexer;
pub mod price_feed;
pub mod traits;

pub use algod::AlgodClient;
pub use explorer::ExplorerLinks;
pub use gateway::ChainGateway;
pub use indexer::IndexerClient;
pub use price_feed::PriceFeedClient;
pub use traits::{Indexer, LedgerNode, PriceFeed};
