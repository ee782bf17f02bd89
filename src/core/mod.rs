pub mod account_cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod portfolio;
pub mod transaction_panel;
pub mod validation;
pub mod wallet_session;

// 重新导出关键结构
pub use account_cache::{AccountDataCache, CacheEntry, CacheSnapshot, InvalidationSignal};
pub use config::AppConfig;
pub use errors::{ErrorCategory, TxFlowError, TxResult};
pub use portfolio::PortfolioSummary;
pub use transaction_panel::{Notice, PanelState, TransactionForm, TransactionKind, TransactionPanel};
pub use wallet_session::{SessionState, WalletConnector, WalletSession};
