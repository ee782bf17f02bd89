use thiserror::Error;

/// Error type shared by every transaction and portfolio flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxFlowError {
    /// Local validation failure. Never reaches the network or the signer.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Wallet not connected")]
    NotConnected,

    /// A connect or submit flow is already running.
    #[error("Operation already in progress")]
    AlreadyInProgress,

    /// The user declined in the external wallet (pairing or signature).
    #[error("Rejected by user: {0}")]
    UserRejected(String),

    #[error("Signer error: {0}")]
    SignerError(String),

    /// Transport failure talking to the node, indexer or price feed.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The node refused the transaction (missing opt-in, overspend, ...).
    #[error("Rejected by ledger: {0}")]
    RejectedByLedger(String),

    /// Configuration loading failure.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// User-facing grouping of failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// "Fix your form"
    Input,
    /// Wallet connection state problems
    Connection,
    /// "You cancelled"
    Rejection,
    /// "Try again later"
    Network,
}

impl TxFlowError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) | Self::ConfigError(_) => ErrorCategory::Input,
            Self::NotConnected | Self::AlreadyInProgress => ErrorCategory::Connection,
            Self::UserRejected(_) => ErrorCategory::Rejection,
            Self::SignerError(_) | Self::NetworkError(_) | Self::RejectedByLedger(_) => {
                ErrorCategory::Network
            }
        }
    }

    /// Whether the user may resubmit the same transaction by hand.
    ///
    /// Nothing in this crate retries automatically.
    pub fn is_resubmittable(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::RejectedByLedger(_))
    }
}

impl From<reqwest::Error> for TxFlowError {
    fn from(err: reqwest::Error) -> Self {
        TxFlowError::NetworkError(err.to_string())
    }
}

impl From<toml::de::Error> for TxFlowError {
    fn from(err: toml::de::Error) -> Self {
        TxFlowError::ConfigError(err.to_string())
    }
}

pub type TxResult<T> = Result<T, TxFlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_input() {
        let err = TxFlowError::invalid_input("asset id must be positive");
        assert_eq!(format!("{}", err), "Invalid input: asset id must be positive");
    }

    #[test]
    fn test_display_ledger_rejection() {
        let err = TxFlowError::RejectedByLedger("asset 7 missing from ADDR".to_string());
        assert_eq!(format!("{}", err), "Rejected by ledger: asset 7 missing from ADDR");
    }

    #[test]
    fn test_categories_are_distinct_for_user_facing_kinds() {
        assert_eq!(TxFlowError::invalid_input("x").category(), ErrorCategory::Input);
        assert_eq!(TxFlowError::NotConnected.category(), ErrorCategory::Connection);
        assert_eq!(TxFlowError::UserRejected("no".into()).category(), ErrorCategory::Rejection);
        assert_eq!(TxFlowError::NetworkError("down".into()).category(), ErrorCategory::Network);
    }

    #[test]
    fn test_only_remote_failures_are_resubmittable() {
        assert!(TxFlowError::NetworkError("timeout".into()).is_resubmittable());
        assert!(TxFlowError::RejectedByLedger("overspend".into()).is_resubmittable());
        assert!(!TxFlowError::UserRejected("cancel".into()).is_resubmittable());
        assert!(!TxFlowError::invalid_input("bad").is_resubmittable());
        assert!(!TxFlowError::AlreadyInProgress.is_resubmittable());
    }
}
