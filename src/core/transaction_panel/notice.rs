//! User-facing notices for submission outcomes.

use serde::Serialize;

use crate::core::domain::TxId;
use crate::core::errors::{ErrorCategory, TxFlowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(tx_id: &TxId) -> Self {
        Self {
            title: "Transaction Successful".to_string(),
            description: format!("Transaction ID: {}", tx_id),
            severity: Severity::Success,
        }
    }

    pub fn from_error(err: &TxFlowError) -> Self {
        let (title, severity) = match (err.category(), err) {
            (_, TxFlowError::AlreadyInProgress) => ("Transaction In Progress", Severity::Warning),
            (ErrorCategory::Input, _) => ("Invalid Input", Severity::Warning),
            (ErrorCategory::Connection, _) => ("Wallet Not Connected", Severity::Warning),
            (ErrorCategory::Rejection, _) => ("Transaction Rejected", Severity::Warning),
            (ErrorCategory::Network, _) => ("Transaction Failed", Severity::Error),
        };
        Self { title: title.to_string(), description: err.to_string(), severity }
    }

    pub fn from_outcome(outcome: &Result<TxId, TxFlowError>) -> Self {
        match outcome {
            Ok(tx_id) => Self::success(tx_id),
            Err(err) => Self::from_error(err),
        }
    }
}
