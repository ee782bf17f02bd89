//! Wallet Session
//!
//! Owns the connected-account identity for one dashboard session and
//! delegates pairing and signing to an external wallet.
//!
//! ## Module Structure
//! - `connect` - Pairing, restore, disconnect and session loss
//! - `signing` - Pass-through signature requests

pub mod connect;
pub mod signing;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

use crate::core::domain::{Address, SignedTransaction, UnsignedTransaction};

/// Connection state of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected(Address),
}

/// Why the external wallet did not pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("pairing cancelled by user")]
    Cancelled,
    #[error("pairing timed out")]
    Timeout,
    #[error("wallet fault: {0}")]
    Fault(String),
}

/// Why the external wallet did not sign.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("signature declined: {0}")]
    Rejected(String),
    #[error("signer fault: {0}")]
    Fault(String),
}

/// External wallet (mobile wallet bridge, browser extension, hardware
/// device). Its wire protocol is its own business.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Runs the interactive pairing flow and returns the chosen account.
    async fn pair(&self) -> Result<Address, PairingError>;

    /// Resumes a previously paired session without user interaction.
    async fn reconnect(&self) -> Option<Address> {
        None
    }

    async fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SigningError>;

    /// Tears down the bridge session. Failures are the wallet's problem.
    async fn disconnect(&self) {}
}

struct SessionInner {
    state: SessionState,
    /// Bumped on every transition; lets late completions detect that the
    /// session moved on while they were suspended.
    generation: u64,
}

/// 钱包会话
pub struct WalletSession {
    connector: Arc<dyn WalletConnector>,
    inner: Mutex<SessionInner>,
    address_tx: watch::Sender<Option<Address>>,
}

impl WalletSession {
    pub fn new(connector: Arc<dyn WalletConnector>) -> Self {
        let (address_tx, _) = watch::channel(None);
        Self {
            connector,
            inner: Mutex::new(SessionInner { state: SessionState::Disconnected, generation: 0 }),
            address_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    /// Connected account, if any.
    pub fn address(&self) -> Option<Address> {
        match &self.inner.lock().state {
            SessionState::Connected(address) => Some(address.clone()),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.inner.lock().state, SessionState::Connected(_))
    }

    /// Changes whenever the session transitions.
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    /// Connected account and the generation it belongs to.
    pub fn connected(&self) -> Option<(Address, u64)> {
        let inner = self.inner.lock();
        match &inner.state {
            SessionState::Connected(address) => Some((address.clone(), inner.generation)),
            _ => None,
        }
    }

    /// Follows the connected address. The current value is visible
    /// immediately to new subscribers.
    pub fn subscribe(&self) -> watch::Receiver<Option<Address>> {
        self.address_tx.subscribe()
    }

    /// Moves to `state`, bumps the generation and publishes the address.
    /// Caller holds the lock.
    fn transition(&self, inner: &mut SessionInner, state: SessionState) {
        let published = match &state {
            SessionState::Connected(address) => Some(address.clone()),
            _ => None,
        };
        let address_changed = *self.address_tx.borrow() != published;
        inner.state = state;
        inner.generation += 1;
        if address_changed {
            self.address_tx.send_replace(published);
        }
    }
}
