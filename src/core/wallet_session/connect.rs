//! Session lifecycle: pairing, restore, disconnect and session loss.

use tracing::{info, warn};

use super::{PairingError, SessionState, WalletSession};
use crate::core::domain::Address;
use crate::core::errors::{TxFlowError, TxResult};

impl From<PairingError> for TxFlowError {
    fn from(err: PairingError) -> Self {
        match err {
            PairingError::Cancelled => TxFlowError::UserRejected(err.to_string()),
            PairingError::Timeout | PairingError::Fault(_) => {
                TxFlowError::SignerError(err.to_string())
            }
        }
    }
}

impl WalletSession {
    /// Moves Disconnected -> Connecting and returns the generation the
    /// pairing attempt belongs to.
    fn begin_connecting(&self) -> TxResult<Result<u64, Address>> {
        let mut inner = self.inner.lock();
        match &inner.state {
            SessionState::Connecting => Err(TxFlowError::AlreadyInProgress),
            SessionState::Connected(address) => Ok(Err(address.clone())),
            SessionState::Disconnected => {
                self.transition(&mut inner, SessionState::Connecting);
                Ok(Ok(inner.generation))
            }
        }
    }

    /// Applies a pairing outcome unless the session moved on meanwhile.
    /// Returns `None` when the outcome was discarded.
    fn finish_connecting(
        &self,
        generation: u64,
        outcome: Option<Address>,
    ) -> Option<Option<Address>> {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return None;
        }
        let next = match &outcome {
            Some(address) => SessionState::Connected(address.clone()),
            None => SessionState::Disconnected,
        };
        self.transition(&mut inner, next);
        Some(outcome)
    }

    /// Pairs with the external wallet. Calling this while already connected
    /// returns the current account without pairing again.
    pub async fn connect(&self) -> TxResult<Address> {
        let generation = match self.begin_connecting()? {
            Ok(generation) => generation,
            Err(current) => return Ok(current),
        };

        info!("🔗 Pairing with external wallet");
        let outcome = self.connector.pair().await;

        let paired = outcome.as_ref().ok().cloned();
        match self.finish_connecting(generation, paired) {
            None => {
                warn!("Pairing finished after the session was closed; discarding");
                if outcome.is_ok() {
                    self.connector.disconnect().await;
                }
                Err(TxFlowError::NotConnected)
            }
            Some(Some(address)) => {
                info!("✅ Wallet connected: {}", address.short());
                Ok(address)
            }
            Some(None) => {
                let err = match outcome {
                    Err(err) => err,
                    Ok(_) => PairingError::Fault("pairing produced no account".to_string()),
                };
                warn!("Pairing failed: {}", err);
                Err(err.into())
            }
        }
    }

    /// Resumes a session the wallet remembers. Never prompts the user.
    pub async fn restore(&self) -> Option<Address> {
        let generation = match self.begin_connecting() {
            Ok(Ok(generation)) => generation,
            Ok(Err(current)) => return Some(current),
            Err(_) => return None,
        };

        let resumed = self.connector.reconnect().await;
        match self.finish_connecting(generation, resumed) {
            Some(Some(address)) => {
                info!("✅ Restored wallet session: {}", address.short());
                Some(address)
            }
            Some(None) => None,
            None => {
                warn!("Session restore finished after the session was closed; discarding");
                None
            }
        }
    }

    /// Ends the session. Calling it while disconnected is a no-op.
    pub async fn disconnect(&self) {
        let was_connected = {
            let mut inner = self.inner.lock();
            let previous = inner.state.clone();
            if previous != SessionState::Disconnected {
                self.transition(&mut inner, SessionState::Disconnected);
            }
            matches!(previous, SessionState::Connected(_))
        };

        if was_connected {
            self.connector.disconnect().await;
            info!("Wallet disconnected");
        }
    }

    /// The wallet side dropped the session on its own.
    pub fn handle_session_lost(&self) {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Disconnected {
            warn!("Wallet session lost");
            self.transition(&mut inner, SessionState::Disconnected);
        }
    }
}
