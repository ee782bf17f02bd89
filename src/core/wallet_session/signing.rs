//! Signature requests are forwarded untouched to the external wallet.

use tracing::{debug, warn};

use super::{SigningError, WalletSession};
use crate::core::domain::{SignedTransaction, UnsignedTransaction};
use crate::core::errors::{TxFlowError, TxResult};

impl From<SigningError> for TxFlowError {
    fn from(err: SigningError) -> Self {
        match err {
            SigningError::Rejected(reason) => TxFlowError::UserRejected(reason),
            SigningError::Fault(reason) => TxFlowError::SignerError(reason),
        }
    }
}

impl WalletSession {
    /// Asks the wallet to sign `tx` for the connected account.
    ///
    /// A transaction whose sender is not the connected account never
    /// reaches the wallet. A signature that arrives after the session was
    /// disconnected or replaced is dropped. Both report
    /// [`TxFlowError::NotConnected`].
    pub async fn sign(&self, tx: &UnsignedTransaction) -> TxResult<SignedTransaction> {
        let (account, generation) = self.connected().ok_or(TxFlowError::NotConnected)?;
        if tx.sender() != &account {
            warn!(
                "Refusing to sign for {}: connected account is {}",
                tx.sender().short(),
                account.short()
            );
            return Err(TxFlowError::NotConnected);
        }
        debug!("Requesting signature from {}", account.short());

        let outcome = self.connector.sign(tx).await;

        if self.generation() != generation {
            warn!("Signature for {} arrived after the session changed; dropping", account.short());
            return Err(TxFlowError::NotConnected);
        }
        let signed = outcome?;
        debug!("Wallet returned {} signed bytes", signed.len());
        Ok(signed)
    }
}
