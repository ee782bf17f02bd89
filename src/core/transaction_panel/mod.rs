//! Transaction Panel Controller
//!
//! Turns a transaction kind and form fields into build, sign and submit
//! calls, in that order, and stops at the first failing stage. Only one
//! submission runs at a time.

pub mod form;
pub mod notice;

pub use form::{FormField, TransactionForm, TransactionKind, TransferIntent};
pub use notice::{Notice, Severity};

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::blockchain::ChainGateway;
use crate::core::account_cache::InvalidationSignal;
use crate::core::domain::{Address, TxId, UnsignedTransaction};
use crate::core::errors::{TxFlowError, TxResult};
use crate::core::wallet_session::WalletSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Idle,
    Submitting,
}

/// Returns the panel to `Idle` however the flow ends, including when the
/// submit future is dropped mid-flight.
struct SubmittingGuard<'a> {
    state: &'a Mutex<PanelState>,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        *self.state.lock() = PanelState::Idle;
    }
}

/// 交易面板控制器
pub struct TransactionPanel {
    gateway: Arc<ChainGateway>,
    session: Arc<WalletSession>,
    invalidation: Arc<dyn InvalidationSignal>,
    state: Mutex<PanelState>,
    form: Mutex<TransactionForm>,
    notice: Mutex<Option<Notice>>,
}

impl TransactionPanel {
    pub fn new(
        gateway: Arc<ChainGateway>,
        session: Arc<WalletSession>,
        invalidation: Arc<dyn InvalidationSignal>,
    ) -> Self {
        Self {
            gateway,
            session,
            invalidation,
            state: Mutex::new(PanelState::Idle),
            form: Mutex::new(TransactionForm::default()),
            notice: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PanelState {
        *self.state.lock()
    }

    pub fn form(&self) -> TransactionForm {
        self.form.lock().clone()
    }

    pub fn set_form(&self, form: TransactionForm) {
        *self.form.lock() = form;
    }

    /// Outcome of the most recent submit attempt, ready for display.
    pub fn notice(&self) -> Option<Notice> {
        self.notice.lock().clone()
    }

    fn begin(&self) -> TxResult<SubmittingGuard<'_>> {
        let mut state = self.state.lock();
        if *state == PanelState::Submitting {
            return Err(TxFlowError::AlreadyInProgress);
        }
        *state = PanelState::Submitting;
        Ok(SubmittingGuard { state: &self.state })
    }

    /// Builds, signs and submits one transaction from `fields`.
    ///
    /// On success the form is cleared and the account cache is invalidated
    /// exactly once. On failure the form keeps what the user typed.
    pub async fn submit(&self, kind: TransactionKind, fields: TransactionForm) -> TxResult<TxId> {
        let outcome = match self.begin() {
            Ok(_guard) => {
                self.set_form(fields.clone());
                let flow = Uuid::new_v4();
                info!(%flow, "Submitting {}", kind);

                let outcome = self.run(flow, kind, &fields).await;
                match &outcome {
                    Ok(tx_id) => {
                        self.form.lock().clear();
                        self.invalidation.invalidate();
                        info!(%flow, "✅ {} accepted by the node: {}", kind, tx_id);
                    }
                    Err(err) => warn!(%flow, "{} failed: {}", kind, err),
                }
                outcome
            }
            Err(err) => {
                warn!("Submit ignored: a {} is already being submitted", kind);
                Err(err)
            }
        };

        *self.notice.lock() = Some(Notice::from_outcome(&outcome));
        outcome
    }

    async fn run(&self, flow: Uuid, kind: TransactionKind, fields: &TransactionForm) -> TxResult<TxId> {
        let (sender, generation) = self.session.connected().ok_or(TxFlowError::NotConnected)?;
        let intent = fields.intent(kind)?;

        let unsigned = self.build(&sender, intent).await?;
        if self.session.generation() != generation {
            warn!(%flow, "Session changed while building; not signing");
            return Err(TxFlowError::NotConnected);
        }
        info!(%flow, "Built {}; requesting signature", kind);

        let signed = self.session.sign(&unsigned).await?;
        if self.session.generation() != generation {
            warn!(%flow, "Session changed while signing; not submitting");
            return Err(TxFlowError::NotConnected);
        }

        info!(%flow, "Signed ({} bytes); submitting", signed.len());
        self.gateway.submit(signed).await
    }

    async fn build(&self, sender: &Address, intent: TransferIntent) -> TxResult<UnsignedTransaction> {
        let sender = sender.as_str();
        match intent {
            TransferIntent::AssetTransfer { recipient, asset_id, amount } => {
                self.gateway.build_asset_transfer(sender, &recipient, asset_id, amount).await
            }
            TransferIntent::Payment { recipient, amount, note } => {
                self.gateway.build_payment(sender, &recipient, amount, note.as_deref()).await
            }
            TransferIntent::AssetOptIn { asset_id } => {
                self.gateway.build_asset_opt_in(sender, asset_id).await
            }
        }
    }
}
