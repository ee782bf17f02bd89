//! Chain gateway
//!
//! Stateless facade that builds unsigned transactions and submits signed
//! ones. Building validates every input locally before the node is asked
//! for suggested parameters; submission is the only call with a ledger
//! effect and it needs an already signed payload.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

use crate::blockchain::traits::LedgerNode;
use crate::core::config::ChainConfig;
use crate::core::domain::{
    Address, AssetId, SignedTransaction, SubmissionResult, TxHeader, UnsignedTransaction,
};
use crate::core::errors::TxResult;
use crate::core::validation;

pub struct ChainGateway {
    node: Arc<dyn LedgerNode>,
    chain: ChainConfig,
}

impl ChainGateway {
    pub fn new(node: Arc<dyn LedgerNode>, chain: ChainConfig) -> Self {
        Self { node, chain }
    }

    pub fn node(&self) -> Arc<dyn LedgerNode> {
        Arc::clone(&self.node)
    }

    async fn header(&self, sender: Address, note: Option<String>) -> TxResult<TxHeader> {
        let params = self.node.suggested_params().await?;
        let first_valid = params.last_round;
        let last_valid = first_valid.saturating_add(self.chain.validity_window);
        debug!(
            "Suggested params: fee={} rounds={}..{} genesis={}",
            params.min_fee, first_valid, last_valid, params.genesis_id
        );

        Ok(TxHeader {
            sender,
            fee: params.min_fee,
            first_valid,
            last_valid,
            genesis_id: params.genesis_id,
            genesis_hash: params.genesis_hash,
            note,
        })
    }

    /// Transfer `amount` base units of `asset_id` to `recipient`.
    pub async fn build_asset_transfer(
        &self,
        sender: &str,
        recipient: &str,
        asset_id: i64,
        amount: i64,
    ) -> TxResult<UnsignedTransaction> {
        let sender = Address::parse(sender)?;
        let receiver = Address::parse(recipient)?;
        let asset_id = AssetId::new(asset_id)?;
        let amount = validation::check_asset_amount(amount)?;

        let header = self.header(sender, None).await?;
        info!(
            "Built asset transfer: {} x asset {} {} -> {}",
            amount,
            asset_id,
            header.sender.short(),
            receiver.short()
        );
        Ok(UnsignedTransaction::AssetTransfer { header, receiver, asset_id, amount })
    }

    /// Opt `sender` into `asset_id` with a zero-amount self-transfer.
    pub async fn build_asset_opt_in(
        &self,
        sender: &str,
        asset_id: i64,
    ) -> TxResult<UnsignedTransaction> {
        let sender = Address::parse(sender)?;
        let asset_id = AssetId::new(asset_id)?;

        let header = self.header(sender, None).await?;
        info!("Built opt-in to asset {} for {}", asset_id, header.sender.short());
        Ok(UnsignedTransaction::AssetOptIn { header, asset_id })
    }

    /// Pay `amount` whole ALGO to `recipient`, truncated to microalgos.
    pub async fn build_payment(
        &self,
        sender: &str,
        recipient: &str,
        amount: Decimal,
        note: Option<&str>,
    ) -> TxResult<UnsignedTransaction> {
        let sender = Address::parse(sender)?;
        let receiver = Address::parse(recipient)?;
        let micro = validation::algos_to_micro(amount)?;
        let note = match note.map(str::trim).filter(|n| !n.is_empty()) {
            Some(text) => {
                validation::validate_note(text, self.chain.max_note_bytes)?;
                Some(text.to_string())
            }
            None => None,
        };

        let header = self.header(sender, note).await?;
        info!(
            "Built payment: {} microalgos {} -> {}",
            micro,
            header.sender.short(),
            receiver.short()
        );
        Ok(UnsignedTransaction::Payment { header, receiver, amount: micro })
    }

    /// Hands a signed payload to the node. Does not wait for confirmation.
    pub async fn submit(&self, signed: SignedTransaction) -> SubmissionResult {
        self.node.send_raw_transaction(signed).await
    }
}
