// tests/common/mod.rs
// Shared hand-written collaborators for integration tests

#![allow(dead_code)]

use algodash_core::core::account_cache::InvalidationSignal;
use algodash_core::core::domain::{
    AccountInfo, Address, Nft, PriceQuote, SignedTransaction, SuggestedParams, TxId,
    UnsignedTransaction,
};
use algodash_core::core::errors::{TxFlowError, TxResult};
use algodash_core::core::wallet_session::{PairingError, SigningError, WalletConnector};
use algodash_core::blockchain::{Indexer, LedgerNode, PriceFeed};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub fn address(seed: u8) -> Address {
    Address::from_public_key(&[seed; 32])
}

/// Ordered record of every collaborator call in a test.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().iter().filter(|e| e.as_str() == event).count()
    }
}

pub struct MockWallet {
    pub account: Address,
    pub pairing: Mutex<Result<Address, PairingError>>,
    pub verdict: Mutex<Result<SignedTransaction, SigningError>>,
    /// When set, `sign` waits for a notification before answering.
    pub sign_gate: Option<Arc<Notify>>,
    pub signed: Mutex<Vec<UnsignedTransaction>>,
    pub log: EventLog,
}

impl MockWallet {
    pub fn new(account: Address, log: EventLog) -> Self {
        Self {
            pairing: Mutex::new(Ok(account.clone())),
            account,
            verdict: Mutex::new(Ok(SignedTransaction::new(vec![0x82, 0xa3, 0x73, 0x69, 0x67]))),
            sign_gate: None,
            signed: Mutex::new(Vec::new()),
            log,
        }
    }

    pub fn rejecting(self) -> Self {
        *self.verdict.lock() = Err(SigningError::Rejected("user declined".into()));
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.sign_gate = Some(gate);
        self
    }
}

#[async_trait]
impl WalletConnector for MockWallet {
    async fn pair(&self) -> Result<Address, PairingError> {
        self.log.push("pair");
        self.pairing.lock().clone()
    }

    async fn sign(&self, tx: &UnsignedTransaction) -> Result<SignedTransaction, SigningError> {
        self.log.push("sign");
        self.signed.lock().push(tx.clone());
        if let Some(gate) = &self.sign_gate {
            gate.notified().await;
        }
        self.verdict.lock().clone()
    }

    async fn disconnect(&self) {
        self.log.push("wallet-disconnect");
    }
}

pub fn params() -> SuggestedParams {
    SuggestedParams {
        fee: 0,
        min_fee: 1_000,
        last_round: 40_000_000,
        genesis_id: "testnet-v1.0".to_string(),
        genesis_hash: "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=".to_string(),
        consensus_version: "future".to_string(),
    }
}

pub struct MockNode {
    pub log: EventLog,
    pub submit_result: Mutex<TxResult<TxId>>,
    pub balances: Mutex<HashMap<Address, u64>>,
    /// Per-account gates holding `account_information` until notified.
    pub account_gates: Mutex<HashMap<Address, Arc<Notify>>>,
    /// When set, `suggested_params` waits for a notification before answering.
    pub params_gate: Mutex<Option<Arc<Notify>>>,
    pub submitted: Mutex<Vec<SignedTransaction>>,
}

impl MockNode {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            submit_result: Mutex::new(Ok(TxId("TX123".to_string()))),
            balances: Mutex::new(HashMap::new()),
            account_gates: Mutex::new(HashMap::new()),
            params_gate: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn with_balance(self, account: &Address, amount: u64) -> Self {
        self.balances.lock().insert(account.clone(), amount);
        self
    }

    pub fn gate_account(&self, account: &Address) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.account_gates.lock().insert(account.clone(), gate.clone());
        gate
    }

    pub fn gate_params(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.params_gate.lock() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl LedgerNode for MockNode {
    async fn account_information(&self, address: &Address) -> TxResult<AccountInfo> {
        self.log.push(format!("account:{}", address.short()));
        let gate = self.account_gates.lock().get(address).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let amount = self.balances.lock().get(address).copied().unwrap_or(0);
        Ok(AccountInfo { address: address.to_string(), amount, assets: vec![] })
    }

    async fn suggested_params(&self) -> TxResult<SuggestedParams> {
        self.log.push("params");
        let gate = self.params_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(params())
    }

    async fn send_raw_transaction(&self, signed: SignedTransaction) -> TxResult<TxId> {
        self.log.push("submit");
        self.submitted.lock().push(signed);
        self.submit_result.lock().clone()
    }
}

#[derive(Default)]
pub struct MockIndexer {
    pub nfts: Mutex<Vec<Nft>>,
    pub fail: Mutex<Option<TxFlowError>>,
}

#[async_trait]
impl Indexer for MockIndexer {
    async fn assets_owned(&self, _address: &Address) -> TxResult<Vec<Nft>> {
        if let Some(err) = self.fail.lock().clone() {
            return Err(err);
        }
        Ok(self.nfts.lock().clone())
    }
}

pub struct MockPriceFeed {
    pub price: Decimal,
    pub calls: AtomicUsize,
}

impl Default for MockPriceFeed {
    fn default() -> Self {
        Self { price: Decimal::new(18, 2), calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl PriceFeed for MockPriceFeed {
    async fn current_price(&self) -> TxResult<PriceQuote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PriceQuote::new(self.price, "usd"))
    }
}

/// Counts invalidation signals and records them in the event log.
#[derive(Default)]
pub struct InvalidationCounter {
    pub hits: AtomicUsize,
    pub log: EventLog,
}

impl InvalidationCounter {
    pub fn new(log: EventLog) -> Self {
        Self { hits: AtomicUsize::new(0), log }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl InvalidationSignal for InvalidationCounter {
    fn invalidate(&self) {
        self.log.push("invalidate");
        self.hits.fetch_add(1, Ordering::SeqCst);
    }
}
