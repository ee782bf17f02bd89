//! tests/account_cache_tests.rs
//!
//! AccountDataCache keyed by the session account:
//! - late responses for a previous account are ignored
//! - stale-while-error per entry
//! - follow loop reacting to session changes and invalidation

mod common;

use algodash_core::core::account_cache::AccountDataCache;
use algodash_core::core::domain::{AssetId, Nft};
use algodash_core::core::errors::TxFlowError;
use algodash_core::core::wallet_session::WalletSession;
use common::{address, EventLog, MockIndexer, MockNode, MockPriceFeed, MockWallet};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn build(node: MockNode) -> (Arc<AccountDataCache>, Arc<MockNode>, Arc<MockIndexer>, Arc<MockPriceFeed>) {
    let node = Arc::new(node);
    let indexer = Arc::new(MockIndexer::default());
    let price = Arc::new(MockPriceFeed::default());
    let cache = Arc::new(AccountDataCache::new(node.clone(), indexer.clone(), price.clone()));
    (cache, node, indexer, price)
}

async fn eventually(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test(flavor = "current_thread")]
async fn test_late_response_for_previous_account_is_ignored() {
    let addr1 = address(1);
    let addr2 = address(2);
    let node = MockNode::new(EventLog::default())
        .with_balance(&addr1, 9_000_000)
        .with_balance(&addr2, 3_000_000);
    let gate = node.gate_account(&addr1);
    let (cache, _, _, _) = build(node);

    cache.set_account(Some(addr1.clone()));
    let pending = {
        let cache = cache.clone();
        tokio::spawn(async move { cache.refresh().await })
    };
    eventually(|| cache.account_info().is_loading).await;

    cache.set_account(Some(addr2.clone()));
    cache.refresh().await;
    assert_eq!(cache.account_info().value().map(|a| a.amount), Some(3_000_000));

    gate.notify_one();
    pending.await.unwrap();

    let info = cache.account_info();
    assert_eq!(info.value().map(|a| a.address.clone()), Some(addr2.to_string()));
    assert_eq!(info.value().map(|a| a.amount), Some(3_000_000));
}

#[tokio::test(flavor = "current_thread")]
async fn test_account_switch_hides_previous_holdings_immediately() {
    let addr1 = address(1);
    let (cache, _, indexer, _) = build(MockNode::new(EventLog::default()).with_balance(&addr1, 1));
    indexer.nfts.lock().push(Nft {
        id: AssetId::new(77).unwrap(),
        name: "Badge".into(),
        unit_name: "BDG".into(),
        url: None,
    });

    cache.set_account(Some(addr1));
    cache.refresh().await;
    assert_eq!(cache.nfts().value().map(Vec::len), Some(1));

    cache.set_account(None);
    let snapshot = cache.snapshot();
    assert!(snapshot.account_info.value().is_none());
    assert!(snapshot.nfts.value().is_none());
    assert!(snapshot.price.value().is_some());
}

#[tokio::test(flavor = "current_thread")]
async fn test_failed_entry_does_not_block_others() {
    let addr1 = address(1);
    let (cache, _, indexer, _) = build(MockNode::new(EventLog::default()).with_balance(&addr1, 5));
    cache.set_account(Some(addr1));
    cache.refresh().await;

    *indexer.fail.lock() = Some(TxFlowError::NetworkError("indexer down".into()));
    cache.refresh().await;

    let snapshot = cache.snapshot();
    assert!(snapshot.nfts.is_stale());
    assert_eq!(snapshot.nfts.value().map(Vec::len), Some(0));
    assert!(snapshot.account_info.error.is_none());
    assert_eq!(snapshot.account_info.value().map(|a| a.amount), Some(5));
}

#[tokio::test(flavor = "current_thread")]
async fn test_follow_tracks_session_and_invalidation() {
    let log = EventLog::default();
    let addr1 = address(1);
    let (cache, node, _, price) = build(MockNode::new(log.clone()).with_balance(&addr1, 2_000_000));
    let session = WalletSession::new(Arc::new(MockWallet::new(addr1.clone(), log.clone())));

    let follower = tokio::spawn(cache.clone().follow(session.subscribe()));
    eventually(|| price.calls.load(Ordering::SeqCst) >= 1).await;
    assert!(cache.account().is_none());

    session.connect().await.unwrap();
    eventually(|| cache.account_info().value().map(|a| a.amount) == Some(2_000_000)).await;

    node.balances.lock().insert(addr1.clone(), 1_000_000);
    cache.invalidate();
    eventually(|| cache.account_info().value().map(|a| a.amount) == Some(1_000_000)).await;

    session.disconnect().await;
    eventually(|| cache.account().is_none()).await;
    assert!(cache.account_info().value().is_none());

    drop(session);
    tokio::time::timeout(Duration::from_secs(5), follower)
        .await
        .expect("follow loop should end with the session")
        .unwrap();
}
