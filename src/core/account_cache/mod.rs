//! Account Data Cache
//!
//! Display cache for three remote facts about the connected account:
//! balance with asset holdings, owned NFTs, and the exchange price. Each
//! entry loads and fails on its own. There is no polling; entries refetch
//! when the account changes or a submission invalidates them.

pub mod entry;

pub use entry::CacheEntry;

use futures::future::join3;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tracing::{debug, info, warn};

use crate::blockchain::traits::{Indexer, LedgerNode, PriceFeed};
use crate::core::domain::{AccountInfo, Address, Nft, PriceQuote};
use crate::core::errors::TxResult;

/// Something that can be told the cached account data is out of date.
pub trait InvalidationSignal: Send + Sync {
    fn invalidate(&self);
}

/// Consistent copy of every entry at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSnapshot {
    pub account: Option<Address>,
    pub account_info: CacheEntry<AccountInfo>,
    pub nfts: CacheEntry<Vec<Nft>>,
    pub price: CacheEntry<PriceQuote>,
}

struct Slot<T> {
    entry: CacheEntry<T>,
    /// Latest request issued for this entry. Responses for older requests
    /// are dropped.
    request: u64,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { entry: CacheEntry::default(), request: 0 }
    }
}

#[derive(Default)]
struct CacheState {
    account: Option<Address>,
    next_request: u64,
    account_info: Slot<AccountInfo>,
    nfts: Slot<Vec<Nft>>,
    price: Slot<PriceQuote>,
}

impl CacheState {
    fn issue(&mut self) -> u64 {
        self.next_request += 1;
        self.next_request
    }

    fn begin<T>(&mut self, slot: fn(&mut CacheState) -> &mut Slot<T>) -> u64 {
        let request = self.issue();
        let slot = slot(self);
        slot.request = request;
        slot.entry.begin_load();
        request
    }
}

fn account_info_slot(state: &mut CacheState) -> &mut Slot<AccountInfo> {
    &mut state.account_info
}

fn nfts_slot(state: &mut CacheState) -> &mut Slot<Vec<Nft>> {
    &mut state.nfts
}

fn price_slot(state: &mut CacheState) -> &mut Slot<PriceQuote> {
    &mut state.price
}

/// Request ids for one refresh round.
struct RefreshPlan {
    account: Option<(Address, u64, u64)>,
    price: u64,
}

/// 账户数据缓存
pub struct AccountDataCache {
    node: Arc<dyn LedgerNode>,
    indexer: Arc<dyn Indexer>,
    price_feed: Arc<dyn PriceFeed>,
    state: Mutex<CacheState>,
    invalidated: Notify,
}

impl AccountDataCache {
    pub fn new(
        node: Arc<dyn LedgerNode>,
        indexer: Arc<dyn Indexer>,
        price_feed: Arc<dyn PriceFeed>,
    ) -> Self {
        Self {
            node,
            indexer,
            price_feed,
            state: Mutex::new(CacheState::default()),
            invalidated: Notify::new(),
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.state.lock().account.clone()
    }

    pub fn account_info(&self) -> CacheEntry<AccountInfo> {
        self.state.lock().account_info.entry.clone()
    }

    pub fn nfts(&self) -> CacheEntry<Vec<Nft>> {
        self.state.lock().nfts.entry.clone()
    }

    pub fn price(&self) -> CacheEntry<PriceQuote> {
        self.state.lock().price.entry.clone()
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        let state = self.state.lock();
        CacheSnapshot {
            account: state.account.clone(),
            account_info: state.account_info.entry.clone(),
            nfts: state.nfts.entry.clone(),
            price: state.price.entry.clone(),
        }
    }

    /// Re-keys the cache. The previous account's data is dropped at once
    /// and any fetch still in flight for it will be ignored. Returns
    /// whether the account actually changed.
    pub fn set_account(&self, account: Option<Address>) -> bool {
        let mut state = self.state.lock();
        if state.account == account {
            return false;
        }
        match &account {
            Some(address) => info!("Account data now follows {}", address.short()),
            None => info!("Account data cleared"),
        }
        state.account = account;

        let request = state.issue();
        state.account_info = Slot { entry: CacheEntry::default(), request };
        state.nfts = Slot { entry: CacheEntry::default(), request };
        true
    }

    fn begin_refresh(&self) -> RefreshPlan {
        let mut state = self.state.lock();
        let account = state.account.clone().map(|address| {
            let info_request = state.begin(account_info_slot);
            let nft_request = state.begin(nfts_slot);
            (address, info_request, nft_request)
        });
        RefreshPlan { account, price: state.begin(price_slot) }
    }

    fn commit<T>(
        &self,
        slot: fn(&mut CacheState) -> &mut Slot<T>,
        request: u64,
        what: &str,
        result: TxResult<T>,
    ) {
        let mut state = self.state.lock();
        let slot = slot(&mut *state);
        if slot.request != request {
            debug!("Dropping superseded {} response (request {})", what, request);
            return;
        }
        if let Err(err) = &result {
            warn!("Failed to load {}: {}", what, err);
        }
        slot.entry.resolve(result);
    }

    /// Fetches every entry concurrently. A failure in one entry does not
    /// affect the others.
    pub async fn refresh(&self) {
        let plan = self.begin_refresh();

        let price = async {
            let result = self.price_feed.current_price().await;
            self.commit(price_slot, plan.price, "price", result);
        };

        let (balances, nfts) = match &plan.account {
            Some((address, info_request, nft_request)) => {
                debug!("Refreshing account data for {}", address.short());
                let balances = async move {
                    let result = self.node.account_information(address).await;
                    self.commit(account_info_slot, *info_request, "account info", result);
                };
                let nfts = async move {
                    let result = self.indexer.assets_owned(address).await;
                    self.commit(nfts_slot, *nft_request, "NFTs", result);
                };
                (Some(balances), Some(nfts))
            }
            None => (None, None),
        };

        join3(
            price,
            async move {
                if let Some(balances) = balances {
                    balances.await;
                }
            },
            async move {
                if let Some(nfts) = nfts {
                    nfts.await;
                }
            },
        )
        .await;
    }

    /// Requests a refetch from the [`follow`](Self::follow) loop.
    pub fn invalidate(&self) {
        debug!("Account data invalidated");
        self.invalidated.notify_one();
    }

    /// Keeps the cache keyed to the session's account until the session
    /// goes away. Each refetch runs in its own task so a slow response
    /// never delays an account change.
    pub async fn follow(self: Arc<Self>, mut accounts: watch::Receiver<Option<Address>>) {
        let initial = accounts.borrow_and_update().clone();
        self.set_account(initial);
        self.spawn_refresh();

        loop {
            tokio::select! {
                changed = accounts.changed() => {
                    if changed.is_err() {
                        debug!("Session closed; account cache stops following");
                        break;
                    }
                    let account = accounts.borrow_and_update().clone();
                    if self.set_account(account) {
                        self.spawn_refresh();
                    }
                }
                _ = self.invalidated.notified() => self.spawn_refresh(),
            }
        }
    }

    fn spawn_refresh(self: &Arc<Self>) {
        let cache = Arc::clone(self);
        tokio::spawn(async move { cache.refresh().await });
    }
}

impl InvalidationSignal for AccountDataCache {
    fn invalidate(&self) {
        AccountDataCache::invalidate(self);
    }
}
