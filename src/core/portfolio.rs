//! Dashboard portfolio figures derived from an account cache snapshot.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::account_cache::CacheSnapshot;
use crate::core::domain::AssetHolding;
use crate::core::validation::micro_to_algos;

/// Holdings shown on the overview card.
pub const HOLDINGS_PREVIEW_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    /// Whole ALGO.
    pub balance: Decimal,
    /// `balance` priced in the feed currency. Zero until a price is known.
    pub fiat_value: Decimal,
    pub price: Option<Decimal>,
    /// Percent move of `price` against the configured reference price.
    pub change_percent: Option<Decimal>,
    pub nft_count: usize,
    pub asset_count: usize,
    pub holdings_preview: Vec<AssetHolding>,
}

impl PortfolioSummary {
    pub fn from_snapshot(snapshot: &CacheSnapshot, reference_price: Decimal) -> Self {
        let account = snapshot.account_info.value();
        let balance = account.map(|info| micro_to_algos(info.amount)).unwrap_or_default();
        let price = snapshot.price.value().map(|quote| quote.price);

        let fiat_value = price.map(|p| balance * p).unwrap_or_default();
        let change_percent = price.and_then(|p| {
            if reference_price.is_zero() {
                None
            } else {
                Some(((p - reference_price) / reference_price * Decimal::ONE_HUNDRED).round_dp(2))
            }
        });

        let assets = account.map(|info| info.assets.as_slice()).unwrap_or_default();

        Self {
            balance,
            fiat_value,
            price,
            change_percent,
            nft_count: snapshot.nfts.value().map(Vec::len).unwrap_or(0),
            asset_count: assets.len(),
            holdings_preview: assets.iter().take(HOLDINGS_PREVIEW_LEN).cloned().collect(),
        }
    }

    pub fn is_price_up(&self) -> bool {
        self.change_percent.map(|c| c.is_sign_positive() && !c.is_zero()).unwrap_or(false)
    }
}
