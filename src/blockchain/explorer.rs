//! Block explorer link templating. Display only.

use crate::core::config::AppConfig;
use crate::core::domain::{Address, AssetId, TxId};

#[derive(Debug, Clone)]
pub struct ExplorerLinks {
    base_url: String,
}

impl ExplorerLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.network.explorer_url.clone())
    }

    pub fn address_url(&self, address: &Address) -> String {
        format!("{}/address/{}", self.base_url, address)
    }

    pub fn asset_url(&self, asset_id: AssetId) -> String {
        format!("{}/asset/{}", self.base_url, asset_id)
    }

    pub fn transaction_url(&self, tx_id: &TxId) -> String {
        format!("{}/tx/{}", self.base_url, tx_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_for_testnet() {
        let links = ExplorerLinks::from_config(&AppConfig::testnet());
        let address = Address::from_public_key(&[0u8; 32]);
        assert_eq!(
            links.address_url(&address),
            "https://testnet.algoexplorer.io/address/AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
        );
        assert_eq!(
            links.asset_url(AssetId::new(10458941).unwrap()),
            "https://testnet.algoexplorer.io/asset/10458941"
        );
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let links = ExplorerLinks::new("https://explorer.example/");
        assert_eq!(links.transaction_url(&TxId("TX123".into())), "https://explorer.example/tx/TX123");
    }
}
