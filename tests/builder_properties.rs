//! tests/builder_properties.rs
//!
//! Property tests for ChainGateway builders: every valid input builds with
//! the connected sender, every invalid one fails locally with no node call.

mod common;

use algodash_core::blockchain::ChainGateway;
use algodash_core::core::config::ChainConfig;
use algodash_core::core::domain::Address;
use algodash_core::core::errors::TxFlowError;
use common::{EventLog, MockNode};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
}

fn gateway() -> (ChainGateway, EventLog) {
    let log = EventLog::default();
    let node = Arc::new(MockNode::new(log.clone()));
    (ChainGateway::new(node, ChainConfig::default()), log)
}

fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 32]>().prop_map(|key| Address::from_public_key(&key))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_valid_transfer_builds_for_sender(
        sender in arb_address(),
        recipient in arb_address(),
        asset_id in 1i64..=i64::MAX,
        amount in 0i64..=i64::MAX,
    ) {
        let (gateway, _) = gateway();
        let tx = runtime()
            .block_on(gateway.build_asset_transfer(sender.as_str(), recipient.as_str(), asset_id, amount))
            .unwrap();
        prop_assert_eq!(tx.sender(), &sender);
        prop_assert_eq!(tx.receiver(), &recipient);
        prop_assert_eq!(tx.amount(), amount as u64);
        prop_assert_eq!(tx.asset_id().map(|id| id.get()), Some(asset_id as u64));
    }

    #[test]
    fn prop_bad_asset_or_amount_never_reaches_node(
        sender in arb_address(),
        recipient in arb_address(),
        bad_asset in i64::MIN..=0i64,
        bad_amount in i64::MIN..0i64,
        cents in 1i64..1_000_000_000,
    ) {
        let (gateway, log) = gateway();
        let rt = runtime();
        let results = vec![
            rt.block_on(gateway.build_asset_transfer(sender.as_str(), recipient.as_str(), bad_asset, 1)),
            rt.block_on(gateway.build_asset_transfer(sender.as_str(), recipient.as_str(), 1, bad_amount)),
            rt.block_on(gateway.build_asset_opt_in(sender.as_str(), bad_asset)),
            rt.block_on(gateway.build_payment(sender.as_str(), recipient.as_str(), Decimal::new(-cents, 2), None)),
        ];
        for result in results {
            prop_assert!(matches!(result, Err(TxFlowError::InvalidInput(_))));
        }
        prop_assert!(log.events().is_empty());
    }

    #[test]
    fn prop_payment_truncates_to_microalgos(
        sender in arb_address(),
        recipient in arb_address(),
        units in 0i64..1_000_000_000_000,
        scale in 0u32..=9,
    ) {
        let (gateway, _) = gateway();
        let amount = Decimal::new(units, scale);
        let tx = runtime()
            .block_on(gateway.build_payment(sender.as_str(), recipient.as_str(), amount, None))
            .unwrap();

        let expected = if scale <= 6 {
            units as u64 * 10u64.pow(6 - scale)
        } else {
            units as u64 / 10u64.pow(scale - 6)
        };
        prop_assert_eq!(tx.amount(), expected);
    }
}
