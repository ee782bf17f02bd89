use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::{TxFlowError, TxResult};
use crate::core::validation::{self, PUBLIC_KEY_LEN};

/// A checksummed ledger address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parses and checksum-verifies an address.
    pub fn parse(raw: &str) -> TxResult<Self> {
        let trimmed = raw.trim();
        validation::validate_address(trimmed)?;
        Ok(Self(trimmed.to_string()))
    }

    /// Encodes a 32-byte public key as an address.
    pub fn from_public_key(public_key: &[u8; PUBLIC_KEY_LEN]) -> Self {
        let mut raw = public_key.to_vec();
        raw.extend_from_slice(&validation::address_checksum(public_key));
        Self(validation::base32_encode(&raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for log lines, e.g. `AAAAAA...Y5HFKQ`.
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 6..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = TxFlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TxFlowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Identifier of a ledger asset. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(u64);

impl AssetId {
    pub fn new(raw: i64) -> TxResult<Self> {
        validation::check_asset_id(raw).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of an account's asset list as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetHolding {
    #[serde(rename = "asset-id")]
    pub asset_id: u64,
    pub amount: u64,
    #[serde(rename = "is-frozen", default)]
    pub is_frozen: bool,
}

/// Native balance and held assets of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
    /// Balance in microalgos.
    pub amount: u64,
    #[serde(default)]
    pub assets: Vec<AssetHolding>,
}

/// Node-suggested parameters used to fill a transaction header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedParams {
    /// Fee per byte, kept for reference; headers use the flat `min_fee`.
    pub fee: u64,
    #[serde(rename = "min-fee")]
    pub min_fee: u64,
    #[serde(rename = "last-round")]
    pub last_round: u64,
    #[serde(rename = "genesis-id")]
    pub genesis_id: String,
    #[serde(rename = "genesis-hash")]
    pub genesis_hash: String,
    #[serde(rename = "consensus-version", default)]
    pub consensus_version: String,
}

/// Fields every transaction kind carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHeader {
    pub sender: Address,
    /// Flat fee in microalgos.
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A transaction ready to be handed to an external signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UnsignedTransaction {
    #[serde(rename = "axfer")]
    AssetTransfer {
        #[serde(flatten)]
        header: TxHeader,
        receiver: Address,
        asset_id: AssetId,
        amount: u64,
    },
    /// Zero-amount transfer of `asset_id` from the sender to itself.
    #[serde(rename = "axfer-optin")]
    AssetOptIn {
        #[serde(flatten)]
        header: TxHeader,
        asset_id: AssetId,
    },
    #[serde(rename = "pay")]
    Payment {
        #[serde(flatten)]
        header: TxHeader,
        receiver: Address,
        /// Microalgos.
        amount: u64,
    },
}

impl UnsignedTransaction {
    pub fn header(&self) -> &TxHeader {
        match self {
            Self::AssetTransfer { header, .. }
            | Self::AssetOptIn { header, .. }
            | Self::Payment { header, .. } => header,
        }
    }

    pub fn sender(&self) -> &Address {
        &self.header().sender
    }

    /// Receiver on the ledger. For opt-ins this is the sender.
    pub fn receiver(&self) -> &Address {
        match self {
            Self::AssetTransfer { receiver, .. } | Self::Payment { receiver, .. } => receiver,
            Self::AssetOptIn { header, .. } => &header.sender,
        }
    }

    /// Transferred amount in the unit of the transaction kind.
    pub fn amount(&self) -> u64 {
        match self {
            Self::AssetTransfer { amount, .. } | Self::Payment { amount, .. } => *amount,
            Self::AssetOptIn { .. } => 0,
        }
    }

    pub fn asset_id(&self) -> Option<AssetId> {
        match self {
            Self::AssetTransfer { asset_id, .. } | Self::AssetOptIn { asset_id, .. } => {
                Some(*asset_id)
            }
            Self::Payment { .. } => None,
        }
    }
}

/// Opaque signed payload produced by the wallet.
///
/// Consumed by submission; the gateway does not keep it afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedTransaction(Vec<u8>);

impl SignedTransaction {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Wallet bridges commonly hand back base64 blobs.
    pub fn from_base64(encoded: &str) -> TxResult<Self> {
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map(Self)
            .map_err(|e| TxFlowError::SignerError(format!("signed payload is not base64: {}", e)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SignedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignedTransaction({} bytes)", self.0.len())
    }
}

/// Identifier the node assigns to an accepted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl TxId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of handing a signed transaction to the node: accepted into the
/// pending pool (not final) or refused.
pub type SubmissionResult = TxResult<TxId>;

/// Non-fungible asset metadata from the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nft {
    pub id: AssetId,
    pub name: String,
    pub unit_name: String,
    pub url: Option<String>,
}

/// Native currency price in a fiat unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Decimal,
    pub currency: String,
    pub fetched_at: DateTime<Utc>,
}

impl PriceQuote {
    pub fn new(price: Decimal, currency: impl Into<String>) -> Self {
        Self { price, currency: currency.into(), fetched_at: Utc::now() }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.age(Utc::now()) > max_age
    }
}
