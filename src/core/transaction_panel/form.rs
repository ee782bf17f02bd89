//! Transaction kinds and the panel's raw form fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::errors::{TxFlowError, TxResult};
use crate::core::validation;

/// Asset transfers left without an amount send a single unit.
pub const DEFAULT_TRANSFER_AMOUNT: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionKind {
    AssetTransfer,
    Payment,
    AssetOptIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Recipient,
    AssetId,
    Amount,
    Note,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Recipient => "recipient",
            FormField::AssetId => "asset id",
            FormField::Amount => "amount",
            FormField::Note => "note",
        }
    }
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 3] =
        [TransactionKind::AssetTransfer, TransactionKind::Payment, TransactionKind::AssetOptIn];

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::AssetTransfer => "Asset Transfer",
            TransactionKind::Payment => "ALGO Payment",
            TransactionKind::AssetOptIn => "Asset Opt-in",
        }
    }

    /// Fields that must be filled before anything leaves the panel.
    pub fn required_fields(self) -> &'static [FormField] {
        match self {
            TransactionKind::AssetTransfer => &[FormField::Recipient, FormField::AssetId],
            TransactionKind::Payment => &[FormField::Recipient, FormField::Amount],
            TransactionKind::AssetOptIn => &[FormField::AssetId],
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw text exactly as typed into the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub note: String,
}

/// Form contents parsed for one transaction kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferIntent {
    AssetTransfer { recipient: String, asset_id: i64, amount: i64 },
    Payment { recipient: String, amount: Decimal, note: Option<String> },
    AssetOptIn { asset_id: i64 },
}

impl TransactionForm {
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Recipient => &self.recipient,
            FormField::AssetId => &self.asset_id,
            FormField::Amount => &self.amount,
            FormField::Note => &self.note,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn check_required(&self, kind: TransactionKind) -> TxResult<()> {
        let missing: Vec<&str> = kind
            .required_fields()
            .iter()
            .filter(|field| self.field(**field).trim().is_empty())
            .map(|field| field.label())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TxFlowError::invalid_input(format!(
                "{} requires {}",
                kind.label(),
                missing.join(", ")
            )))
        }
    }

    /// Checks required fields, then parses the numeric ones. Address and
    /// range checks are left to the gateway.
    pub fn intent(&self, kind: TransactionKind) -> TxResult<TransferIntent> {
        self.check_required(kind)?;

        match kind {
            TransactionKind::AssetTransfer => {
                let amount = if self.amount.trim().is_empty() {
                    DEFAULT_TRANSFER_AMOUNT
                } else {
                    validation::parse_integer_field("amount", &self.amount)?
                };
                Ok(TransferIntent::AssetTransfer {
                    recipient: self.recipient.trim().to_string(),
                    asset_id: validation::parse_integer_field("asset id", &self.asset_id)?,
                    amount,
                })
            }
            TransactionKind::Payment => Ok(TransferIntent::Payment {
                recipient: self.recipient.trim().to_string(),
                amount: validation::parse_algo_amount(&self.amount)?,
                note: Some(self.note.trim())
                    .filter(|note| !note.is_empty())
                    .map(str::to_string),
            }),
            TransactionKind::AssetOptIn => Ok(TransferIntent::AssetOptIn {
                asset_id: validation::parse_integer_field("asset id", &self.asset_id)?,
            }),
        }
    }
}
