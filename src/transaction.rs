use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, StoreError};

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Signs `amount` for balance arithmetic: income adds, expense subtracts.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

/// A single recorded income or expense. Never mutated after creation.
///
/// Serialized field names match the local fallback blob: `id`, `type`,
/// `amount`, `description`, `date` (ISO-8601).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Creates a transaction with a fresh id and the current time.
    ///
    /// # Errors
    ///
    /// Returns [StoreError::InvalidInput] when `description` is empty after
    /// trimming or `amount` is not a finite positive number.
    pub fn new(kind: TransactionKind, description: &str, amount: f64) -> Result<Self> {
        let description = description.trim();
        if description.is_empty() {
            return Err(StoreError::InvalidInput(
                "description must not be empty".into(),
            ));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(StoreError::InvalidInput(format!(
                "amount must be a positive number, got {amount}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            description: description.to_string(),
            created_at: Utc::now(),
        })
    }

    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }
}

/// Folds a transaction list into the account balance.
pub fn balance_of(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(Transaction::signed_amount).sum()
}
