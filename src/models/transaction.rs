use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Income,
    Expense,
    Investment,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
            TransactionType::Investment => "investment",
        }
    }

    /// Parses a stored or user-supplied type string. Matching is exact on
    /// the lowercased trimmed value; anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "income" => Some(TransactionType::Income),
            "expense" => Some(TransactionType::Expense),
            "investment" => Some(TransactionType::Investment),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted transaction. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub txn_id: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub txn_type: TransactionType,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub user_id: Option<String>,
}

/// Insert shape for a transaction, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub txn_type: TransactionType,
    pub category_id: Option<i64>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub user_id: Option<String>,
}

/// Typed update for a transaction. Only the fields enumerated here can
/// change; the nullable columns use a nested `Option` so a patch can set
/// them back to NULL.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub txn_type: Option<TransactionType>,
    pub category_id: Option<Option<i64>>,
    pub description: Option<Option<String>>,
    pub tags: Option<Option<String>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.txn_type.is_none()
            && self.category_id.is_none()
            && self.description.is_none()
            && self.tags.is_none()
    }
}
