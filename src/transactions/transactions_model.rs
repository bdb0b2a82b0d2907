use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transactions_constants::*;
use super::TransactionError;

/// Buy or sell against one asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => TRANSACTION_TYPE_BUY,
            TransactionType::Sell => TRANSACTION_TYPE_SELL,
        }
    }
}

impl FromStr for TransactionType {
    type Err = TransactionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            TRANSACTION_TYPE_BUY => Ok(TransactionType::Buy),
            TRANSACTION_TYPE_SELL => Ok(TransactionType::Sell),
            other => Err(TransactionError::InvalidData(format!(
                "Invalid transaction type: {}",
                other
            ))),
        }
    }
}

/// Domain model for one BUY or SELL event.
///
/// Immutable once created except for administrative correction; ordering
/// by `transaction_date` is what matters when reconstructing asset state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub asset_id: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub transaction_cost: Option<Decimal>,
    /// Set only for SELL, at the moment the sale is recorded.
    pub realized_gain_loss: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Database model for transactions; decimals are stored as TEXT
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct TransactionDB {
    pub id: String,
    pub asset_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub price: String,
    pub transaction_date: NaiveDateTime,
    pub transaction_cost: Option<String>,
    pub realized_gain_loss: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for creating a new transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub id: Option<String>,
    pub asset_id: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub price: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub transaction_cost: Option<Decimal>,
    /// Computed by the engine for SELLs; callers leave it unset.
    pub realized_gain_loss: Option<Decimal>,
}

impl NewTransaction {
    pub fn validate(&self) -> super::Result<()> {
        if self.asset_id.trim().is_empty() {
            return Err(TransactionError::InvalidData(
                "Asset ID cannot be empty".to_string(),
            ));
        }
        TransactionType::from_str(&self.transaction_type)?;
        if !self.amount.is_sign_positive() || self.amount.is_zero() {
            return Err(TransactionError::InvalidData(format!(
                "Transaction amount must be positive, got {}",
                self.amount
            )));
        }
        if self.price.is_sign_negative() {
            return Err(TransactionError::InvalidData(format!(
                "Transaction price cannot be negative, got {}",
                self.price
            )));
        }
        if let Some(cost) = self.transaction_cost {
            if cost.is_sign_negative() {
                return Err(TransactionError::InvalidData(format!(
                    "Transaction cost cannot be negative, got {}",
                    cost
                )));
            }
        }
        Ok(())
    }
}

/// Result of recording a single BUY or SELL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedTransaction {
    pub transaction: Transaction,
    pub new_quantity: Decimal,
    pub new_average_buy_price: Decimal,
    pub realized_gain_loss: Option<Decimal>,
}

/// Summary returned by the bulk importer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkImportResult {
    pub created: usize,
    pub failed: usize,
    pub transactions: Vec<Transaction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            id: db.id,
            asset_id: db.asset_id,
            transaction_type: db.transaction_type,
            amount: Decimal::from_str(&db.amount).unwrap_or_default(),
            price: Decimal::from_str(&db.price).unwrap_or_default(),
            transaction_date: DateTime::from_naive_utc_and_offset(db.transaction_date, Utc),
            transaction_cost: db
                .transaction_cost
                .as_deref()
                .and_then(|s| Decimal::from_str(s).ok()),
            realized_gain_loss: db
                .realized_gain_loss
                .as_deref()
                .and_then(|s| Decimal::from_str(s).ok()),
            created_at: DateTime::from_naive_utc_and_offset(db.created_at, Utc),
        }
    }
}
