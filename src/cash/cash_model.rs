use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::CashError;

pub const CASH_TYPE_DEPOSIT: &str = "DEPOSIT";
pub const CASH_TYPE_WITHDRAWAL: &str = "WITHDRAWAL";
pub const CASH_TYPE_DIVIDEND: &str = "DIVIDEND";
pub const CASH_TYPE_SALE: &str = "SALE";
pub const CASH_TYPE_PURCHASE: &str = "PURCHASE";

/// Typed cash entry kind, each with a fixed sign convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashTransactionType {
    Deposit,
    Withdrawal,
    Dividend,
    Sale,
    Purchase,
}

impl CashTransactionType {
    /// Fixed sign table: money in is positive, money out negative.
    pub fn sign(&self) -> Decimal {
        match self {
            CashTransactionType::Deposit
            | CashTransactionType::Dividend
            | CashTransactionType::Sale => Decimal::ONE,
            CashTransactionType::Withdrawal | CashTransactionType::Purchase => -Decimal::ONE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CashTransactionType::Deposit => CASH_TYPE_DEPOSIT,
            CashTransactionType::Withdrawal => CASH_TYPE_WITHDRAWAL,
            CashTransactionType::Dividend => CASH_TYPE_DIVIDEND,
            CashTransactionType::Sale => CASH_TYPE_SALE,
            CashTransactionType::Purchase => CASH_TYPE_PURCHASE,
        }
    }
}

impl FromStr for CashTransactionType {
    type Err = CashError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            CASH_TYPE_DEPOSIT => Ok(CashTransactionType::Deposit),
            CASH_TYPE_WITHDRAWAL => Ok(CashTransactionType::Withdrawal),
            CASH_TYPE_DIVIDEND => Ok(CashTransactionType::Dividend),
            CASH_TYPE_SALE => Ok(CashTransactionType::Sale),
            CASH_TYPE_PURCHASE => Ok(CashTransactionType::Purchase),
            other => Err(CashError::InvalidData(format!(
                "Invalid cash transaction type: {}",
                other
            ))),
        }
    }
}

/// Domain model for one (portfolio, currency) running balance.
///
/// The balance equals the sum of all of the position's entry amounts at
/// all times; a negative balance is a transient state, not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashPosition {
    pub id: String,
    pub portfolio_id: String,
    pub currency: String,
    pub amount: Decimal,
    pub last_updated: DateTime<Utc>,
}

/// Database model for cash positions
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::cash_positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CashPositionDB {
    pub id: String,
    pub portfolio_id: String,
    pub currency: String,
    pub amount: String,
    pub last_updated: NaiveDateTime,
}

/// Domain model for one signed ledger entry.
///
/// `amount` is stored already sign-adjusted, so reversing an entry is
/// always `position.amount -= entry.amount` regardless of its type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashTransaction {
    pub id: String,
    pub cash_position_id: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub related_transaction_id: Option<String>,
    pub related_dividend_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database model for cash transactions
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::cash_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CashTransactionDB {
    pub id: String,
    pub cash_position_id: String,
    pub transaction_type: String,
    pub amount: String,
    pub transaction_date: NaiveDateTime,
    pub related_transaction_id: Option<String>,
    pub related_dividend_id: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for posting a new cash entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCashEntry {
    pub portfolio_id: String,
    pub currency: String,
    pub transaction_type: CashTransactionType,
    /// Unsigned magnitude; the stored amount is `magnitude * type.sign()`.
    pub magnitude: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub related_transaction_id: Option<String>,
    pub related_dividend_id: Option<String>,
}

impl NewCashEntry {
    pub fn validate(&self) -> super::Result<()> {
        if self.portfolio_id.trim().is_empty() {
            return Err(CashError::InvalidData(
                "Portfolio ID cannot be empty".to_string(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(CashError::InvalidData(
                "Currency cannot be empty".to_string(),
            ));
        }
        if !self.magnitude.is_sign_positive() || self.magnitude.is_zero() {
            return Err(CashError::InvalidData(format!(
                "Cash entry magnitude must be positive, got {}",
                self.magnitude
            )));
        }
        Ok(())
    }
}

/// Response shape for a posted entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedCashEntry {
    pub entry: CashTransaction,
    pub new_position_amount: Decimal,
}

/// One day of realized cash movement for a (portfolio, currency) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCashFlow {
    pub date: NaiveDate,
    pub balance: Decimal,
    pub change: Decimal,
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub dividends: Decimal,
    pub purchases: Decimal,
    pub sales: Decimal,
}

impl DailyCashFlow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            balance: Decimal::ZERO,
            change: Decimal::ZERO,
            deposits: Decimal::ZERO,
            withdrawals: Decimal::ZERO,
            dividends: Decimal::ZERO,
            purchases: Decimal::ZERO,
            sales: Decimal::ZERO,
        }
    }
}

impl From<CashPositionDB> for CashPosition {
    fn from(db: CashPositionDB) -> Self {
        Self {
            id: db.id,
            portfolio_id: db.portfolio_id,
            currency: db.currency,
            amount: Decimal::from_str(&db.amount).unwrap_or_default(),
            last_updated: DateTime::from_naive_utc_and_offset(db.last_updated, Utc),
        }
    }
}

impl From<CashTransactionDB> for CashTransaction {
    fn from(db: CashTransactionDB) -> Self {
        Self {
            id: db.id,
            cash_position_id: db.cash_position_id,
            transaction_type: db.transaction_type,
            amount: Decimal::from_str(&db.amount).unwrap_or_default(),
            transaction_date: DateTime::from_naive_utc_and_offset(db.transaction_date, Utc),
            related_transaction_id: db.related_transaction_id,
            related_dividend_id: db.related_dividend_id,
            created_at: DateTime::from_naive_utc_and_offset(db.created_at, Utc),
        }
    }
}
