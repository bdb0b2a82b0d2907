use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::QUANTITY_THRESHOLD;

use super::AssetError;

/// Domain model representing one tracked holding inside a portfolio.
///
/// `quantity * average_buy_price` approximates the remaining cost basis
/// under the average-cost method; the FIFO lot ledger tracks the same
/// holding as a second, independent projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub portfolio_id: String,
    pub symbol: String,
    pub asset_type: String,
    pub currency: String,
    pub quantity: Decimal,
    pub average_buy_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn holds_anything(&self) -> bool {
        let threshold = Decimal::from_str(QUANTITY_THRESHOLD).unwrap_or(Decimal::ZERO);
        self.quantity > threshold
    }
}

/// Database model for assets; decimals are stored as TEXT
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::assets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AssetDB {
    pub id: String,
    pub portfolio_id: String,
    pub symbol: String,
    pub asset_type: String,
    pub currency: String,
    pub quantity: String,
    pub average_buy_price: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new asset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub id: Option<String>,
    pub portfolio_id: String,
    pub symbol: String,
    pub asset_type: String,
    pub currency: String,
}

impl NewAsset {
    pub fn validate(&self) -> super::Result<()> {
        if self.portfolio_id.trim().is_empty() {
            return Err(AssetError::InvalidData(
                "Portfolio ID cannot be empty".to_string(),
            ));
        }
        if self.symbol.trim().is_empty() {
            return Err(AssetError::InvalidData(
                "Symbol cannot be empty".to_string(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(AssetError::InvalidData(
                "Currency cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<AssetDB> for Asset {
    fn from(db: AssetDB) -> Self {
        Self {
            id: db.id,
            portfolio_id: db.portfolio_id,
            symbol: db.symbol,
            asset_type: db.asset_type,
            currency: db.currency,
            quantity: Decimal::from_str(&db.quantity).unwrap_or_default(),
            average_buy_price: Decimal::from_str(&db.average_buy_price).unwrap_or_default(),
            created_at: DateTime::from_naive_utc_and_offset(db.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(db.updated_at, Utc),
        }
    }
}
