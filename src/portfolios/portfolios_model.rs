use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::PortfolioError;

/// Domain model representing a portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub base_currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for portfolios
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::portfolios)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PortfolioDB {
    pub id: String,
    pub name: String,
    pub base_currency: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolio {
    pub id: Option<String>,
    pub name: String,
    pub base_currency: String,
}

impl NewPortfolio {
    pub fn validate(&self) -> super::Result<()> {
        if self.name.trim().is_empty() {
            return Err(PortfolioError::InvalidData(
                "Portfolio name cannot be empty".to_string(),
            ));
        }
        if self.base_currency.trim().is_empty() {
            return Err(PortfolioError::InvalidData(
                "Base currency cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl From<PortfolioDB> for Portfolio {
    fn from(db: PortfolioDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            base_currency: db.base_currency,
            created_at: DateTime::from_naive_utc_and_offset(db.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(db.updated_at, Utc),
        }
    }
}
