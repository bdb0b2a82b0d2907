use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DISPLAY_DECIMAL_PRECISION, ROUNDING_SCALE};

use super::DividendError;

/// Predicted payment, not yet received.
pub const DIVIDEND_SOURCE_FORECAST: &str = "FORECAST";
/// Realized payment entered directly by the user.
pub const DIVIDEND_SOURCE_MANUAL: &str = "MANUAL";
/// Realized payment produced by confirming a forecast.
pub const DIVIDEND_SOURCE_CONFIRMED: &str = "CONFIRMED";

/// Domain model for one dividend record.
///
/// A record starts life as a forecast and either gets confirmed with
/// actual amounts (terminal) or dismissed (deleted). `net_amount` is
/// always `gross_amount - tax_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    pub id: String,
    pub asset_id: String,
    pub gross_amount: Decimal,
    pub tax_amount: Decimal,
    pub net_amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub is_forecast: bool,
    pub source: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for dividends; decimals are stored as TEXT
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::dividends)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DividendDB {
    pub id: String,
    pub asset_id: String,
    pub gross_amount: String,
    pub tax_amount: String,
    pub net_amount: String,
    pub payment_date: NaiveDateTime,
    pub is_forecast: bool,
    pub source: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Fully computed dividend row ready for insertion; built by the service
#[derive(Debug, Clone)]
pub struct NewDividend {
    pub asset_id: String,
    pub gross_amount: Decimal,
    pub tax_amount: Decimal,
    pub net_amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub is_forecast: bool,
    pub source: String,
    pub notes: Option<String>,
}

/// Changeset applied when a forecast is confirmed
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::dividends)]
pub struct DividendUpdateDB {
    pub gross_amount: String,
    pub tax_amount: String,
    pub net_amount: String,
    pub payment_date: NaiveDateTime,
    pub is_forecast: bool,
    pub source: String,
    pub notes: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Input model for forecasting a dividend against a held asset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDividendForecast {
    pub asset_id: String,
    /// Expected payment per held share.
    pub per_share_amount: Decimal,
    pub expected_date: DateTime<Utc>,
    /// Fraction withheld, e.g. `0.15` for 15%.
    pub tax_rate: Decimal,
    pub notes: Option<String>,
}

impl NewDividendForecast {
    pub fn validate(&self) -> super::Result<()> {
        if self.asset_id.trim().is_empty() {
            return Err(DividendError::InvalidData(
                "Asset ID cannot be empty".to_string(),
            ));
        }
        if !self.per_share_amount.is_sign_positive() || self.per_share_amount.is_zero() {
            return Err(DividendError::InvalidData(format!(
                "Per-share amount must be positive, got {}",
                self.per_share_amount
            )));
        }
        if self.tax_rate.is_sign_negative() || self.tax_rate >= Decimal::ONE {
            return Err(DividendError::InvalidData(format!(
                "Tax rate must be within [0, 1), got {}",
                self.tax_rate
            )));
        }
        Ok(())
    }

    /// Forecast arithmetic: `gross = per_share * quantity`,
    /// `tax = gross * rate`, `net = gross - tax`.
    pub fn amounts(&self, quantity: Decimal) -> (Decimal, Decimal, Decimal) {
        let gross = (self.per_share_amount * quantity).round_dp(ROUNDING_SCALE);
        let tax = (gross * self.tax_rate).round_dp(ROUNDING_SCALE);
        let net = gross - tax;
        (gross, tax, net)
    }
}

/// Input model for recording an already-received dividend directly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewManualDividend {
    pub asset_id: String,
    pub gross_amount: Decimal,
    pub tax_amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewManualDividend {
    pub fn validate(&self) -> super::Result<()> {
        if self.asset_id.trim().is_empty() {
            return Err(DividendError::InvalidData(
                "Asset ID cannot be empty".to_string(),
            ));
        }
        if !self.gross_amount.is_sign_positive() || self.gross_amount.is_zero() {
            return Err(DividendError::InvalidData(format!(
                "Gross amount must be positive, got {}",
                self.gross_amount
            )));
        }
        if self.tax_amount.is_sign_negative() {
            return Err(DividendError::InvalidData(format!(
                "Tax amount cannot be negative, got {}",
                self.tax_amount
            )));
        }
        if self.tax_amount > self.gross_amount {
            return Err(DividendError::InvalidData(format!(
                "Tax amount {} exceeds gross amount {}",
                self.tax_amount, self.gross_amount
            )));
        }
        Ok(())
    }
}

/// Input model for confirming a forecast with actual amounts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDividendRequest {
    pub dividend_id: String,
    pub actual_gross_amount: Decimal,
    pub actual_tax_amount: Decimal,
    /// Defaults to the forecast's expected date when absent.
    pub actual_payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl ConfirmDividendRequest {
    pub fn validate(&self) -> super::Result<()> {
        if !self.actual_gross_amount.is_sign_positive() || self.actual_gross_amount.is_zero() {
            return Err(DividendError::InvalidData(format!(
                "Actual gross amount must be positive, got {}",
                self.actual_gross_amount
            )));
        }
        if self.actual_tax_amount.is_sign_negative() {
            return Err(DividendError::InvalidData(format!(
                "Actual tax amount cannot be negative, got {}",
                self.actual_tax_amount
            )));
        }
        Ok(())
    }
}

/// Actual vs. forecast, for display after confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendComparison {
    pub forecast_gross: Decimal,
    pub actual_gross: Decimal,
    pub difference: Decimal,
    pub difference_percent: Decimal,
}

impl DividendComparison {
    pub fn new(forecast_gross: Decimal, actual_gross: Decimal) -> Self {
        let difference = actual_gross - forecast_gross;
        let difference_percent = if forecast_gross.is_zero() {
            Decimal::ZERO
        } else {
            (difference / forecast_gross * Decimal::ONE_HUNDRED)
                .round_dp(DISPLAY_DECIMAL_PRECISION)
        };
        Self {
            forecast_gross,
            actual_gross,
            difference,
            difference_percent,
        }
    }
}

/// Response shape for a confirmed forecast
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedDividend {
    pub dividend: Dividend,
    pub comparison: DividendComparison,
}

impl From<DividendDB> for Dividend {
    fn from(db: DividendDB) -> Self {
        Self {
            id: db.id,
            asset_id: db.asset_id,
            gross_amount: Decimal::from_str(&db.gross_amount).unwrap_or_default(),
            tax_amount: Decimal::from_str(&db.tax_amount).unwrap_or_default(),
            net_amount: Decimal::from_str(&db.net_amount).unwrap_or_default(),
            payment_date: DateTime::from_naive_utc_and_offset(db.payment_date, Utc),
            is_forecast: db.is_forecast,
            source: db.source,
            notes: db.notes,
            created_at: DateTime::from_naive_utc_and_offset(db.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(db.updated_at, Utc),
        }
    }
}
