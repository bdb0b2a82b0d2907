use std::sync::Arc;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::dividends_model::{Dividend, DividendDB, DividendUpdateDB, NewDividend};
use super::dividends_traits::DividendRepositoryTrait;
use super::DividendError;
use crate::constants::ROUNDING_SCALE;
use crate::db::{get_connection, DbPool};
use crate::schema::{assets, dividends};
use crate::Result;

/// Repository for managing dividend data in the database
pub struct DividendRepository {
    pool: Arc<DbPool>,
}

impl DividendRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn to_db(new_dividend: NewDividend) -> DividendDB {
        let now = Utc::now().naive_utc();
        DividendDB {
            id: Uuid::new_v4().to_string(),
            asset_id: new_dividend.asset_id,
            gross_amount: new_dividend
                .gross_amount
                .round_dp(ROUNDING_SCALE)
                .to_string(),
            tax_amount: new_dividend.tax_amount.round_dp(ROUNDING_SCALE).to_string(),
            net_amount: new_dividend.net_amount.round_dp(ROUNDING_SCALE).to_string(),
            payment_date: new_dividend.payment_date.naive_utc(),
            is_forecast: new_dividend.is_forecast,
            source: new_dividend.source,
            notes: new_dividend.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

impl DividendRepositoryTrait for DividendRepository {
    fn get_dividend(&self, dividend_id: &str) -> Result<Dividend> {
        let mut conn = get_connection(&self.pool)?;

        dividends::table
            .find(dividend_id)
            .first::<DividendDB>(&mut conn)
            .map(Dividend::from)
            .map_err(DividendError::from)
            .map_err(Into::into)
    }

    fn get_dividends_for_asset(&self, asset_id: &str) -> Result<Vec<Dividend>> {
        let mut conn = get_connection(&self.pool)?;

        dividends::table
            .filter(dividends::asset_id.eq(asset_id))
            .order(dividends::payment_date.asc())
            .load::<DividendDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Dividend::from).collect())
            .map_err(DividendError::from)
            .map_err(Into::into)
    }

    fn get_upcoming_for_portfolio(
        &self,
        portfolio_id: &str,
        from: DateTime<Utc>,
    ) -> Result<Vec<Dividend>> {
        let mut conn = get_connection(&self.pool)?;

        dividends::table
            .inner_join(assets::table)
            .filter(assets::portfolio_id.eq(portfolio_id))
            .filter(dividends::payment_date.ge(from.naive_utc()))
            .order(dividends::payment_date.asc())
            .select(DividendDB::as_select())
            .load::<DividendDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Dividend::from).collect())
            .map_err(DividendError::from)
            .map_err(Into::into)
    }

    fn create_dividend(&self, new_dividend: NewDividend) -> Result<Dividend> {
        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(dividends::table)
            .values(&Self::to_db(new_dividend))
            .get_result::<DividendDB>(&mut conn)
            .map(Dividend::from)
            .map_err(DividendError::from)
            .map_err(Into::into)
    }

    fn update_dividend(&self, dividend_id: &str, update: DividendUpdateDB) -> Result<Dividend> {
        let mut conn = get_connection(&self.pool)?;

        diesel::update(dividends::table.find(dividend_id))
            .set(&update)
            .get_result::<DividendDB>(&mut conn)
            .map(Dividend::from)
            .map_err(DividendError::from)
            .map_err(Into::into)
    }

    fn delete_dividend(&self, dividend_id: &str) -> Result<Dividend> {
        let mut conn = get_connection(&self.pool)?;

        let dividend = dividends::table
            .find(dividend_id)
            .first::<DividendDB>(&mut conn)
            .map_err(DividendError::from)?;

        diesel::delete(dividends::table.find(dividend_id))
            .execute(&mut conn)
            .map_err(DividendError::from)?;

        Ok(dividend.into())
    }
}
