use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::cash_model::{
    CashPosition, CashPositionDB, CashTransaction, CashTransactionDB, NewCashEntry,
    PostedCashEntry,
};
use super::cash_traits::CashRepositoryTrait;
use super::CashError;
use crate::constants::ROUNDING_SCALE;
use crate::db::{get_connection, DbPool};
use crate::schema::{cash_positions, cash_transactions};
use crate::Result;

/// Repository for managing cash positions and ledger entries
pub struct CashRepository {
    pool: Arc<DbPool>,
}

impl CashRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl CashRepositoryTrait for CashRepository {
    fn get_position(&self, position_id: &str) -> Result<CashPosition> {
        let mut conn = get_connection(&self.pool)?;

        cash_positions::table
            .find(position_id)
            .first::<CashPositionDB>(&mut conn)
            .map(CashPosition::from)
            .map_err(CashError::from)
            .map_err(Into::into)
    }

    fn get_positions_for_portfolio(&self, portfolio_id: &str) -> Result<Vec<CashPosition>> {
        let mut conn = get_connection(&self.pool)?;

        cash_positions::table
            .filter(cash_positions::portfolio_id.eq(portfolio_id))
            .order(cash_positions::currency.asc())
            .load::<CashPositionDB>(&mut conn)
            .map(|rows| rows.into_iter().map(CashPosition::from).collect())
            .map_err(CashError::from)
            .map_err(Into::into)
    }

    fn get_or_create_position(&self, portfolio_id: &str, currency: &str) -> Result<CashPosition> {
        let mut conn = get_connection(&self.pool)?;

        let position_db = CashPositionDB {
            id: Uuid::new_v4().to_string(),
            portfolio_id: portfolio_id.to_string(),
            currency: currency.to_string(),
            amount: Decimal::ZERO.to_string(),
            last_updated: Utc::now().naive_utc(),
        };

        // Unique index on (portfolio_id, currency) makes this race-safe:
        // a concurrent insert wins and the follow-up select finds it.
        diesel::insert_into(cash_positions::table)
            .values(&position_db)
            .on_conflict((cash_positions::portfolio_id, cash_positions::currency))
            .do_nothing()
            .execute(&mut conn)
            .map_err(CashError::from)?;

        cash_positions::table
            .filter(cash_positions::portfolio_id.eq(portfolio_id))
            .filter(cash_positions::currency.eq(currency))
            .first::<CashPositionDB>(&mut conn)
            .map(CashPosition::from)
            .map_err(CashError::from)
            .map_err(Into::into)
    }

    fn get_entries_for_position(&self, position_id: &str) -> Result<Vec<CashTransaction>> {
        let mut conn = get_connection(&self.pool)?;

        cash_transactions::table
            .filter(cash_transactions::cash_position_id.eq(position_id))
            .order((
                cash_transactions::transaction_date.asc(),
                cash_transactions::created_at.asc(),
            ))
            .load::<CashTransactionDB>(&mut conn)
            .map(|rows| rows.into_iter().map(CashTransaction::from).collect())
            .map_err(CashError::from)
            .map_err(Into::into)
    }

    fn get_entry(&self, entry_id: &str) -> Result<CashTransaction> {
        let mut conn = get_connection(&self.pool)?;

        cash_transactions::table
            .find(entry_id)
            .first::<CashTransactionDB>(&mut conn)
            .map(CashTransaction::from)
            .map_err(CashError::from)
            .map_err(Into::into)
    }

    fn insert_entry(
        &self,
        position_id: &str,
        entry: NewCashEntry,
        signed_amount: Decimal,
    ) -> Result<PostedCashEntry> {
        let mut conn = get_connection(&self.pool)?;

        let entry_db = CashTransactionDB {
            id: Uuid::new_v4().to_string(),
            cash_position_id: position_id.to_string(),
            transaction_type: entry.transaction_type.as_str().to_string(),
            amount: signed_amount.round_dp(ROUNDING_SCALE).to_string(),
            transaction_date: entry.transaction_date.naive_utc(),
            related_transaction_id: entry.related_transaction_id,
            related_dividend_id: entry.related_dividend_id,
            created_at: Utc::now().naive_utc(),
        };

        let (created, new_amount) = conn
            .transaction(|conn| {
                let position = cash_positions::table
                    .find(position_id)
                    .first::<CashPositionDB>(conn)?;

                let new_amount = Decimal::from_str(&position.amount).unwrap_or_default()
                    + signed_amount;

                let created = diesel::insert_into(cash_transactions::table)
                    .values(&entry_db)
                    .get_result::<CashTransactionDB>(conn)?;

                diesel::update(cash_positions::table.find(position_id))
                    .set((
                        cash_positions::amount
                            .eq(new_amount.round_dp(ROUNDING_SCALE).to_string()),
                        cash_positions::last_updated.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)?;

                Ok::<_, diesel::result::Error>((created, new_amount))
            })
            .map_err(CashError::from)?;

        Ok(PostedCashEntry {
            entry: created.into(),
            new_position_amount: new_amount,
        })
    }

    fn delete_entry(&self, entry_id: &str) -> Result<CashPosition> {
        let mut conn = get_connection(&self.pool)?;

        let position_db = conn
            .transaction(|conn| {
                let entry = cash_transactions::table
                    .find(entry_id)
                    .first::<CashTransactionDB>(conn)?;

                let position = cash_positions::table
                    .find(&entry.cash_position_id)
                    .first::<CashPositionDB>(conn)?;

                // Stored amounts are signed, so subtracting always undoes
                // the entry's original effect.
                let new_amount = Decimal::from_str(&position.amount).unwrap_or_default()
                    - Decimal::from_str(&entry.amount).unwrap_or_default();

                diesel::delete(cash_transactions::table.find(entry_id)).execute(conn)?;

                diesel::update(cash_positions::table.find(&entry.cash_position_id))
                    .set((
                        cash_positions::amount
                            .eq(new_amount.round_dp(ROUNDING_SCALE).to_string()),
                        cash_positions::last_updated.eq(Utc::now().naive_utc()),
                    ))
                    .get_result::<CashPositionDB>(conn)
            })
            .map_err(CashError::from)?;

        Ok(position_db.into())
    }
}
