use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use super::transactions_model::{NewTransaction, Transaction, TransactionDB};
use super::transactions_traits::TransactionRepositoryTrait;
use super::TransactionError;
use crate::constants::ROUNDING_SCALE;
use crate::db::{get_connection, DbPool};
use crate::schema::transactions;
use crate::Result;

/// Repository for managing transaction data in the database
pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn to_db(new_transaction: NewTransaction) -> TransactionDB {
        TransactionDB {
            id: new_transaction
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            asset_id: new_transaction.asset_id,
            transaction_type: new_transaction.transaction_type,
            amount: new_transaction.amount.round_dp(ROUNDING_SCALE).to_string(),
            price: new_transaction.price.round_dp(ROUNDING_SCALE).to_string(),
            transaction_date: new_transaction.transaction_date.naive_utc(),
            transaction_cost: new_transaction
                .transaction_cost
                .map(|c| c.round_dp(ROUNDING_SCALE).to_string()),
            realized_gain_loss: new_transaction
                .realized_gain_loss
                .map(|g| g.round_dp(ROUNDING_SCALE).to_string()),
            created_at: Utc::now().naive_utc(),
        }
    }
}

impl TransactionRepositoryTrait for TransactionRepository {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;

        transactions::table
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .map(Transaction::from)
            .map_err(TransactionError::from)
            .map_err(Into::into)
    }

    fn get_transactions_for_asset(&self, asset_id: &str) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        transactions::table
            .filter(transactions::asset_id.eq(asset_id))
            .order((
                transactions::transaction_date.asc(),
                transactions::created_at.asc(),
            ))
            .load::<TransactionDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Transaction::from).collect())
            .map_err(TransactionError::from)
            .map_err(Into::into)
    }

    fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;

        new_transaction.validate()?;

        diesel::insert_into(transactions::table)
            .values(&Self::to_db(new_transaction))
            .get_result::<TransactionDB>(&mut conn)
            .map(Transaction::from)
            .map_err(TransactionError::from)
            .map_err(Into::into)
    }

    fn create_transactions(
        &self,
        new_transactions: Vec<NewTransaction>,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        for new_transaction in &new_transactions {
            new_transaction.validate()?;
        }

        let rows: Vec<TransactionDB> = new_transactions.into_iter().map(Self::to_db).collect();

        conn.transaction(|conn| {
            let mut created = Vec::with_capacity(rows.len());
            for row in &rows {
                let transaction = diesel::insert_into(transactions::table)
                    .values(row)
                    .get_result::<TransactionDB>(conn)
                    .map(Transaction::from)?;
                created.push(transaction);
            }
            Ok::<_, diesel::result::Error>(created)
        })
        .map_err(TransactionError::from)
        .map_err(Into::into)
    }

    fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;

        let transaction = transactions::table
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .map_err(TransactionError::from)?;

        diesel::delete(transactions::table.find(transaction_id))
            .execute(&mut conn)
            .map_err(TransactionError::from)?;

        Ok(transaction.into())
    }
}
