use chrono::{DateTime, Utc};

use super::import::ReplayItem;
use super::transactions_model::{
    BulkImportResult, NewTransaction, RecordedTransaction, Transaction,
};
use crate::cost_basis::CostBasisMethod;
use crate::models::SagaOutcome;
use crate::Result;

/// Trait defining the contract for transaction repository operations.
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    /// Transactions for one asset, ascending by date.
    fn get_transactions_for_asset(&self, asset_id: &str) -> Result<Vec<Transaction>>;
    fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    /// Inserts a batch in one database transaction.
    fn create_transactions(&self, new_transactions: Vec<NewTransaction>) -> Result<Vec<Transaction>>;
    /// Administrative delete; asset aggregates are not rolled back.
    fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction>;
}

/// Trait defining the contract for transaction service operations.
pub trait TransactionServiceTrait: Send + Sync {
    /// Records a single BUY or SELL, updating both cost-basis projections
    /// and posting the matching cash entry best-effort. `now` is the
    /// reference instant for the future-date check.
    fn record_transaction(
        &self,
        new_transaction: NewTransaction,
        method: CostBasisMethod,
        now: DateTime<Utc>,
    ) -> Result<SagaOutcome<RecordedTransaction>>;

    /// Incremental bulk import: replays a historical batch on top of the
    /// asset's current state. An empty batch succeeds as a no-op.
    fn import_transactions(
        &self,
        asset_id: &str,
        items: Vec<ReplayItem>,
        now: DateTime<Utc>,
    ) -> Result<BulkImportResult>;

    /// Whole-asset backfill: derives the asset's state from scratch out
    /// of a historical batch. The asset must have no recorded
    /// transactions; an empty batch is rejected with `EmptyBatch`.
    fn backfill_asset(
        &self,
        asset_id: &str,
        items: Vec<ReplayItem>,
        now: DateTime<Utc>,
    ) -> Result<BulkImportResult>;

    fn get_transactions_for_asset(&self, asset_id: &str) -> Result<Vec<Transaction>>;
    fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction>;
}
