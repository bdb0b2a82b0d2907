use chrono::NaiveDate;

use super::cash_model::{CashPosition, CashTransaction, DailyCashFlow, NewCashEntry, PostedCashEntry};
use crate::Result;

/// Trait defining the contract for cash ledger repository operations.
pub trait CashRepositoryTrait: Send + Sync {
    fn get_position(&self, position_id: &str) -> Result<CashPosition>;
    fn get_positions_for_portfolio(&self, portfolio_id: &str) -> Result<Vec<CashPosition>>;
    fn get_or_create_position(&self, portfolio_id: &str, currency: &str) -> Result<CashPosition>;
    fn get_entries_for_position(&self, position_id: &str) -> Result<Vec<CashTransaction>>;
    fn get_entry(&self, entry_id: &str) -> Result<CashTransaction>;
    /// Inserts the entry row and applies its signed amount to the position
    /// balance in one database transaction.
    fn insert_entry(
        &self,
        position_id: &str,
        entry: NewCashEntry,
        signed_amount: rust_decimal::Decimal,
    ) -> Result<PostedCashEntry>;
    /// Deletes the entry row and subtracts its stored signed amount from
    /// the position balance in one database transaction.
    fn delete_entry(&self, entry_id: &str) -> Result<CashPosition>;
}

/// Trait defining the contract for cash ledger service operations.
pub trait CashServiceTrait: Send + Sync {
    fn post_entry(&self, entry: NewCashEntry) -> Result<PostedCashEntry>;
    fn reverse_entry(&self, entry_id: &str) -> Result<CashPosition>;
    fn get_positions(&self, portfolio_id: &str) -> Result<Vec<CashPosition>>;
    fn get_entries(&self, position_id: &str) -> Result<Vec<CashTransaction>>;
    /// Daily running-balance series for one (portfolio, currency) pair,
    /// ascending by date.
    fn daily_flows(&self, portfolio_id: &str, currency: &str) -> Result<Vec<DailyCashFlow>>;
}
