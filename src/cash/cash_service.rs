use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use super::cash_model::{
    CashPosition, CashTransaction, CashTransactionType, DailyCashFlow, NewCashEntry,
    PostedCashEntry,
};
use super::cash_traits::{CashRepositoryTrait, CashServiceTrait};
use crate::Result;

/// Service maintaining the signed per-currency cash ledger
pub struct CashService {
    cash_repository: Arc<dyn CashRepositoryTrait>,
}

impl CashService {
    pub fn new(cash_repository: Arc<dyn CashRepositoryTrait>) -> Self {
        Self { cash_repository }
    }
}

impl CashServiceTrait for CashService {
    /// Posts a ledger entry; the stored amount is the magnitude adjusted
    /// by the entry type's fixed sign.
    fn post_entry(&self, entry: NewCashEntry) -> Result<PostedCashEntry> {
        entry.validate()?;

        let position = self
            .cash_repository
            .get_or_create_position(&entry.portfolio_id, &entry.currency)?;

        let signed_amount = entry.magnitude * entry.transaction_type.sign();

        debug!(
            "Posting {} cash entry of {} against position {}",
            entry.transaction_type.as_str(),
            signed_amount,
            position.id
        );

        self.cash_repository
            .insert_entry(&position.id, entry, signed_amount)
    }

    /// Reverses a posted entry, restoring the pre-post balance exactly.
    fn reverse_entry(&self, entry_id: &str) -> Result<CashPosition> {
        self.cash_repository.delete_entry(entry_id)
    }

    fn get_positions(&self, portfolio_id: &str) -> Result<Vec<CashPosition>> {
        self.cash_repository.get_positions_for_portfolio(portfolio_id)
    }

    fn get_entries(&self, position_id: &str) -> Result<Vec<CashTransaction>> {
        self.cash_repository.get_entries_for_position(position_id)
    }

    fn daily_flows(&self, portfolio_id: &str, currency: &str) -> Result<Vec<DailyCashFlow>> {
        let positions = self
            .cash_repository
            .get_positions_for_portfolio(portfolio_id)?;

        let mut entries: Vec<CashTransaction> = Vec::new();
        for position in positions.iter().filter(|p| p.currency == currency) {
            entries.extend(self.cash_repository.get_entries_for_position(&position.id)?);
        }
        entries.sort_by_key(|e| e.transaction_date);

        let mut by_date: BTreeMap<NaiveDate, DailyCashFlow> = BTreeMap::new();
        for entry in &entries {
            let date = entry.transaction_date.date_naive();
            let day = by_date
                .entry(date)
                .or_insert_with(|| DailyCashFlow::new(date));

            day.change += entry.amount;
            match CashTransactionType::from_str(&entry.transaction_type) {
                Ok(CashTransactionType::Deposit) => day.deposits += entry.amount,
                Ok(CashTransactionType::Withdrawal) => day.withdrawals += entry.amount,
                Ok(CashTransactionType::Dividend) => day.dividends += entry.amount,
                Ok(CashTransactionType::Sale) => day.sales += entry.amount,
                Ok(CashTransactionType::Purchase) => day.purchases += entry.amount,
                Err(_) => {
                    log::warn!(
                        "Cash entry {} has unknown type '{}'; counted in change only",
                        entry.id,
                        entry.transaction_type
                    );
                }
            }
        }

        let mut running = Decimal::ZERO;
        let mut series: Vec<DailyCashFlow> = Vec::with_capacity(by_date.len());
        for (_, mut day) in by_date {
            running += day.change;
            day.balance = running;
            series.push(day);
        }

        Ok(series)
    }
}
