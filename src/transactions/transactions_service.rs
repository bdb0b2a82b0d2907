use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, warn};
use rust_decimal::Decimal;

use super::import::{replay_batch, ReplayItem};
use super::transactions_model::{
    BulkImportResult, NewTransaction, RecordedTransaction, Transaction, TransactionType,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use super::TransactionError;
use crate::assets::AssetRepositoryTrait;
use crate::cash::{CashServiceTrait, CashTransactionType, NewCashEntry};
use crate::constants::ROUNDING_SCALE;
use crate::cost_basis::{
    apply_buy, apply_sell, consume_fifo, realized_gain_loss, validate_sufficient_quantity,
    CostBasisMethod, LotRepositoryTrait, NewLot,
};
use crate::models::SagaOutcome;
use crate::Result;

/// Orchestrates the trade-recording saga: the immutable transaction row
/// is written first and is the source of truth; lot updates, asset
/// aggregates, and the cash entry follow best-effort, with any failure
/// surfaced as a warning instead of rolling the record back.
pub struct TransactionService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    lot_repository: Arc<dyn LotRepositoryTrait>,
    cash_service: Arc<dyn CashServiceTrait>,
}

impl TransactionService {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        lot_repository: Arc<dyn LotRepositoryTrait>,
        cash_service: Arc<dyn CashServiceTrait>,
    ) -> Self {
        Self {
            transaction_repository,
            asset_repository,
            lot_repository,
            cash_service,
        }
    }

    fn post_trade_cash(
        &self,
        portfolio_id: &str,
        currency: &str,
        transaction: &Transaction,
        warnings: &mut Vec<String>,
    ) {
        let cost = transaction.transaction_cost.unwrap_or(Decimal::ZERO);
        let (entry_type, magnitude) = match TransactionType::from_str(&transaction.transaction_type)
        {
            Ok(TransactionType::Buy) => (
                CashTransactionType::Purchase,
                transaction.amount * transaction.price + cost,
            ),
            Ok(TransactionType::Sell) => (
                CashTransactionType::Sale,
                transaction.amount * transaction.price - cost,
            ),
            Err(_) => return,
        };

        let entry = NewCashEntry {
            portfolio_id: portfolio_id.to_string(),
            currency: currency.to_string(),
            transaction_type: entry_type,
            magnitude: magnitude.round_dp(ROUNDING_SCALE),
            transaction_date: transaction.transaction_date,
            related_transaction_id: Some(transaction.id.clone()),
            related_dividend_id: None,
        };

        if let Err(e) = self.cash_service.post_entry(entry) {
            warn!(
                "Cash entry for transaction {} was not posted: {}",
                transaction.id, e
            );
            warnings.push(format!(
                "Transaction recorded but its cash entry was not posted: {}",
                e
            ));
        }
    }

    fn persist_replay_outcome(
        &self,
        asset_id: &str,
        outcome: super::import::ReplayOutcome,
    ) -> Result<BulkImportResult> {
        // Even a batch where every item failed reports a summary rather
        // than a hard error, so the caller can show the partial results.
        if outcome.applied.is_empty() {
            return Ok(BulkImportResult {
                created: 0,
                failed: outcome.errors.len(),
                transactions: Vec::new(),
                warnings: outcome.order_warnings,
                errors: outcome.errors,
            });
        }

        let transactions = self
            .transaction_repository
            .create_transactions(outcome.applied)?;

        let mut warnings = outcome.order_warnings;

        if !outcome.new_lots.is_empty() {
            if let Err(e) = self.lot_repository.create_lots(outcome.new_lots) {
                error!("Lot creation after import of {} failed: {}", asset_id, e);
                warnings.push(format!(
                    "Transactions recorded but lot creation failed: {}",
                    e
                ));
            }
        }
        if !outcome.lot_updates.is_empty() {
            if let Err(e) = self.lot_repository.apply_draws(&outcome.lot_updates) {
                error!("Lot updates after import of {} failed: {}", asset_id, e);
                warnings.push(format!(
                    "Transactions recorded but lot updates failed: {}",
                    e
                ));
            }
        }
        if let Err(e) = self.asset_repository.update_aggregates(
            asset_id,
            outcome.final_quantity,
            outcome.final_average_price,
        ) {
            error!("Aggregate update after import of {} failed: {}", asset_id, e);
            warnings.push(format!(
                "Transactions recorded but asset aggregates were not updated: {}",
                e
            ));
        }

        Ok(BulkImportResult {
            created: transactions.len(),
            failed: outcome.errors.len(),
            transactions,
            warnings,
            errors: outcome.errors,
        })
    }
}

impl TransactionServiceTrait for TransactionService {
    fn record_transaction(
        &self,
        new_transaction: NewTransaction,
        method: CostBasisMethod,
        now: DateTime<Utc>,
    ) -> Result<SagaOutcome<RecordedTransaction>> {
        new_transaction.validate()?;
        let transaction_type = TransactionType::from_str(&new_transaction.transaction_type)?;
        if new_transaction.transaction_date > now {
            return Err(TransactionError::FutureDate(new_transaction.transaction_date).into());
        }

        let asset = self.asset_repository.get_asset(&new_transaction.asset_id)?;
        let mut warnings = Vec::new();

        match transaction_type {
            TransactionType::Buy => {
                let (new_quantity, new_average_price) = apply_buy(
                    asset.quantity,
                    asset.average_buy_price,
                    new_transaction.amount,
                    new_transaction.price,
                )?;

                let transaction = self
                    .transaction_repository
                    .create_transaction(new_transaction)?;
                debug!("Recorded BUY {} for asset {}", transaction.id, asset.id);

                let lot = NewLot::from_buy(
                    &asset.id,
                    &transaction.id,
                    transaction.amount,
                    transaction.price,
                    transaction.transaction_date,
                );
                if let Err(e) = self.lot_repository.create_lot(lot) {
                    error!("Lot for transaction {} was not created: {}", transaction.id, e);
                    warnings.push(format!(
                        "Transaction recorded but its lot was not created: {}",
                        e
                    ));
                }

                if let Err(e) = self.asset_repository.update_aggregates(
                    &asset.id,
                    new_quantity,
                    new_average_price,
                ) {
                    error!("Aggregates for asset {} were not updated: {}", asset.id, e);
                    warnings.push(format!(
                        "Transaction recorded but asset aggregates were not updated: {}",
                        e
                    ));
                }

                self.post_trade_cash(&asset.portfolio_id, &asset.currency, &transaction, &mut warnings);

                Ok(SagaOutcome::from_warnings(
                    RecordedTransaction {
                        transaction,
                        new_quantity,
                        new_average_buy_price: new_average_price,
                        realized_gain_loss: None,
                    },
                    warnings,
                ))
            }
            TransactionType::Sell => {
                // All arithmetic and lot consumption is computed in memory
                // before anything is written, so a failing sale leaves no
                // partial state behind.
                validate_sufficient_quantity(asset.quantity, new_transaction.amount)
                    .map_err(crate::Error::from)?;
                let new_quantity = apply_sell(asset.quantity, new_transaction.amount)?;

                let lots = self.lot_repository.get_lots_for_asset(&asset.id)?;
                let has_lots = lots
                    .iter()
                    .any(|l| l.remaining_quantity.is_sign_positive());

                let average_realized = realized_gain_loss(
                    asset.average_buy_price,
                    new_transaction.price,
                    new_transaction.amount,
                )
                .round_dp(ROUNDING_SCALE);

                let (fifo_realized, draws) = if has_lots {
                    let consumption = consume_fifo(&lots, new_transaction.amount)?;
                    let realized = (new_transaction.amount * new_transaction.price
                        - consumption.total_cost_basis)
                        .round_dp(ROUNDING_SCALE);
                    (Some(realized), consumption.lots_used)
                } else {
                    // Assets predating lot tracking fall back to the
                    // average-cost projection.
                    warn!(
                        "Asset {} has no lots; FIFO reporting falls back to average cost",
                        asset.id
                    );
                    (None, Vec::new())
                };

                let reported = match method {
                    CostBasisMethod::AverageCost => average_realized,
                    CostBasisMethod::Fifo => fifo_realized.unwrap_or(average_realized),
                };

                let mut to_create = new_transaction;
                to_create.realized_gain_loss = Some(reported);
                let transaction = self.transaction_repository.create_transaction(to_create)?;
                debug!("Recorded SELL {} for asset {}", transaction.id, asset.id);

                if !draws.is_empty() {
                    if let Err(e) = self.lot_repository.apply_draws(&draws) {
                        error!(
                            "Lot draws for transaction {} were not applied: {}",
                            transaction.id, e
                        );
                        warnings.push(format!(
                            "Transaction recorded but lot draws were not applied: {}",
                            e
                        ));
                    }
                }

                // Selling leaves the average buy price untouched.
                if let Err(e) = self.asset_repository.update_aggregates(
                    &asset.id,
                    new_quantity,
                    asset.average_buy_price,
                ) {
                    error!("Aggregates for asset {} were not updated: {}", asset.id, e);
                    warnings.push(format!(
                        "Transaction recorded but asset aggregates were not updated: {}",
                        e
                    ));
                }

                self.post_trade_cash(&asset.portfolio_id, &asset.currency, &transaction, &mut warnings);

                Ok(SagaOutcome::from_warnings(
                    RecordedTransaction {
                        transaction,
                        new_quantity,
                        new_average_buy_price: asset.average_buy_price,
                        realized_gain_loss: Some(reported),
                    },
                    warnings,
                ))
            }
        }
    }

    fn import_transactions(
        &self,
        asset_id: &str,
        items: Vec<ReplayItem>,
        now: DateTime<Utc>,
    ) -> Result<BulkImportResult> {
        if items.is_empty() {
            return Ok(BulkImportResult::default());
        }

        let asset = self.asset_repository.get_asset(asset_id)?;
        let lots = self.lot_repository.get_lots_for_asset(asset_id)?;

        let outcome = replay_batch(
            asset_id,
            asset.quantity,
            asset.average_buy_price,
            &lots,
            items,
            now,
        )?;

        self.persist_replay_outcome(asset_id, outcome)
    }

    fn backfill_asset(
        &self,
        asset_id: &str,
        items: Vec<ReplayItem>,
        now: DateTime<Utc>,
    ) -> Result<BulkImportResult> {
        if items.is_empty() {
            return Err(TransactionError::EmptyBatch.into());
        }

        // Backfill derives the asset's state from the batch alone. An
        // asset with recorded history would keep its old transactions and
        // lots while the aggregates get overwritten, so it is rejected.
        self.asset_repository.get_asset(asset_id)?;
        let existing = self
            .transaction_repository
            .get_transactions_for_asset(asset_id)?;
        if !existing.is_empty() {
            return Err(TransactionError::InvalidData(format!(
                "Asset {} already has {} recorded transactions; backfill requires an empty history",
                asset_id,
                existing.len()
            ))
            .into());
        }

        let outcome = replay_batch(asset_id, Decimal::ZERO, Decimal::ZERO, &[], items, now)?;

        self.persist_replay_outcome(asset_id, outcome)
    }

    fn get_transactions_for_asset(&self, asset_id: &str) -> Result<Vec<Transaction>> {
        self.transaction_repository
            .get_transactions_for_asset(asset_id)
    }

    fn delete_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.transaction_repository
            .delete_transaction(transaction_id)
    }
}
