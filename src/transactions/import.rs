use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transactions_model::{NewTransaction, TransactionType};
use super::{Result, TransactionError};
use crate::constants::ROUNDING_SCALE;
use crate::cost_basis::{
    apply_buy, apply_sell, consume_fifo, realized_gain_loss, validate_sufficient_quantity,
    CostBasisError, CostBasisLot, LotDraw, NewLot,
};

/// One transaction in a historical import batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayItem {
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub price: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub transaction_cost: Option<Decimal>,
}

impl ReplayItem {
    fn validate(&self) -> Result<()> {
        if !self.amount.is_sign_positive() || self.amount.is_zero() {
            return Err(TransactionError::InvalidData(format!(
                "Transaction amount must be positive, got {}",
                self.amount
            )));
        }
        if self.price.is_sign_negative() {
            return Err(TransactionError::InvalidData(format!(
                "Transaction price cannot be negative, got {}",
                self.price
            )));
        }
        if let Some(cost) = self.transaction_cost {
            if cost.is_sign_negative() {
                return Err(TransactionError::InvalidData(format!(
                    "Transaction cost cannot be negative, got {}",
                    cost
                )));
            }
        }
        Ok(())
    }
}

/// Everything a replayed batch needs persisted afterwards
#[derive(Debug, Clone, Default)]
pub struct ReplayOutcome {
    /// Surviving transactions in applied (date) order, ids assigned and
    /// realized gain/loss filled in for SELLs.
    pub applied: Vec<NewTransaction>,
    /// Per-item failure strings, in applied order.
    pub errors: Vec<String>,
    /// Non-fatal notes about the input not being chronological.
    pub order_warnings: Vec<String>,
    pub final_quantity: Decimal,
    pub final_average_price: Decimal,
    /// Lots for the surviving BUYs, remaining quantity already net of
    /// later SELLs in the same batch.
    pub new_lots: Vec<NewLot>,
    /// Decrements against lots that existed before the batch.
    pub lot_updates: Vec<LotDraw>,
}

enum LotOrigin {
    Existing { original_remaining: Decimal },
    New { applied_index: usize },
}

/// Replays an unordered historical batch against a starting asset state.
///
/// The batch is rejected outright if any item is future-dated; otherwise
/// it is stable-sorted by date and applied sequentially. An item that
/// fails validation at its point in the sequence is recorded and
/// excluded, and later items continue from the last successfully applied
/// state. Pure: persistence of the outcome is the caller's concern.
pub fn replay_batch(
    asset_id: &str,
    start_quantity: Decimal,
    start_average_price: Decimal,
    existing_lots: &[CostBasisLot],
    items: Vec<ReplayItem>,
    now: DateTime<Utc>,
) -> Result<ReplayOutcome> {
    for item in &items {
        if item.transaction_date > now {
            return Err(TransactionError::FutureDate(item.transaction_date));
        }
    }

    let mut outcome = ReplayOutcome {
        final_quantity: start_quantity,
        final_average_price: start_average_price,
        ..Default::default()
    };

    for window in items.windows(2) {
        if window[1].transaction_date < window[0].transaction_date {
            outcome.order_warnings.push(format!(
                "Transaction dated {} was supplied after {}; the batch was re-sorted by date",
                window[1].transaction_date, window[0].transaction_date
            ));
        }
    }

    // Stable sort keeps the input order of same-dated items.
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&i| items[i].transaction_date);

    let mut lots: Vec<CostBasisLot> = existing_lots.to_vec();
    let mut origins: Vec<LotOrigin> = existing_lots
        .iter()
        .map(|lot| LotOrigin::Existing {
            original_remaining: lot.remaining_quantity,
        })
        .collect();

    let mut quantity = start_quantity;
    let mut average_price = start_average_price;

    for index in order {
        let item = &items[index];

        if let Err(e) = item.validate() {
            outcome.errors.push(format!("item {}: {}", index, e));
            continue;
        }

        match item.transaction_type {
            TransactionType::Buy => {
                let (new_quantity, new_average) =
                    match apply_buy(quantity, average_price, item.amount, item.price) {
                        Ok(pair) => pair,
                        Err(e) => {
                            outcome.errors.push(format!("item {}: {}", index, e));
                            continue;
                        }
                    };

                quantity = new_quantity;
                average_price = new_average;

                let transaction_id = Uuid::new_v4().to_string();
                let applied_index = outcome.applied.len();
                outcome.applied.push(NewTransaction {
                    id: Some(transaction_id.clone()),
                    asset_id: asset_id.to_string(),
                    transaction_type: item.transaction_type.as_str().to_string(),
                    amount: item.amount,
                    price: item.price,
                    transaction_date: item.transaction_date,
                    transaction_cost: item.transaction_cost,
                    realized_gain_loss: None,
                });

                // The transaction id doubles as the in-replay lot key.
                // `lots` must stay purchase-date ordered for consume_fifo;
                // a backfilled BUY can be older than the existing lots.
                let position = lots
                    .iter()
                    .position(|l| l.purchase_date > item.transaction_date)
                    .unwrap_or(lots.len());
                lots.insert(
                    position,
                    CostBasisLot {
                        id: transaction_id.clone(),
                        asset_id: asset_id.to_string(),
                        transaction_id,
                        quantity: item.amount,
                        cost_basis: (item.amount * item.price).round_dp(ROUNDING_SCALE),
                        remaining_quantity: item.amount,
                        purchase_date: item.transaction_date,
                        created_at: item.transaction_date,
                    },
                );
                origins.insert(position, LotOrigin::New { applied_index });
            }
            TransactionType::Sell => {
                if let Err(e) = validate_sufficient_quantity(quantity, item.amount) {
                    outcome.errors.push(format!("item {}: {}", index, e));
                    continue;
                }

                let realized = match sell_cost_basis(&lots, average_price, item) {
                    Ok((realized, draws)) => {
                        for draw in draws {
                            if let Some(pos) = lots.iter().position(|l| l.id == draw.lot_id) {
                                lots[pos].remaining_quantity = draw.remaining_after;
                            }
                        }
                        realized
                    }
                    Err(e) => {
                        outcome.errors.push(format!("item {}: {}", index, e));
                        continue;
                    }
                };

                quantity = match apply_sell(quantity, item.amount) {
                    Ok(new_quantity) => new_quantity,
                    Err(e) => {
                        outcome.errors.push(format!("item {}: {}", index, e));
                        continue;
                    }
                };

                outcome.applied.push(NewTransaction {
                    id: Some(Uuid::new_v4().to_string()),
                    asset_id: asset_id.to_string(),
                    transaction_type: item.transaction_type.as_str().to_string(),
                    amount: item.amount,
                    price: item.price,
                    transaction_date: item.transaction_date,
                    transaction_cost: item.transaction_cost,
                    realized_gain_loss: Some(realized),
                });
            }
        }
    }

    outcome.final_quantity = quantity;
    outcome.final_average_price = average_price;

    for (lot, origin) in lots.into_iter().zip(origins) {
        match origin {
            LotOrigin::Existing { original_remaining } => {
                if lot.remaining_quantity != original_remaining {
                    outcome.lot_updates.push(LotDraw {
                        lot_id: lot.id.clone(),
                        consumed: original_remaining - lot.remaining_quantity,
                        cost_basis: ((original_remaining - lot.remaining_quantity)
                            * lot.unit_cost())
                        .round_dp(ROUNDING_SCALE),
                        remaining_after: lot.remaining_quantity,
                    });
                }
            }
            LotOrigin::New { .. } => {
                outcome.new_lots.push(NewLot {
                    asset_id: lot.asset_id,
                    transaction_id: lot.transaction_id,
                    quantity: lot.quantity,
                    cost_basis: lot.cost_basis,
                    remaining_quantity: lot.remaining_quantity,
                    purchase_date: lot.purchase_date,
                });
            }
        }
    }

    Ok(outcome)
}

/// Realized gain/loss for one replayed SELL, plus the lot draws covering
/// it. Falls back to the average-cost projection when the asset has no
/// lots at this point in the sequence (assets predating lot tracking).
fn sell_cost_basis(
    lots: &[CostBasisLot],
    average_price: Decimal,
    item: &ReplayItem,
) -> std::result::Result<(Decimal, Vec<LotDraw>), CostBasisError> {
    if lots.iter().all(|l| !l.remaining_quantity.is_sign_positive()) {
        warn!(
            "No lots available for a sale of {}; falling back to average cost",
            item.amount
        );
        let realized = realized_gain_loss(average_price, item.price, item.amount)
            .round_dp(ROUNDING_SCALE);
        return Ok((realized, Vec::new()));
    }

    let consumption = consume_fifo(lots, item.amount)?;
    let blended_unit_cost = consumption.total_cost_basis / item.amount;
    let realized =
        realized_gain_loss(blended_unit_cost, item.price, item.amount).round_dp(ROUNDING_SCALE);
    Ok((realized, consumption.lots_used))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    fn buy(amount: Decimal, price: Decimal, d: u32) -> ReplayItem {
        ReplayItem {
            transaction_type: TransactionType::Buy,
            amount,
            price,
            transaction_date: day(d),
            transaction_cost: None,
        }
    }

    fn sell(amount: Decimal, price: Decimal, d: u32) -> ReplayItem {
        ReplayItem {
            transaction_type: TransactionType::Sell,
            amount,
            price,
            transaction_date: day(d),
            transaction_cost: None,
        }
    }

    fn now() -> DateTime<Utc> {
        day(28)
    }

    #[test]
    fn replays_buys_into_weighted_average() {
        let items = vec![buy(dec!(10), dec!(100), 1), buy(dec!(5), dec!(120), 2)];

        let outcome =
            replay_batch("asset-1", dec!(0), dec!(0), &[], items, now()).unwrap();

        assert_eq!(outcome.applied.len(), 2);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.final_quantity, dec!(15));
        assert_eq!(outcome.final_average_price, dec!(106.66666667));
        assert_eq!(outcome.new_lots.len(), 2);
    }

    #[test]
    fn sell_realizes_gain_and_leaves_average_unchanged() {
        let items = vec![buy(dec!(10), dec!(100), 1), sell(dec!(3), dec!(120), 2)];

        let outcome =
            replay_batch("asset-1", dec!(0), dec!(0), &[], items, now()).unwrap();

        assert_eq!(outcome.final_quantity, dec!(7));
        assert_eq!(outcome.final_average_price, dec!(100));
        assert_eq!(outcome.applied[1].realized_gain_loss, Some(dec!(60)));
        // The batch-created lot is partially consumed by the later sell.
        assert_eq!(outcome.new_lots.len(), 1);
        assert_eq!(outcome.new_lots[0].remaining_quantity, dec!(7));
    }

    #[test]
    fn future_dated_item_rejects_whole_batch() {
        let items = vec![buy(dec!(1), dec!(10), 1), buy(dec!(1), dec!(10), 20)];

        let err = replay_batch("asset-1", dec!(0), dec!(0), &[], items, day(10)).unwrap_err();
        assert!(matches!(err, TransactionError::FutureDate(_)));
    }

    #[test]
    fn out_of_order_input_warns_but_applies_sorted() {
        // Supplied sell-first, but the sell is dated before the buy, so
        // after sorting it runs against an empty position and fails while
        // the buy still succeeds.
        let items = vec![buy(dec!(5), dec!(100), 3), sell(dec!(10), dec!(120), 1)];

        let outcome =
            replay_batch("asset-1", dec!(0), dec!(0), &[], items, now()).unwrap();

        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("Insufficient quantity"));
        assert!(!outcome.order_warnings.is_empty());
        assert_eq!(outcome.final_quantity, dec!(5));
        assert_eq!(outcome.final_average_price, dec!(100));
    }

    #[test]
    fn result_is_input_order_independent() {
        let a = vec![
            buy(dec!(10), dec!(100), 1),
            sell(dec!(4), dec!(110), 3),
            buy(dec!(5), dec!(120), 2),
        ];
        let b = vec![a[2].clone(), a[0].clone(), a[1].clone()];

        let outcome_a = replay_batch("asset-1", dec!(0), dec!(0), &[], a, now()).unwrap();
        let outcome_b = replay_batch("asset-1", dec!(0), dec!(0), &[], b, now()).unwrap();

        assert_eq!(outcome_a.final_quantity, outcome_b.final_quantity);
        assert_eq!(outcome_a.final_average_price, outcome_b.final_average_price);
        assert_eq!(outcome_a.applied.len(), outcome_b.applied.len());
        assert_eq!(outcome_a.errors.len(), outcome_b.errors.len());

        let gains_a: Vec<_> = outcome_a
            .applied
            .iter()
            .map(|t| t.realized_gain_loss)
            .collect();
        let gains_b: Vec<_> = outcome_b
            .applied
            .iter()
            .map(|t| t.realized_gain_loss)
            .collect();
        assert_eq!(gains_a, gains_b);
    }

    #[test]
    fn failed_item_is_excluded_from_running_state() {
        let items = vec![
            buy(dec!(10), dec!(100), 1),
            sell(dec!(50), dec!(120), 2), // fails, state untouched
            sell(dec!(10), dec!(120), 3), // still covered by the buy
        ];

        let outcome =
            replay_batch("asset-1", dec!(0), dec!(0), &[], items, now()).unwrap();

        assert_eq!(outcome.applied.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.final_quantity, dec!(0));
    }

    #[test]
    fn sell_without_lots_falls_back_to_average_cost() {
        // Asset predates lot tracking: it has quantity but no lots.
        let items = vec![sell(dec!(2), dec!(120), 1)];

        let outcome =
            replay_batch("asset-1", dec!(10), dec!(100), &[], items, now()).unwrap();

        assert_eq!(outcome.applied.len(), 1);
        assert_eq!(outcome.applied[0].realized_gain_loss, Some(dec!(40)));
        assert_eq!(outcome.final_quantity, dec!(8));
        assert!(outcome.lot_updates.is_empty());
    }

    #[test]
    fn backdated_buy_is_consumed_before_newer_existing_lots() {
        // The asset already holds a lot from day 5; the batch backfills
        // an older buy. FIFO must draw the day-1 lot first.
        let lot = CostBasisLot {
            id: "lot-1".to_string(),
            asset_id: "asset-1".to_string(),
            transaction_id: "txn-0".to_string(),
            quantity: dec!(5),
            cost_basis: dec!(1000),
            remaining_quantity: dec!(5),
            purchase_date: day(5),
            created_at: day(5),
        };
        let items = vec![buy(dec!(5), dec!(100), 1), sell(dec!(5), dec!(300), 10)];

        let outcome =
            replay_batch("asset-1", dec!(5), dec!(200), &[lot], items, now()).unwrap();

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.applied[1].realized_gain_loss, Some(dec!(1000)));
        // The day-5 lot is untouched; the backfilled day-1 lot is drained.
        assert!(outcome.lot_updates.is_empty());
        assert_eq!(outcome.new_lots.len(), 1);
        assert_eq!(outcome.new_lots[0].remaining_quantity, dec!(0));
        assert_eq!(outcome.final_quantity, dec!(5));
    }

    #[test]
    fn sell_consumes_preexisting_lots() {
        let lot = CostBasisLot {
            id: "lot-1".to_string(),
            asset_id: "asset-1".to_string(),
            transaction_id: "txn-0".to_string(),
            quantity: dec!(10),
            cost_basis: dec!(1000),
            remaining_quantity: dec!(10),
            purchase_date: day(1),
            created_at: day(1),
        };
        let items = vec![sell(dec!(4), dec!(150), 2)];

        let outcome =
            replay_batch("asset-1", dec!(10), dec!(100), &[lot], items, now()).unwrap();

        assert_eq!(outcome.lot_updates.len(), 1);
        assert_eq!(outcome.lot_updates[0].lot_id, "lot-1");
        assert_eq!(outcome.lot_updates[0].remaining_after, dec!(6));
        assert_eq!(outcome.applied[0].realized_gain_loss, Some(dec!(200)));
    }
}
