mod common;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use portfolio_ledger_core::cash::{CashServiceTrait, CashTransactionType, NewCashEntry};
use portfolio_ledger_core::cost_basis::{CostBasisMethod, LotRepositoryTrait};
use portfolio_ledger_core::transactions::{
    NewTransaction, TransactionServiceTrait, TRANSACTION_TYPE_BUY, TRANSACTION_TYPE_SELL,
};
use portfolio_ledger_core::assets::AssetRepositoryTrait;
use portfolio_ledger_core::portfolios::PortfolioRepositoryTrait;

fn clock() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
}

fn trade(
    asset_id: &str,
    transaction_type: &str,
    amount: rust_decimal::Decimal,
    price: rust_decimal::Decimal,
    day: u32,
) -> NewTransaction {
    NewTransaction {
        id: None,
        asset_id: asset_id.to_string(),
        transaction_type: transaction_type.to_string(),
        amount,
        price,
        transaction_date: Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
        transaction_cost: None,
        realized_gain_loss: None,
    }
}

#[test]
fn buy_updates_aggregates_lot_and_cash() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "AAPL");

    ctx.cash
        .post_entry(NewCashEntry {
            portfolio_id: portfolio.id.clone(),
            currency: "USD".to_string(),
            transaction_type: CashTransactionType::Deposit,
            magnitude: dec!(10000),
            transaction_date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            related_transaction_id: None,
            related_dividend_id: None,
        })
        .unwrap();

    let mut buy = trade(&asset.id, TRANSACTION_TYPE_BUY, dec!(10), dec!(100), 2);
    buy.transaction_cost = Some(dec!(5));
    let outcome = ctx
        .transactions
        .record_transaction(buy, CostBasisMethod::AverageCost, clock())
        .unwrap();

    assert!(!outcome.is_partial());
    let recorded = outcome.into_value();
    assert_eq!(recorded.new_quantity, dec!(10));
    assert_eq!(recorded.new_average_buy_price, dec!(100));
    assert_eq!(recorded.realized_gain_loss, None);

    let refreshed = ctx.assets.get_asset(&asset.id).unwrap();
    assert_eq!(refreshed.quantity, dec!(10));
    assert_eq!(refreshed.average_buy_price, dec!(100));

    let lots = ctx.lots.get_lots_for_asset(&asset.id).unwrap();
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].remaining_quantity, dec!(10));
    assert_eq!(lots[0].cost_basis, dec!(1000));
    assert_eq!(lots[0].transaction_id, recorded.transaction.id);

    // 10000 deposit - (10 * 100 + 5) purchase
    let positions = ctx.cash.get_positions(&portfolio.id).unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0].amount, dec!(8995));
}

#[test]
fn fifo_sell_spans_lots_and_posts_sale_proceeds() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "MSFT");

    ctx.transactions
        .record_transaction(
            trade(&asset.id, TRANSACTION_TYPE_BUY, dec!(10), dec!(100), 1),
            CostBasisMethod::Fifo,
            clock(),
        )
        .unwrap();
    ctx.transactions
        .record_transaction(
            trade(&asset.id, TRANSACTION_TYPE_BUY, dec!(5), dec!(120), 2),
            CostBasisMethod::Fifo,
            clock(),
        )
        .unwrap();

    let outcome = ctx
        .transactions
        .record_transaction(
            trade(&asset.id, TRANSACTION_TYPE_SELL, dec!(12), dec!(130), 3),
            CostBasisMethod::Fifo,
            clock(),
        )
        .unwrap();
    assert!(!outcome.is_partial());
    let recorded = outcome.into_value();

    // FIFO cost: 10 @ 100 + 2 @ 120 = 1240; proceeds 12 * 130 = 1560.
    assert_eq!(recorded.realized_gain_loss, Some(dec!(320)));
    assert_eq!(recorded.new_quantity, dec!(3));
    // Selling never moves the average buy price.
    assert_eq!(recorded.new_average_buy_price, dec!(106.66666667));

    let lots = ctx.lots.get_lots_for_asset(&asset.id).unwrap();
    assert_eq!(lots.len(), 2);
    assert_eq!(lots[0].remaining_quantity, dec!(0));
    assert_eq!(lots[1].remaining_quantity, dec!(3));

    // -1000 - 600 + 1560
    let positions = ctx.cash.get_positions(&portfolio.id).unwrap();
    assert_eq!(positions[0].amount, dec!(-40));
}

#[test]
fn average_cost_method_reports_from_the_other_projection() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "NVDA");

    ctx.transactions
        .record_transaction(
            trade(&asset.id, TRANSACTION_TYPE_BUY, dec!(10), dec!(100), 1),
            CostBasisMethod::AverageCost,
            clock(),
        )
        .unwrap();
    ctx.transactions
        .record_transaction(
            trade(&asset.id, TRANSACTION_TYPE_BUY, dec!(5), dec!(120), 2),
            CostBasisMethod::AverageCost,
            clock(),
        )
        .unwrap();

    let recorded = ctx
        .transactions
        .record_transaction(
            trade(&asset.id, TRANSACTION_TYPE_SELL, dec!(12), dec!(130), 3),
            CostBasisMethod::AverageCost,
            clock(),
        )
        .unwrap()
        .into_value();

    // (130 - 106.66666667) * 12, against the weighted average.
    assert_eq!(recorded.realized_gain_loss, Some(dec!(279.99999996)));

    // Lots are still consumed even though the average projection was
    // the one reported.
    let lots = ctx.lots.get_lots_for_asset(&asset.id).unwrap();
    assert_eq!(lots[0].remaining_quantity, dec!(0));
    assert_eq!(lots[1].remaining_quantity, dec!(3));
}

#[test]
fn oversell_is_rejected_without_mutation() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "TSLA");

    ctx.transactions
        .record_transaction(
            trade(&asset.id, TRANSACTION_TYPE_BUY, dec!(5), dec!(200), 1),
            CostBasisMethod::Fifo,
            clock(),
        )
        .unwrap();

    let err = ctx
        .transactions
        .record_transaction(
            trade(&asset.id, TRANSACTION_TYPE_SELL, dec!(10), dec!(210), 2),
            CostBasisMethod::Fifo,
            clock(),
        )
        .unwrap_err();
    assert!(err.to_string().contains("Insufficient quantity"));

    let refreshed = ctx.assets.get_asset(&asset.id).unwrap();
    assert_eq!(refreshed.quantity, dec!(5));
    assert_eq!(
        ctx.transactions
            .get_transactions_for_asset(&asset.id)
            .unwrap()
            .len(),
        1
    );
    let lots = ctx.lots.get_lots_for_asset(&asset.id).unwrap();
    assert_eq!(lots[0].remaining_quantity, dec!(5));
}

#[test]
fn future_dated_trade_is_rejected() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "AMZN");

    let mut buy = trade(&asset.id, TRANSACTION_TYPE_BUY, dec!(1), dec!(10), 1);
    buy.transaction_date = clock() + chrono::Duration::days(7);

    let err = ctx
        .transactions
        .record_transaction(buy, CostBasisMethod::Fifo, clock())
        .unwrap_err();
    assert!(err.to_string().contains("in the future"));

    // Dating the reference instant after the trade accepts it.
    let mut buy = trade(&asset.id, TRANSACTION_TYPE_BUY, dec!(1), dec!(10), 1);
    buy.transaction_date = clock() + chrono::Duration::days(7);
    let outcome = ctx
        .transactions
        .record_transaction(buy, CostBasisMethod::Fifo, clock() + chrono::Duration::days(8))
        .unwrap();
    assert!(!outcome.is_partial());
}

#[test]
fn reversing_a_cash_entry_restores_the_balance_exactly() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);

    let deposit = ctx
        .cash
        .post_entry(NewCashEntry {
            portfolio_id: portfolio.id.clone(),
            currency: "USD".to_string(),
            transaction_type: CashTransactionType::Deposit,
            magnitude: dec!(500),
            transaction_date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            related_transaction_id: None,
            related_dividend_id: None,
        })
        .unwrap();
    assert_eq!(deposit.new_position_amount, dec!(500));
    assert_eq!(deposit.entry.amount, dec!(500));

    let withdrawal = ctx
        .cash
        .post_entry(NewCashEntry {
            portfolio_id: portfolio.id.clone(),
            currency: "USD".to_string(),
            transaction_type: CashTransactionType::Withdrawal,
            magnitude: dec!(200),
            transaction_date: Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap(),
            related_transaction_id: None,
            related_dividend_id: None,
        })
        .unwrap();
    // Withdrawals are stored sign-adjusted.
    assert_eq!(withdrawal.entry.amount, dec!(-200));
    assert_eq!(withdrawal.new_position_amount, dec!(300));

    // Reversing subtracts the stored signed amount, adding the 200 back.
    let position = ctx.cash.reverse_entry(&withdrawal.entry.id).unwrap();
    assert_eq!(position.amount, dec!(500));

    let entries = ctx.cash.get_entries(&position.id).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, deposit.entry.id);
}

#[test]
fn deleting_a_portfolio_cascades() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "GOOG");

    ctx.transactions
        .record_transaction(
            trade(&asset.id, TRANSACTION_TYPE_BUY, dec!(2), dec!(50), 1),
            CostBasisMethod::Fifo,
            clock(),
        )
        .unwrap();

    ctx.portfolios.delete_portfolio(&portfolio.id).unwrap();

    assert!(ctx.assets.get_asset(&asset.id).is_err());
    assert!(ctx
        .transactions
        .get_transactions_for_asset(&asset.id)
        .unwrap()
        .is_empty());
    assert!(ctx.lots.get_lots_for_asset(&asset.id).unwrap().is_empty());
}
