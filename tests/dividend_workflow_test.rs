mod common;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

use portfolio_ledger_core::assets::AssetRepositoryTrait;
use portfolio_ledger_core::cash::{CashServiceTrait, CashTransactionType, NewCashEntry};
use portfolio_ledger_core::cashflow::CashFlowServiceTrait;
use portfolio_ledger_core::dividends::{
    ConfirmDividendRequest, DividendServiceTrait, NewDividendForecast, NewManualDividend,
    DIVIDEND_SOURCE_CONFIRMED, DIVIDEND_SOURCE_FORECAST,
};

fn date(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap()
}

fn forecast_request(asset_id: &str) -> NewDividendForecast {
    NewDividendForecast {
        asset_id: asset_id.to_string(),
        per_share_amount: dec!(2.50),
        expected_date: date(6, 15),
        tax_rate: dec!(0.15),
        notes: None,
    }
}

#[test]
fn forecast_requires_a_held_position() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "AAPL");

    let err = ctx
        .dividends
        .create_forecast(forecast_request(&asset.id))
        .unwrap_err();
    assert!(err.to_string().contains("holds no quantity"));
}

#[test]
fn forecast_computes_amounts_from_held_quantity() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "AAPL");
    ctx.assets
        .update_aggregates(&asset.id, dec!(100), dec!(10))
        .unwrap();

    let dividend = ctx
        .dividends
        .create_forecast(forecast_request(&asset.id))
        .unwrap();

    assert!(dividend.is_forecast);
    assert_eq!(dividend.source, DIVIDEND_SOURCE_FORECAST);
    assert_eq!(dividend.gross_amount, dec!(250));
    assert_eq!(dividend.tax_amount, dec!(37.50));
    assert_eq!(dividend.net_amount, dec!(212.50));
}

#[test]
fn confirming_overwrites_with_actuals_and_posts_cash() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "MSFT");
    ctx.assets
        .update_aggregates(&asset.id, dec!(100), dec!(10))
        .unwrap();

    ctx.cash
        .post_entry(NewCashEntry {
            portfolio_id: portfolio.id.clone(),
            currency: "USD".to_string(),
            transaction_type: CashTransactionType::Deposit,
            magnitude: dec!(1000),
            transaction_date: date(5, 1),
            related_transaction_id: None,
            related_dividend_id: None,
        })
        .unwrap();

    let forecast = ctx
        .dividends
        .create_forecast(forecast_request(&asset.id))
        .unwrap();

    let outcome = ctx
        .dividends
        .confirm(ConfirmDividendRequest {
            dividend_id: forecast.id.clone(),
            actual_gross_amount: dec!(260),
            actual_tax_amount: dec!(39),
            actual_payment_date: Some(date(6, 18)),
            notes: None,
        })
        .unwrap();
    assert!(!outcome.is_partial());
    let confirmed = outcome.into_value();

    assert_eq!(confirmed.comparison.forecast_gross, dec!(250));
    assert_eq!(confirmed.comparison.actual_gross, dec!(260));
    assert_eq!(confirmed.comparison.difference, dec!(10));
    assert_eq!(confirmed.comparison.difference_percent, dec!(4));

    assert!(!confirmed.dividend.is_forecast);
    assert_eq!(confirmed.dividend.source, DIVIDEND_SOURCE_CONFIRMED);
    assert_eq!(confirmed.dividend.gross_amount, dec!(260));
    assert_eq!(confirmed.dividend.net_amount, dec!(221));
    assert_eq!(confirmed.dividend.payment_date, date(6, 18));

    // 1000 deposit + 221 net dividend.
    let positions = ctx.cash.get_positions(&portfolio.id).unwrap();
    assert_eq!(positions[0].amount, dec!(1221));

    let entries = ctx.cash.get_entries(&positions[0].id).unwrap();
    let dividend_entry = entries
        .iter()
        .find(|e| e.related_dividend_id.as_deref() == Some(forecast.id.as_str()))
        .unwrap();
    assert_eq!(dividend_entry.amount, dec!(221));
}

#[test]
fn confirming_twice_fails() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "NVDA");
    ctx.assets
        .update_aggregates(&asset.id, dec!(10), dec!(10))
        .unwrap();

    let forecast = ctx
        .dividends
        .create_forecast(forecast_request(&asset.id))
        .unwrap();

    let request = ConfirmDividendRequest {
        dividend_id: forecast.id.clone(),
        actual_gross_amount: dec!(30),
        actual_tax_amount: dec!(0),
        actual_payment_date: None,
        notes: None,
    };
    ctx.dividends.confirm(request.clone()).unwrap();

    let err = ctx.dividends.confirm(request).unwrap_err();
    assert!(err.to_string().contains("already confirmed"));
}

#[test]
fn dismissing_deletes_the_forecast_and_posts_nothing() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "TSLA");
    ctx.assets
        .update_aggregates(&asset.id, dec!(10), dec!(10))
        .unwrap();

    let forecast = ctx
        .dividends
        .create_forecast(forecast_request(&asset.id))
        .unwrap();

    ctx.dividends.dismiss(&forecast.id).unwrap();

    assert!(ctx
        .dividends
        .get_dividends_for_asset(&asset.id)
        .unwrap()
        .is_empty());
    assert!(ctx.cash.get_positions(&portfolio.id).unwrap().is_empty());
}

#[test]
fn dismissing_a_realized_dividend_fails() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "AMZN");

    let outcome = ctx
        .dividends
        .create_manual(NewManualDividend {
            asset_id: asset.id.clone(),
            gross_amount: dec!(100),
            tax_amount: dec!(20),
            payment_date: date(5, 10),
            notes: None,
        })
        .unwrap();
    let dividend = outcome.into_value();
    assert!(!dividend.is_forecast);
    assert_eq!(dividend.net_amount, dec!(80));

    // Manual dividends settle cash immediately.
    let positions = ctx.cash.get_positions(&portfolio.id).unwrap();
    assert_eq!(positions[0].amount, dec!(80));

    let err = ctx.dividends.dismiss(&dividend.id).unwrap_err();
    assert!(err.to_string().contains("not a forecast"));
}

#[test]
fn projection_continues_the_balance_through_upcoming_dividends() {
    let ctx = common::setup();
    let portfolio = common::seed_portfolio(&ctx);
    let asset = common::seed_asset(&ctx, &portfolio.id, "KO");
    ctx.assets
        .update_aggregates(&asset.id, dec!(100), dec!(10))
        .unwrap();

    ctx.cash
        .post_entry(NewCashEntry {
            portfolio_id: portfolio.id.clone(),
            currency: "USD".to_string(),
            transaction_type: CashTransactionType::Deposit,
            magnitude: dec!(1000),
            transaction_date: date(5, 1),
            related_transaction_id: None,
            related_dividend_id: None,
        })
        .unwrap();

    ctx.dividends
        .create_forecast(NewDividendForecast {
            asset_id: asset.id.clone(),
            per_share_amount: dec!(1),
            expected_date: date(7, 10),
            tax_rate: dec!(0),
            notes: None,
        })
        .unwrap();
    ctx.dividends
        .create_forecast(NewDividendForecast {
            asset_id: asset.id.clone(),
            per_share_amount: dec!(0.50),
            expected_date: date(7, 20),
            tax_rate: dec!(0),
            notes: None,
        })
        .unwrap();

    let today = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    let points = ctx.cashflow.project(&portfolio.id, "USD", today).unwrap();

    assert_eq!(points.len(), 3);

    assert!(!points[0].is_forecast);
    assert_eq!(points[0].balance, dec!(1000));
    assert_eq!(points[0].deposits, dec!(1000));

    assert!(points[1].is_forecast);
    assert_eq!(points[1].date, date(7, 10).date_naive());
    assert_eq!(points[1].dividends, dec!(100));
    assert_eq!(points[1].balance, dec!(1100));

    assert!(points[2].is_forecast);
    assert_eq!(points[2].balance, dec!(1150));
    assert_eq!(points[2].change, dec!(50));
}
