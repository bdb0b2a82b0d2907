use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cash::DailyCashFlow;

/// One point on the merged balance curve. Historical points come from
/// the cash ledger; forecast points are synthetic continuations built
/// from upcoming dividends and flagged so consumers can render them
/// distinctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowPoint {
    pub date: NaiveDate,
    pub balance: Decimal,
    pub change: Decimal,
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub dividends: Decimal,
    pub purchases: Decimal,
    pub sales: Decimal,
    pub is_forecast: bool,
}

impl CashFlowPoint {
    /// Synthetic future point: the running balance advanced by one day's
    /// expected dividend income.
    pub fn forecast(date: NaiveDate, balance: Decimal, dividend_net: Decimal) -> Self {
        Self {
            date,
            balance,
            change: dividend_net,
            deposits: Decimal::ZERO,
            withdrawals: Decimal::ZERO,
            dividends: dividend_net,
            purchases: Decimal::ZERO,
            sales: Decimal::ZERO,
            is_forecast: true,
        }
    }
}

impl From<DailyCashFlow> for CashFlowPoint {
    fn from(flow: DailyCashFlow) -> Self {
        Self {
            date: flow.date,
            balance: flow.balance,
            change: flow.change,
            deposits: flow.deposits,
            withdrawals: flow.withdrawals,
            dividends: flow.dividends,
            purchases: flow.purchases,
            sales: flow.sales,
            is_forecast: false,
        }
    }
}
