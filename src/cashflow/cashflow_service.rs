use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use rust_decimal::Decimal;

use super::cashflow_model::CashFlowPoint;
use super::cashflow_traits::CashFlowServiceTrait;
use crate::assets::AssetRepositoryTrait;
use crate::cash::CashServiceTrait;
use crate::dividends::DividendRepositoryTrait;
use crate::Result;

/// Builds the merged historical + forecast balance curve out of the cash
/// ledger and upcoming dividends.
pub struct CashFlowService {
    cash_service: Arc<dyn CashServiceTrait>,
    dividend_repository: Arc<dyn DividendRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
}

impl CashFlowService {
    pub fn new(
        cash_service: Arc<dyn CashServiceTrait>,
        dividend_repository: Arc<dyn DividendRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
    ) -> Self {
        Self {
            cash_service,
            dividend_repository,
            asset_repository,
        }
    }

    /// Expected net dividend income per future date, restricted to assets
    /// denominated in `currency`.
    fn upcoming_dividends_by_date(
        &self,
        portfolio_id: &str,
        currency: &str,
        from: DateTime<Utc>,
    ) -> Result<BTreeMap<NaiveDate, Decimal>> {
        let upcoming = self
            .dividend_repository
            .get_upcoming_for_portfolio(portfolio_id, from)?;

        let mut currency_by_asset: HashMap<String, String> = HashMap::new();
        let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

        for dividend in upcoming {
            let asset_currency = match currency_by_asset.get(&dividend.asset_id) {
                Some(known) => known.clone(),
                None => {
                    let asset = self.asset_repository.get_asset(&dividend.asset_id)?;
                    currency_by_asset.insert(dividend.asset_id.clone(), asset.currency.clone());
                    asset.currency
                }
            };
            if asset_currency != currency {
                continue;
            }

            *by_date
                .entry(dividend.payment_date.date_naive())
                .or_insert(Decimal::ZERO) += dividend.net_amount;
        }

        Ok(by_date)
    }
}

impl CashFlowServiceTrait for CashFlowService {
    fn project(
        &self,
        portfolio_id: &str,
        currency: &str,
        today: DateTime<Utc>,
    ) -> Result<Vec<CashFlowPoint>> {
        let boundary = today.date_naive();

        // Realized entries dated on or after the boundary belong to the
        // forecast side of the curve (a confirmed dividend with a future
        // payment date already posted its cash entry at that future date),
        // so the history stops strictly before today.
        let mut points: Vec<CashFlowPoint> = self
            .cash_service
            .daily_flows(portfolio_id, currency)?
            .into_iter()
            .filter(|flow| flow.date < boundary)
            .map(CashFlowPoint::from)
            .collect();

        let mut balance = points
            .last()
            .map(|point| point.balance)
            .unwrap_or(Decimal::ZERO);

        let by_date = self.upcoming_dividends_by_date(portfolio_id, currency, today)?;
        debug!(
            "Projecting {} forecast days onto {} historical points for portfolio {}",
            by_date.len(),
            points.len(),
            portfolio_id
        );

        for (date, dividend_net) in by_date {
            balance += dividend_net;
            points.push(CashFlowPoint::forecast(date, balance, dividend_net));
        }

        Ok(points)
    }
}
