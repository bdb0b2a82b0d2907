use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error};

use super::dividends_model::{
    ConfirmDividendRequest, ConfirmedDividend, Dividend, DividendComparison, DividendUpdateDB,
    NewDividend, NewDividendForecast, NewManualDividend, DIVIDEND_SOURCE_CONFIRMED,
    DIVIDEND_SOURCE_FORECAST, DIVIDEND_SOURCE_MANUAL,
};
use super::dividends_traits::{DividendRepositoryTrait, DividendServiceTrait};
use super::DividendError;
use crate::assets::AssetRepositoryTrait;
use crate::cash::{CashServiceTrait, CashTransactionType, NewCashEntry};
use crate::constants::ROUNDING_SCALE;
use crate::models::SagaOutcome;
use crate::Result;

/// Drives the forecast -> confirmed/dismissed lifecycle. Confirmation is
/// a saga: the dividend row is flipped to realized first, then the cash
/// entry is posted best-effort with failures reported as warnings.
pub struct DividendService {
    dividend_repository: Arc<dyn DividendRepositoryTrait>,
    asset_repository: Arc<dyn AssetRepositoryTrait>,
    cash_service: Arc<dyn CashServiceTrait>,
}

impl DividendService {
    pub fn new(
        dividend_repository: Arc<dyn DividendRepositoryTrait>,
        asset_repository: Arc<dyn AssetRepositoryTrait>,
        cash_service: Arc<dyn CashServiceTrait>,
    ) -> Self {
        Self {
            dividend_repository,
            asset_repository,
            cash_service,
        }
    }

    /// Posts the DIVIDEND cash entry for a realized dividend. Failures
    /// are pushed onto `warnings` rather than propagated.
    fn post_dividend_cash(&self, dividend: &Dividend, warnings: &mut Vec<String>) {
        let asset = match self.asset_repository.get_asset(&dividend.asset_id) {
            Ok(asset) => asset,
            Err(e) => {
                error!(
                    "Asset lookup for dividend {} cash entry failed: {}",
                    dividend.id, e
                );
                warnings.push(format!(
                    "Dividend recorded but its cash entry was not posted: {}",
                    e
                ));
                return;
            }
        };

        let entry = NewCashEntry {
            portfolio_id: asset.portfolio_id,
            currency: asset.currency,
            transaction_type: CashTransactionType::Dividend,
            magnitude: dividend.net_amount,
            transaction_date: dividend.payment_date,
            related_transaction_id: None,
            related_dividend_id: Some(dividend.id.clone()),
        };

        if let Err(e) = self.cash_service.post_entry(entry) {
            error!("Cash entry for dividend {} was not posted: {}", dividend.id, e);
            warnings.push(format!(
                "Dividend recorded but its cash entry was not posted: {}",
                e
            ));
        }
    }
}

impl DividendServiceTrait for DividendService {
    fn create_forecast(&self, forecast: NewDividendForecast) -> Result<Dividend> {
        forecast.validate()?;

        let asset = self.asset_repository.get_asset(&forecast.asset_id)?;
        if !asset.holds_anything() {
            return Err(DividendError::ZeroQuantity(asset.id).into());
        }

        let (gross, tax, net) = forecast.amounts(asset.quantity);
        debug!(
            "Forecasting dividend for asset {}: gross {} tax {} net {}",
            asset.id, gross, tax, net
        );

        self.dividend_repository.create_dividend(NewDividend {
            asset_id: forecast.asset_id,
            gross_amount: gross,
            tax_amount: tax,
            net_amount: net,
            payment_date: forecast.expected_date,
            is_forecast: true,
            source: DIVIDEND_SOURCE_FORECAST.to_string(),
            notes: forecast.notes,
        })
    }

    fn create_manual(&self, dividend: NewManualDividend) -> Result<SagaOutcome<Dividend>> {
        dividend.validate()?;

        // Asset must exist; the lookup also anchors the cash entry's
        // portfolio and currency.
        self.asset_repository.get_asset(&dividend.asset_id)?;

        let net = dividend.gross_amount - dividend.tax_amount;
        let created = self.dividend_repository.create_dividend(NewDividend {
            asset_id: dividend.asset_id,
            gross_amount: dividend.gross_amount,
            tax_amount: dividend.tax_amount,
            net_amount: net,
            payment_date: dividend.payment_date,
            is_forecast: false,
            source: DIVIDEND_SOURCE_MANUAL.to_string(),
            notes: dividend.notes,
        })?;

        let mut warnings = Vec::new();
        self.post_dividend_cash(&created, &mut warnings);

        Ok(SagaOutcome::from_warnings(created, warnings))
    }

    fn confirm(
        &self,
        request: ConfirmDividendRequest,
    ) -> Result<SagaOutcome<ConfirmedDividend>> {
        request.validate()?;

        let existing = self.dividend_repository.get_dividend(&request.dividend_id)?;
        if !existing.is_forecast {
            return Err(DividendError::AlreadyConfirmed(existing.id).into());
        }

        let actual_net = request.actual_gross_amount - request.actual_tax_amount;
        let payment_date = request
            .actual_payment_date
            .unwrap_or(existing.payment_date);
        let comparison =
            DividendComparison::new(existing.gross_amount, request.actual_gross_amount);

        let confirmed = self.dividend_repository.update_dividend(
            &existing.id,
            DividendUpdateDB {
                gross_amount: request
                    .actual_gross_amount
                    .round_dp(ROUNDING_SCALE)
                    .to_string(),
                tax_amount: request
                    .actual_tax_amount
                    .round_dp(ROUNDING_SCALE)
                    .to_string(),
                net_amount: actual_net.round_dp(ROUNDING_SCALE).to_string(),
                payment_date: payment_date.naive_utc(),
                is_forecast: false,
                source: DIVIDEND_SOURCE_CONFIRMED.to_string(),
                notes: request.notes,
                updated_at: Utc::now().naive_utc(),
            },
        )?;
        debug!(
            "Confirmed dividend {}: forecast {} actual {}",
            confirmed.id, comparison.forecast_gross, comparison.actual_gross
        );

        let mut warnings = Vec::new();
        self.post_dividend_cash(&confirmed, &mut warnings);

        Ok(SagaOutcome::from_warnings(
            ConfirmedDividend {
                dividend: confirmed,
                comparison,
            },
            warnings,
        ))
    }

    fn dismiss(&self, dividend_id: &str) -> Result<Dividend> {
        let existing = self.dividend_repository.get_dividend(dividend_id)?;
        if !existing.is_forecast {
            return Err(DividendError::NotAForecast(existing.id).into());
        }

        self.dividend_repository.delete_dividend(dividend_id)
    }

    fn get_dividends_for_asset(&self, asset_id: &str) -> Result<Vec<Dividend>> {
        self.dividend_repository.get_dividends_for_asset(asset_id)
    }

    fn get_upcoming(&self, portfolio_id: &str, from: DateTime<Utc>) -> Result<Vec<Dividend>> {
        self.dividend_repository
            .get_upcoming_for_portfolio(portfolio_id, from)
    }
}
