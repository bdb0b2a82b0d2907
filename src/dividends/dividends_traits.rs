use chrono::{DateTime, Utc};

use super::dividends_model::{
    ConfirmDividendRequest, ConfirmedDividend, Dividend, DividendUpdateDB, NewDividend,
    NewDividendForecast, NewManualDividend,
};
use crate::models::SagaOutcome;
use crate::Result;

/// Trait defining the contract for dividend repository operations.
pub trait DividendRepositoryTrait: Send + Sync {
    fn get_dividend(&self, dividend_id: &str) -> Result<Dividend>;
    fn get_dividends_for_asset(&self, asset_id: &str) -> Result<Vec<Dividend>>;
    /// Dividends across a portfolio's assets paying on or after `from`,
    /// forecasts and future-dated realized ones alike, ascending by date.
    fn get_upcoming_for_portfolio(
        &self,
        portfolio_id: &str,
        from: DateTime<Utc>,
    ) -> Result<Vec<Dividend>>;
    fn create_dividend(&self, new_dividend: NewDividend) -> Result<Dividend>;
    fn update_dividend(&self, dividend_id: &str, update: DividendUpdateDB) -> Result<Dividend>;
    fn delete_dividend(&self, dividend_id: &str) -> Result<Dividend>;
}

/// Trait defining the contract for dividend service operations.
pub trait DividendServiceTrait: Send + Sync {
    /// Creates a forecast from a per-share amount and the asset's current
    /// quantity. Rejected with `ZeroQuantity` when the position is empty.
    fn create_forecast(&self, forecast: NewDividendForecast) -> Result<Dividend>;

    /// Records an already-received dividend and posts its cash entry
    /// best-effort.
    fn create_manual(&self, dividend: NewManualDividend) -> Result<SagaOutcome<Dividend>>;

    /// Confirms a forecast with actual amounts: overwrites the record,
    /// flips it to realized, and posts a DIVIDEND cash entry best-effort.
    fn confirm(&self, request: ConfirmDividendRequest)
        -> Result<SagaOutcome<ConfirmedDividend>>;

    /// Deletes a forecast outright; no cash effect since forecasts never
    /// posted any.
    fn dismiss(&self, dividend_id: &str) -> Result<Dividend>;

    fn get_dividends_for_asset(&self, asset_id: &str) -> Result<Vec<Dividend>>;
    fn get_upcoming(&self, portfolio_id: &str, from: DateTime<Utc>) -> Result<Vec<Dividend>>;
}
