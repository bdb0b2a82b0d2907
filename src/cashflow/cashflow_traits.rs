use chrono::{DateTime, Utc};

use super::cashflow_model::CashFlowPoint;
use crate::Result;

/// Trait defining the contract for cash-flow projection operations.
pub trait CashFlowServiceTrait: Send + Sync {
    /// Merged balance curve for one (portfolio, currency) pair: realized
    /// daily balances strictly before `today`, then synthetic points that
    /// continue the running balance through upcoming dividend income.
    /// `today` is injected so the historical/forecast boundary is the
    /// caller's clock, not the database's.
    fn project(
        &self,
        portfolio_id: &str,
        currency: &str,
        today: DateTime<Utc>,
    ) -> Result<Vec<CashFlowPoint>>;
}
