use super::portfolios_model::{NewPortfolio, Portfolio};
use crate::Result;

/// Trait defining the contract for portfolio repository operations.
pub trait PortfolioRepositoryTrait: Send + Sync {
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;
    fn get_portfolios(&self) -> Result<Vec<Portfolio>>;
    fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio>;
    /// Cascades to the portfolio's assets, transactions, lots, and cash rows.
    fn delete_portfolio(&self, portfolio_id: &str) -> Result<Portfolio>;
}
