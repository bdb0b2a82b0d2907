use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use super::portfolios_model::{NewPortfolio, Portfolio, PortfolioDB};
use super::portfolios_traits::PortfolioRepositoryTrait;
use super::PortfolioError;
use crate::db::{get_connection, DbPool};
use crate::schema::portfolios;
use crate::Result;

/// Repository for managing portfolio data in the database
pub struct PortfolioRepository {
    pool: Arc<DbPool>,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl PortfolioRepositoryTrait for PortfolioRepository {
    fn get_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;

        portfolios::table
            .find(portfolio_id)
            .first::<PortfolioDB>(&mut conn)
            .map(Portfolio::from)
            .map_err(PortfolioError::from)
            .map_err(Into::into)
    }

    fn get_portfolios(&self) -> Result<Vec<Portfolio>> {
        let mut conn = get_connection(&self.pool)?;

        portfolios::table
            .order(portfolios::name.asc())
            .load::<PortfolioDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Portfolio::from).collect())
            .map_err(PortfolioError::from)
            .map_err(Into::into)
    }

    fn create_portfolio(&self, new_portfolio: NewPortfolio) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;

        new_portfolio.validate()?;

        let now = Utc::now().naive_utc();
        let portfolio_db = PortfolioDB {
            id: new_portfolio
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_portfolio.name,
            base_currency: new_portfolio.base_currency,
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(portfolios::table)
            .values(&portfolio_db)
            .get_result::<PortfolioDB>(&mut conn)
            .map(Portfolio::from)
            .map_err(PortfolioError::from)
            .map_err(Into::into)
    }

    fn delete_portfolio(&self, portfolio_id: &str) -> Result<Portfolio> {
        let mut conn = get_connection(&self.pool)?;

        let portfolio = portfolios::table
            .find(portfolio_id)
            .first::<PortfolioDB>(&mut conn)
            .map_err(PortfolioError::from)?;

        diesel::delete(portfolios::table.find(portfolio_id))
            .execute(&mut conn)
            .map_err(PortfolioError::from)?;

        Ok(portfolio.into())
    }
}
