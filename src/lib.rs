pub mod db;

pub mod constants;
pub mod errors;
pub mod models;
pub mod schema;

pub mod assets;
pub mod cash;
pub mod cashflow;
pub mod cost_basis;
pub mod dividends;
pub mod portfolios;
pub mod transactions;

pub use errors::{Error, Result};
pub use models::SagaOutcome;
