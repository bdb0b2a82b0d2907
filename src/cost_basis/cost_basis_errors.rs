use diesel::result::Error as DieselError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Custom error type for cost-basis arithmetic and lot tracking
#[derive(Debug, Error, PartialEq)]
pub enum CostBasisError {
    #[error("Division by zero: total quantity is zero after applying buy")]
    DivisionByZero,

    #[error("Insufficient quantity: current {current}, requested {requested}")]
    InsufficientQuantity { current: Decimal, requested: Decimal },

    #[error("Quantity would become negative: {0}")]
    NegativeQuantity(Decimal),

    #[error("Insufficient lots: {remaining} uncovered after consuming all lots")]
    InsufficientLots { remaining: Decimal },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<DieselError> for CostBasisError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => CostBasisError::NotFound("Lot not found".to_string()),
            _ => CostBasisError::DatabaseError(err.to_string()),
        }
    }
}
