use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for dividend-related operations
#[derive(Debug, Error)]
pub enum DividendError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Asset {0} holds no quantity to forecast a dividend against")]
    ZeroQuantity(String),

    #[error("Dividend {0} is already confirmed")]
    AlreadyConfirmed(String),

    #[error("Dividend {0} is not a forecast")]
    NotAForecast(String),
}

impl From<DieselError> for DividendError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => DividendError::NotFound("Dividend not found".to_string()),
            _ => DividendError::DatabaseError(err.to_string()),
        }
    }
}
