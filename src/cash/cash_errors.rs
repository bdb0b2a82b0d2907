use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for cash ledger operations
#[derive(Debug, Error)]
pub enum CashError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<DieselError> for CashError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => CashError::NotFound("Cash record not found".to_string()),
            _ => CashError::DatabaseError(err.to_string()),
        }
    }
}
