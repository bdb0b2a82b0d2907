use chrono::{DateTime, Utc};
use diesel::result::Error as DieselError;
use thiserror::Error;

/// Custom error type for transaction-related operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Transaction date {0} is in the future")]
    FutureDate(DateTime<Utc>),

    #[error("Transaction batch is empty")]
    EmptyBatch,
}

impl From<DieselError> for TransactionError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => {
                TransactionError::NotFound("Transaction not found".to_string())
            }
            _ => TransactionError::DatabaseError(err.to_string()),
        }
    }
}
