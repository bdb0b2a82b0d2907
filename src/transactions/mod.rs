pub mod import;
pub mod transactions_constants;
pub mod transactions_errors;
pub mod transactions_model;
pub mod transactions_repository;
pub mod transactions_service;
pub mod transactions_traits;

pub use import::{replay_batch, ReplayItem, ReplayOutcome};
pub use transactions_constants::*;
pub use transactions_errors::TransactionError;
pub use transactions_model::*;
pub use transactions_repository::TransactionRepository;
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};

pub type Result<T> = std::result::Result<T, TransactionError>;
