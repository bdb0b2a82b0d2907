pub mod cash_errors;
pub mod cash_model;
pub mod cash_repository;
pub mod cash_service;
pub mod cash_traits;

pub use cash_errors::CashError;
pub use cash_model::*;
pub use cash_repository::CashRepository;
pub use cash_service::CashService;
pub use cash_traits::{CashRepositoryTrait, CashServiceTrait};

pub type Result<T> = std::result::Result<T, CashError>;
