pub mod dividends_errors;
pub mod dividends_model;
pub mod dividends_repository;
pub mod dividends_service;
pub mod dividends_traits;

pub use dividends_errors::DividendError;
pub use dividends_model::*;
pub use dividends_repository::DividendRepository;
pub use dividends_service::DividendService;
pub use dividends_traits::{DividendRepositoryTrait, DividendServiceTrait};

pub type Result<T> = std::result::Result<T, DividendError>;
