pub mod portfolios_errors;
pub mod portfolios_model;
pub mod portfolios_repository;
pub mod portfolios_traits;

pub use portfolios_errors::PortfolioError;
pub use portfolios_model::*;
pub use portfolios_repository::PortfolioRepository;
pub use portfolios_traits::PortfolioRepositoryTrait;

pub type Result<T> = std::result::Result<T, PortfolioError>;
