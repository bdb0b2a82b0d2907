pub mod cost_basis_errors;
pub mod cost_model;
pub mod lots_model;
pub mod lots_repository;
pub mod lots_traits;

pub use cost_basis_errors::CostBasisError;
pub use cost_model::*;
pub use lots_model::*;
pub use lots_repository::LotRepository;
pub use lots_traits::LotRepositoryTrait;

pub type Result<T> = std::result::Result<T, CostBasisError>;
