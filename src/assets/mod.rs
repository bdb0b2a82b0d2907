pub mod assets_errors;
pub mod assets_model;
pub mod assets_repository;
pub mod assets_traits;

pub use assets_errors::AssetError;
pub use assets_model::*;
pub use assets_repository::AssetRepository;
pub use assets_traits::AssetRepositoryTrait;

pub type Result<T> = std::result::Result<T, AssetError>;
