pub mod cashflow_model;
pub mod cashflow_service;
pub mod cashflow_traits;

pub use cashflow_model::CashFlowPoint;
pub use cashflow_service::CashFlowService;
pub use cashflow_traits::CashFlowServiceTrait;
