use super::lots_model::{CostBasisLot, LotDraw, NewLot};
use crate::Result;

/// Trait defining the contract for cost basis lot repository operations.
pub trait LotRepositoryTrait: Send + Sync {
    /// Lots ordered by purchase date then creation, i.e. FIFO order.
    fn get_lots_for_asset(&self, asset_id: &str) -> Result<Vec<CostBasisLot>>;
    fn create_lot(&self, new_lot: NewLot) -> Result<CostBasisLot>;
    fn create_lots(&self, new_lots: Vec<NewLot>) -> Result<Vec<CostBasisLot>>;
    /// Persists the absolute remaining quantity of each drawn lot in one
    /// database transaction, so a retried sale never double-consumes.
    fn apply_draws(&self, draws: &[LotDraw]) -> Result<()>;
}
