use rust_decimal::Decimal;

use super::assets_model::{Asset, NewAsset};
use crate::Result;

/// Trait defining the contract for asset repository operations.
pub trait AssetRepositoryTrait: Send + Sync {
    fn get_asset(&self, asset_id: &str) -> Result<Asset>;
    fn get_assets_for_portfolio(&self, portfolio_id: &str) -> Result<Vec<Asset>>;
    fn get_or_create_asset(&self, new_asset: NewAsset) -> Result<Asset>;
    /// Persists the asset's (quantity, average_buy_price) aggregate pair.
    ///
    /// Read-modify-write of the pair is not serialized across callers;
    /// concurrent writers against the same asset resolve last-write-wins.
    fn update_aggregates(
        &self,
        asset_id: &str,
        quantity: Decimal,
        average_buy_price: Decimal,
    ) -> Result<Asset>;
    /// Cascades to the asset's transactions, lots, and dividends.
    fn delete_asset(&self, asset_id: &str) -> Result<Asset>;
}
