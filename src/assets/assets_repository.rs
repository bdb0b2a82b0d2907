use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::assets_model::{Asset, AssetDB, NewAsset};
use super::assets_traits::AssetRepositoryTrait;
use super::AssetError;
use crate::constants::ROUNDING_SCALE;
use crate::db::{get_connection, DbPool};
use crate::schema::assets;
use crate::Result;

/// Repository for managing asset data in the database
pub struct AssetRepository {
    pool: Arc<DbPool>,
}

impl AssetRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl AssetRepositoryTrait for AssetRepository {
    fn get_asset(&self, asset_id: &str) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;

        assets::table
            .find(asset_id)
            .first::<AssetDB>(&mut conn)
            .map(Asset::from)
            .map_err(AssetError::from)
            .map_err(Into::into)
    }

    fn get_assets_for_portfolio(&self, portfolio_id: &str) -> Result<Vec<Asset>> {
        let mut conn = get_connection(&self.pool)?;

        assets::table
            .filter(assets::portfolio_id.eq(portfolio_id))
            .order(assets::symbol.asc())
            .load::<AssetDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Asset::from).collect())
            .map_err(AssetError::from)
            .map_err(Into::into)
    }

    fn get_or_create_asset(&self, new_asset: NewAsset) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;

        new_asset.validate()?;

        let existing = assets::table
            .filter(assets::portfolio_id.eq(&new_asset.portfolio_id))
            .filter(assets::symbol.eq(&new_asset.symbol))
            .filter(assets::asset_type.eq(&new_asset.asset_type))
            .first::<AssetDB>(&mut conn)
            .optional()
            .map_err(AssetError::from)?;

        if let Some(asset_db) = existing {
            return Ok(asset_db.into());
        }

        let now = Utc::now().naive_utc();
        let asset_db = AssetDB {
            id: new_asset.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            portfolio_id: new_asset.portfolio_id,
            symbol: new_asset.symbol,
            asset_type: new_asset.asset_type,
            currency: new_asset.currency,
            quantity: Decimal::ZERO.to_string(),
            average_buy_price: Decimal::ZERO.to_string(),
            created_at: now,
            updated_at: now,
        };

        diesel::insert_into(assets::table)
            .values(&asset_db)
            .get_result::<AssetDB>(&mut conn)
            .map(Asset::from)
            .map_err(AssetError::from)
            .map_err(Into::into)
    }

    fn update_aggregates(
        &self,
        asset_id: &str,
        quantity: Decimal,
        average_buy_price: Decimal,
    ) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;

        if quantity.is_sign_negative() {
            return Err(AssetError::InvalidData(format!(
                "Asset quantity cannot be negative: {}",
                quantity
            ))
            .into());
        }

        diesel::update(assets::table.find(asset_id))
            .set((
                assets::quantity.eq(quantity.round_dp(ROUNDING_SCALE).to_string()),
                assets::average_buy_price
                    .eq(average_buy_price.round_dp(ROUNDING_SCALE).to_string()),
                assets::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<AssetDB>(&mut conn)
            .map(Asset::from)
            .map_err(AssetError::from)
            .map_err(Into::into)
    }

    fn delete_asset(&self, asset_id: &str) -> Result<Asset> {
        let mut conn = get_connection(&self.pool)?;

        let asset = assets::table
            .find(asset_id)
            .first::<AssetDB>(&mut conn)
            .map_err(AssetError::from)?;

        diesel::delete(assets::table.find(asset_id))
            .execute(&mut conn)
            .map_err(AssetError::from)?;

        Ok(asset.into())
    }
}
