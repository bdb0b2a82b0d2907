use std::sync::Arc;

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use super::lots_model::{CostBasisLot, CostBasisLotDB, LotDraw, NewLot};
use super::lots_traits::LotRepositoryTrait;
use super::CostBasisError;
use crate::constants::ROUNDING_SCALE;
use crate::db::{get_connection, DbPool};
use crate::schema::cost_basis_lots;
use crate::Result;

/// Repository for managing cost basis lots in the database
pub struct LotRepository {
    pool: Arc<DbPool>,
}

impl LotRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn to_db(new_lot: NewLot) -> CostBasisLotDB {
        CostBasisLotDB {
            id: Uuid::new_v4().to_string(),
            asset_id: new_lot.asset_id,
            transaction_id: new_lot.transaction_id,
            quantity: new_lot.quantity.round_dp(ROUNDING_SCALE).to_string(),
            cost_basis: new_lot.cost_basis.round_dp(ROUNDING_SCALE).to_string(),
            remaining_quantity: new_lot
                .remaining_quantity
                .round_dp(ROUNDING_SCALE)
                .to_string(),
            purchase_date: new_lot.purchase_date.naive_utc(),
            created_at: Utc::now().naive_utc(),
        }
    }
}

impl LotRepositoryTrait for LotRepository {
    fn get_lots_for_asset(&self, asset_id: &str) -> Result<Vec<CostBasisLot>> {
        let mut conn = get_connection(&self.pool)?;

        cost_basis_lots::table
            .filter(cost_basis_lots::asset_id.eq(asset_id))
            .order((
                cost_basis_lots::purchase_date.asc(),
                cost_basis_lots::created_at.asc(),
            ))
            .load::<CostBasisLotDB>(&mut conn)
            .map(|rows| rows.into_iter().map(CostBasisLot::from).collect())
            .map_err(CostBasisError::from)
            .map_err(Into::into)
    }

    fn create_lot(&self, new_lot: NewLot) -> Result<CostBasisLot> {
        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(cost_basis_lots::table)
            .values(&Self::to_db(new_lot))
            .get_result::<CostBasisLotDB>(&mut conn)
            .map(CostBasisLot::from)
            .map_err(CostBasisError::from)
            .map_err(Into::into)
    }

    fn create_lots(&self, new_lots: Vec<NewLot>) -> Result<Vec<CostBasisLot>> {
        let mut conn = get_connection(&self.pool)?;

        let rows: Vec<CostBasisLotDB> = new_lots.into_iter().map(Self::to_db).collect();

        conn.transaction(|conn| {
            let mut created = Vec::with_capacity(rows.len());
            for row in &rows {
                let lot = diesel::insert_into(cost_basis_lots::table)
                    .values(row)
                    .get_result::<CostBasisLotDB>(conn)
                    .map(CostBasisLot::from)?;
                created.push(lot);
            }
            Ok::<_, diesel::result::Error>(created)
        })
        .map_err(CostBasisError::from)
        .map_err(Into::into)
    }

    fn apply_draws(&self, draws: &[LotDraw]) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;

        conn.transaction(|conn| {
            for draw in draws {
                diesel::update(cost_basis_lots::table.find(&draw.lot_id))
                    .set(
                        cost_basis_lots::remaining_quantity
                            .eq(draw.remaining_after.round_dp(ROUNDING_SCALE).to_string()),
                    )
                    .execute(conn)?;
            }
            Ok::<_, diesel::result::Error>(())
        })
        .map_err(CostBasisError::from)
        .map_err(Into::into)
    }
}
