use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::ROUNDING_SCALE;

use super::{CostBasisError, Result};

/// Domain model for one surviving slice of a BUY under FIFO accounting.
///
/// Created exactly once per BUY; `remaining_quantity` only ever decreases
/// as sales consume the lot oldest-first. `quantity` and `cost_basis`
/// keep the original values so partially consumed lots retain their
/// per-unit cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBasisLot {
    pub id: String,
    pub asset_id: String,
    pub transaction_id: String,
    pub quantity: Decimal,
    pub cost_basis: Decimal,
    pub remaining_quantity: Decimal,
    pub purchase_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CostBasisLot {
    /// Per-unit acquisition cost of this lot.
    pub fn unit_cost(&self) -> Decimal {
        if self.quantity.is_zero() {
            Decimal::ZERO
        } else {
            self.cost_basis / self.quantity
        }
    }
}

/// Database model for cost basis lots; decimals are stored as TEXT
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::cost_basis_lots)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CostBasisLotDB {
    pub id: String,
    pub asset_id: String,
    pub transaction_id: String,
    pub quantity: String,
    pub cost_basis: String,
    pub remaining_quantity: String,
    pub purchase_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Input model for creating a lot from a BUY transaction
#[derive(Debug, Clone)]
pub struct NewLot {
    pub asset_id: String,
    pub transaction_id: String,
    pub quantity: Decimal,
    pub cost_basis: Decimal,
    pub remaining_quantity: Decimal,
    pub purchase_date: DateTime<Utc>,
}

impl NewLot {
    /// Builds the lot a BUY creates: `cost_basis = qty * price`, fully
    /// unconsumed.
    pub fn from_buy(
        asset_id: &str,
        transaction_id: &str,
        quantity: Decimal,
        price: Decimal,
        purchase_date: DateTime<Utc>,
    ) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            transaction_id: transaction_id.to_string(),
            quantity,
            cost_basis: (quantity * price).round_dp(ROUNDING_SCALE),
            remaining_quantity: quantity,
            purchase_date,
        }
    }
}

/// One lot's share of a FIFO sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotDraw {
    pub lot_id: String,
    pub consumed: Decimal,
    pub cost_basis: Decimal,
    /// Absolute remaining quantity after the draw; persisting this value
    /// (rather than a delta) keeps lot updates idempotent on retry.
    pub remaining_after: Decimal,
}

/// Result of consuming lots FIFO for one sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotConsumption {
    pub total_cost_basis: Decimal,
    pub lots_used: Vec<LotDraw>,
}

/// Consumes `sell_quantity` from `lots` oldest-first.
///
/// Lots must already be ordered by purchase date ascending. Each lot with
/// remaining quantity contributes `min(remaining, still_needed)`, costed
/// at the lot's original per-unit cost. Fails with `InsufficientLots` if
/// the lots are exhausted before the sale is covered, which signals a
/// mismatch between the lot ledger and the asset's tracked quantity.
pub fn consume_fifo(lots: &[CostBasisLot], sell_quantity: Decimal) -> Result<LotConsumption> {
    if !sell_quantity.is_sign_positive() {
        return Err(CostBasisError::InvalidData(
            "Quantity to consume must be positive".to_string(),
        ));
    }

    let mut still_needed = sell_quantity;
    let mut total_cost_basis = Decimal::ZERO;
    let mut lots_used = Vec::new();

    for lot in lots {
        if still_needed.is_zero() {
            break;
        }
        if !lot.remaining_quantity.is_sign_positive() {
            continue;
        }

        let consumed = lot.remaining_quantity.min(still_needed);
        let cost_basis = (consumed * lot.unit_cost()).round_dp(ROUNDING_SCALE);

        total_cost_basis += cost_basis;
        still_needed -= consumed;

        lots_used.push(LotDraw {
            lot_id: lot.id.clone(),
            consumed,
            cost_basis,
            remaining_after: lot.remaining_quantity - consumed,
        });
    }

    if !still_needed.is_zero() {
        return Err(CostBasisError::InsufficientLots {
            remaining: still_needed,
        });
    }

    Ok(LotConsumption {
        total_cost_basis: total_cost_basis.round_dp(ROUNDING_SCALE),
        lots_used,
    })
}

impl From<CostBasisLotDB> for CostBasisLot {
    fn from(db: CostBasisLotDB) -> Self {
        Self {
            id: db.id,
            asset_id: db.asset_id,
            transaction_id: db.transaction_id,
            quantity: Decimal::from_str(&db.quantity).unwrap_or_default(),
            cost_basis: Decimal::from_str(&db.cost_basis).unwrap_or_default(),
            remaining_quantity: Decimal::from_str(&db.remaining_quantity).unwrap_or_default(),
            purchase_date: DateTime::from_naive_utc_and_offset(db.purchase_date, Utc),
            created_at: DateTime::from_naive_utc_and_offset(db.created_at, Utc),
        }
    }
}
