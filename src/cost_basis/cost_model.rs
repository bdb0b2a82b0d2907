use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::ROUNDING_SCALE;

use super::{CostBasisError, Result};

/// Cost-basis projection a sale reads its realized gain/loss from.
/// Both projections are maintained on every trade; this only selects
/// which one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostBasisMethod {
    AverageCost,
    Fifo,
}

/// Applies a buy to an average-cost position.
///
/// Returns the new quantity and the new weighted-average price:
/// `(old_qty * old_avg + buy_qty * buy_price) / (old_qty + buy_qty)`.
pub fn apply_buy(
    old_quantity: Decimal,
    old_average_price: Decimal,
    buy_quantity: Decimal,
    buy_price: Decimal,
) -> Result<(Decimal, Decimal)> {
    let new_quantity = old_quantity + buy_quantity;
    if new_quantity.is_zero() {
        // Only reachable with a non-positive buy quantity, which input
        // validation rejects upstream.
        return Err(CostBasisError::DivisionByZero);
    }

    let total_cost = old_quantity * old_average_price + buy_quantity * buy_price;
    let new_average_price = (total_cost / new_quantity).round_dp(ROUNDING_SCALE);

    Ok((new_quantity, new_average_price))
}

/// Checks that a sale of `requested` can be covered by `current` holdings.
/// Must be called before any mutation.
pub fn validate_sufficient_quantity(current: Decimal, requested: Decimal) -> Result<()> {
    if current < requested {
        return Err(CostBasisError::InsufficientQuantity { current, requested });
    }
    Ok(())
}

/// Applies a sell, returning the depleted quantity.
///
/// Re-validates sufficiency and guards the resulting quantity against
/// going negative even though the prior validation makes that unreachable.
pub fn apply_sell(current: Decimal, sell_quantity: Decimal) -> Result<Decimal> {
    validate_sufficient_quantity(current, sell_quantity)?;

    let new_quantity = current - sell_quantity;
    if new_quantity.is_sign_negative() {
        return Err(CostBasisError::NegativeQuantity(new_quantity));
    }
    Ok(new_quantity)
}

/// Realized gain or loss for a sale: `(sale_price - cost_per_unit) * qty`.
/// Positive is a gain, negative a loss, zero at break-even.
pub fn realized_gain_loss(
    cost_basis_per_unit: Decimal,
    sale_price: Decimal,
    sell_quantity: Decimal,
) -> Decimal {
    (sale_price - cost_basis_per_unit) * sell_quantity
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn buy_updates_weighted_average() {
        let (qty, avg) = apply_buy(dec!(10), dec!(100), dec!(5), dec!(120)).unwrap();
        assert_eq!(qty, dec!(15));
        // 1600 / 15
        assert_eq!(avg, dec!(106.66666667));
    }

    #[test]
    fn buy_into_empty_position_takes_buy_price() {
        let (qty, avg) = apply_buy(dec!(0), dec!(0), dec!(4), dec!(25.50)).unwrap();
        assert_eq!(qty, dec!(4));
        assert_eq!(avg, dec!(25.50));
    }

    #[test]
    fn average_price_equals_total_cost_over_total_quantity() {
        let buys = [
            (dec!(10), dec!(100)),
            (dec!(3), dec!(95.25)),
            (dec!(7.5), dec!(131.1)),
            (dec!(0.0001), dec!(80)),
        ];

        let mut qty = Decimal::ZERO;
        let mut avg = Decimal::ZERO;
        let mut total_cost = Decimal::ZERO;
        for (buy_qty, buy_price) in buys {
            (qty, avg) = apply_buy(qty, avg, buy_qty, buy_price).unwrap();
            total_cost += buy_qty * buy_price;

            let expected = (total_cost / qty).round_dp(crate::constants::ROUNDING_SCALE);
            let diff = (avg - expected).abs();
            assert!(diff <= dec!(0.0000001), "avg {} vs expected {}", avg, expected);
        }
    }

    #[test]
    fn zero_total_quantity_is_division_by_zero() {
        let err = apply_buy(dec!(5), dec!(100), dec!(-5), dec!(100)).unwrap_err();
        assert_eq!(err, CostBasisError::DivisionByZero);
    }

    #[test]
    fn sell_depletes_quantity() {
        assert_eq!(apply_sell(dec!(10), dec!(3)).unwrap(), dec!(7));
        assert_eq!(apply_sell(dec!(10), dec!(10)).unwrap(), dec!(0));
    }

    #[test]
    fn oversell_fails_with_current_and_requested() {
        let err = apply_sell(dec!(2), dec!(5)).unwrap_err();
        assert_eq!(
            err,
            CostBasisError::InsufficientQuantity {
                current: dec!(2),
                requested: dec!(5)
            }
        );
    }

    #[test]
    fn realized_gain_loss_sign_convention() {
        assert_eq!(realized_gain_loss(dec!(100), dec!(120), dec!(3)), dec!(60));
        assert_eq!(realized_gain_loss(dec!(100), dec!(90), dec!(2)), dec!(-20));
        assert_eq!(realized_gain_loss(dec!(100), dec!(100), dec!(5)), dec!(0));
    }
}
