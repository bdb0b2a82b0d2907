/// Decimal precision for display values (comparison amounts, percentages)
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Rounding scale for lot-level cost basis arithmetic
pub const ROUNDING_SCALE: u32 = 8;

/// Quantity threshold below which a position is considered empty
pub const QUANTITY_THRESHOLD: &str = "0.00000001";
