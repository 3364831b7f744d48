//! Money is stored as integer cents and handled as two-place decimals above the storage layer.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

pub const MONEY_DECIMAL_PLACES: u32 = 2;

#[inline]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, MONEY_DECIMAL_PLACES)
}

/// Rounds half away from zero to two places, then converts to cents. Returns `None` if the
/// amount does not fit in an `i64` number of cents.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    round_money(amount)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_i64()
}

#[inline]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[inline]
pub fn round_percentage(percentage: Decimal) -> Decimal {
    percentage.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// `part / whole * 100` without rounding. A zero `whole` yields zero.
pub fn ratio_percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }

    part / whole * Decimal::ONE_HUNDRED
}

/// `part / whole * 100`, rounded to one place. A zero `whole` yields zero.
pub fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    round_percentage(ratio_percentage(part, whole))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal_macros::dec;

    #[test]
    fn test_cents_conversion() {
        assert_eq!(from_cents(12345), dec!(123.45));
        assert_eq!(from_cents(-5), dec!(-0.05));
        assert_eq!(to_cents(dec!(123.45)), Some(12345));
        assert_eq!(to_cents(dec!(0.005)), Some(1));
        assert_eq!(to_cents(dec!(10.004)), Some(1000));
        assert_eq!(to_cents(Decimal::MAX), None);
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(dec!(85), dec!(100)), dec!(85.0));
        assert_eq!(percentage_of(dec!(1), dec!(3)), dec!(33.3));
        assert_eq!(percentage_of(dec!(2), dec!(3)), dec!(66.7));
        assert_eq!(percentage_of(dec!(50), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(ratio_percentage(dec!(799.60), dec!(1000)), dec!(79.96));
    }
}
