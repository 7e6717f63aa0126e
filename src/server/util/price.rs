use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

pub(crate) const PRICE_PRECISION: u32 = 2;

/// Round `value` to `precision` decimal places, halves away from zero.
///
/// Rounding works on the shortest decimal form of `value`, so `2.005` becomes
/// `2.01` even though its binary form sits just below the midpoint. Values that
/// do not fit a decimal fall back to scaled float rounding.
pub(crate) fn to_fixed(value: f64, precision: u32) -> f64 {
    match Decimal::from_str(&value.to_string()) {
        Ok(d) => d
            .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
            .to_string()
            .parse()
            .unwrap_or(value),
        Err(_) => {
            let factor = 10f64.powi(precision as i32);
            (value * factor).round() / factor
        }
    }
}

pub(crate) fn normalize_price(value: f64) -> f64 {
    to_fixed(value, PRICE_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(to_fixed(2.005, 2), 2.01);
        assert_eq!(to_fixed(2.004, 2), 2.0);
        assert_eq!(to_fixed(-2.005, 2), -2.01);
        assert_eq!(to_fixed(0.125, 2), 0.13);
        assert_eq!(to_fixed(-0.125, 2), -0.13);
    }

    #[test]
    fn other_precisions() {
        assert_eq!(to_fixed(2.5, 0), 3.0);
        assert_eq!(to_fixed(-2.5, 0), -3.0);
        assert_eq!(to_fixed(1.23456, 3), 1.235);
    }

    #[test]
    fn idempotent() {
        for x in [0.0, 9.99, 4.5, 2.005, -7.777, 1e-9, 123456.789, -0.005, 1e20] {
            let once = normalize_price(x);
            assert_eq!(normalize_price(once), once, "x = {x}");
        }
    }

    #[test]
    fn non_finite_passes_through() {
        assert!(to_fixed(f64::NAN, 2).is_nan());
        assert_eq!(to_fixed(f64::INFINITY, 2), f64::INFINITY);
    }
}
