//! Decimal rounding for displayed and stored figures.
//!
//! Rounding works on the exact decimal expansion of the `f64`, halves away
//! from zero. `0.825` is stored as `0.82499999999999995559...` and therefore
//! rounds to `0.82`, whereas scaling first (`(v * 100.0).round()`) lands on
//! `82.5` and gives `0.83`.

/// Digits after the point needed to print any finite `f64` exactly.
const EXACT_DIGITS: usize = 1100;

/// Above this magnitude an `f64` has no fractional digits worth rounding.
const NO_FRACTION_ABOVE: f64 = 1e15;

/// Round to `decimals` places (at most 4) on the exact decimal value.
///
/// Non-finite values and magnitudes of 1e15 or more are returned unchanged.
pub fn round_half_up(value: f64, decimals: usize) -> f64 {
    let decimals = decimals.min(4);
    if !value.is_finite() || value.abs() >= NO_FRACTION_ABOVE {
        return value;
    }

    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let frac = frac_part.as_bytes();

    let mut scaled: u64 = 0;
    for &b in int_part.as_bytes().iter().chain(frac.iter().take(decimals)) {
        scaled = scaled * 10 + u64::from(b - b'0');
    }
    if frac.get(decimals).map_or(false, |&d| d >= b'5') {
        scaled += 1;
    }

    // Both operands are exact integers, so the quotient is the nearest
    // f64 to the decimal result.
    let rounded = scaled as f64 / 10f64.powi(decimals as i32);
    if value.is_sign_negative() && scaled != 0 {
        -rounded
    } else {
        rounded
    }
}

/// Round to 1 decimal place.
pub fn round1(value: f64) -> f64 {
    round_half_up(value, 1)
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    round_half_up(value, 2)
}

/// Round to 3 decimal places.
pub fn round3(value: f64) -> f64 {
    round_half_up(value, 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_the_stored_value_not_the_scaled_one() {
        // 0.7 + 0.125 is just below 0.825
        assert_eq!(round2(0.7 + 0.125), 0.82);
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round1(0.35), 0.3);
    }

    #[test]
    fn test_exact_halves_go_up() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.375), 2.38);
        assert_eq!(round1(0.25), 0.3);
        assert_eq!(round_half_up(2.5, 0), 3.0);
    }

    #[test]
    fn test_plain_values() {
        assert_eq!(round2(0.6042114), 0.6);
        assert_eq!(round3(3000.0 / 21000.0), 0.143);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(12.0), 12.0);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
        assert_eq!(round2(1e20), 1e20);
    }
}
