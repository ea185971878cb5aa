//! Score mapper: grams of CO₂ per page view to a 0..1 sustainability score.

use climacode_core::round2;

/// Score at or below which a scan qualifies for the green website certificate.
pub const CERTIFICATE_THRESHOLD: f64 = 0.7;

/// Map grams per view to a score in `[0, 1]`, rounded to 2 decimals.
///
/// Piecewise linear and non-increasing:
///
/// | grams        | score                                  |
/// |--------------|----------------------------------------|
/// | ≤ 0.1        | 0.95                                   |
/// | (0.1, 0.5]   | 0.70 + 0.25 · (1 − g / 0.5)            |
/// | (0.5, 1.5]   | 0.30 + 0.40 · (1 − (g − 0.5))          |
/// | > 1.5        | max(0.05, 0.30 − (g − 1.5) · 0.1)      |
///
/// Negative and non-finite inputs count as 0.
pub fn sustainability_score(co2_grams: f64) -> f64 {
    let g = if co2_grams.is_finite() { co2_grams.max(0.0) } else { 0.0 };

    let raw = if g <= 0.1 {
        0.95
    } else if g <= 0.5 {
        0.7 + 0.25 * (1.0 - g / 0.5)
    } else if g <= 1.5 {
        0.3 + 0.4 * (1.0 - (g - 0.5))
    } else {
        (0.3 - (g - 1.5) * 0.1).max(0.05)
    };

    round2(raw)
}

/// Whether a score earns the green website certificate.
pub fn certificate_eligible(score: f64) -> bool {
    score >= CERTIFICATE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakpoints() {
        assert_eq!(sustainability_score(0.0), 0.95);
        assert_eq!(sustainability_score(0.1), 0.95);
        assert_eq!(sustainability_score(0.5), 0.70);
        assert_eq!(sustainability_score(1.5), 0.30);
        assert_eq!(sustainability_score(10.0), 0.05);
    }

    #[test]
    fn test_interior_values() {
        assert_eq!(sustainability_score(0.3), 0.8);
        assert_eq!(sustainability_score(1.0), 0.5);
        assert_eq!(sustainability_score(2.0), 0.25);
        assert_eq!(sustainability_score(3.5), 0.1);
    }

    #[test]
    fn test_rounding_follows_stored_value() {
        assert_eq!(sustainability_score(0.17), 0.86);
        assert_eq!(sustainability_score(0.25), 0.82);
        assert_eq!(sustainability_score(0.49), 0.70);
        assert_eq!(sustainability_score(1.55), 0.29);
        assert_eq!(sustainability_score(2.05), 0.24);
    }

    #[test]
    fn test_bad_input_is_clamped() {
        assert_eq!(sustainability_score(-3.0), 0.95);
        assert_eq!(sustainability_score(f64::NAN), 0.95);
        assert_eq!(sustainability_score(f64::INFINITY), 0.95);
    }

    #[test]
    fn test_non_increasing_and_bounded() {
        let mut prev = sustainability_score(0.0);
        let mut g = 0.0;
        while g < 20.0 {
            let s = sustainability_score(g);
            assert!((0.0..=1.0).contains(&s), "score {} out of range at {}", s, g);
            assert!(s <= prev, "score rose from {} to {} at {}", prev, s, g);
            prev = s;
            g += 0.01;
        }
    }

    #[test]
    fn test_certificate_threshold() {
        assert!(certificate_eligible(0.7));
        assert!(certificate_eligible(0.95));
        assert!(!certificate_eligible(0.69));
    }
}
