//! Percentage thresholds over token balances
//!
//! Percentages are whole numbers in `0..=100`. Comparisons are exact: no
//! fractional threshold is ever materialised, so balances in the 10^18+ range
//! lose no precision and nothing overflows for any `u128` input.

use crate::Balance;

/// Highest accepted percentage value.
pub const MAX_PERCENT: u32 = 100;

/// `true` when `value` is strictly greater than `percent`% of `base`.
///
/// Equivalent to `100 * value > percent * base` evaluated in unbounded
/// integers. Percentages above 100 are clamped.
pub fn exceeds_percent_of(value: Balance, percent: u32, base: Balance) -> bool {
    let p = Balance::from(percent.min(MAX_PERCENT));
    let (q, r) = (base / 100, base % 100);

    // p * q <= base, cannot overflow
    let whole = p * q;
    if value < whole {
        return false;
    }

    // Remaining question: 100 * d > p * r, where p * r < 10_000
    let d = value - whole;
    if d >= 100 {
        return true;
    }
    d * 100 > p * r
}

/// Floor of `percent`% of `base`, for display purposes.
pub fn percent_of(percent: u32, base: Balance) -> Balance {
    let p = Balance::from(percent.min(MAX_PERCENT));
    p * (base / 100) + p * (base % 100) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_greater() {
        // 50% of 100 is 50: equal is not enough
        assert!(!exceeds_percent_of(50, 50, 100));
        assert!(exceeds_percent_of(51, 50, 100));
        assert!(!exceeds_percent_of(49, 50, 100));
    }

    #[test]
    fn test_fractional_threshold() {
        // 33% of 10 is 3.3
        assert!(!exceeds_percent_of(3, 33, 10));
        assert!(exceeds_percent_of(4, 33, 10));
    }

    #[test]
    fn test_zero_cases() {
        assert!(!exceeds_percent_of(0, 0, 0));
        assert!(exceeds_percent_of(1, 0, 0));
        assert!(exceeds_percent_of(1, 0, 1_000));
        assert!(!exceeds_percent_of(0, 50, 1_000));
    }

    #[test]
    fn test_large_balances() {
        let supply: Balance = 2_000_000_000_000_000_000;
        let participation: Balance = 1_000_000_000_000_000_000;
        assert!(exceeds_percent_of(participation, 33, supply));
        assert!(!exceeds_percent_of(participation, 50, supply));
        assert!(!exceeds_percent_of(participation, 100, supply));
    }

    #[test]
    fn test_no_overflow_at_max() {
        assert!(!exceeds_percent_of(u128::MAX, 100, u128::MAX));
        assert!(exceeds_percent_of(u128::MAX, 99, u128::MAX));
        assert!(!exceeds_percent_of(u128::MAX - 1, 100, u128::MAX));
        assert!(exceeds_percent_of(u128::MAX, 100, u128::MAX - 1));
    }

    #[test]
    fn test_percent_clamped() {
        assert_eq!(
            exceeds_percent_of(101, 250, 100),
            exceeds_percent_of(101, 100, 100)
        );
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(33, 10), 3);
        assert_eq!(percent_of(50, 1_000), 500);
        assert_eq!(percent_of(100, u128::MAX), u128::MAX);
    }
}
