//! # Seasonal Climate Profile
//!
//! Fixed monthly atmospheric temperatures around the data center. Month indices are
//! zero-based (0 = January) and supplied by the caller on every step.

use chrono::Month;

/// Number of months in the seasonal cycle
pub const MONTHS_PER_YEAR: u8 = 12;

/// Mean atmospheric temperature per month in °C, January first
pub const MONTHLY_ATMOSPHERIC_TEMPERATURES: [f64; MONTHS_PER_YEAR as usize] = [
    1.0, 5.0, 7.0, 10.0, 11.0, 20.0, 23.0, 24.0, 22.0, 10.0, 5.0, 1.0,
];

/// Whether `month` is a valid zero-based month index
pub fn is_valid_month(month: u8) -> bool {
    month < MONTHS_PER_YEAR
}

/// Atmospheric temperature for a zero-based month index.
///
/// Returns `None` for indices outside 0..=11.
pub fn atmospheric_temperature(month: u8) -> Option<f64> {
    MONTHLY_ATMOSPHERIC_TEMPERATURES
        .get(month as usize)
        .copied()
}

/// Calendar month for a zero-based index
pub fn calendar_month(month: u8) -> Option<Month> {
    Month::try_from(month.checked_add(1)?).ok()
}

/// English month name, or "invalid" for out-of-range indices
pub fn month_name(month: u8) -> &'static str {
    calendar_month(month).map_or("invalid", |m| m.name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1.0)]
    #[case(3, 10.0)]
    #[case(6, 23.0)]
    #[case(7, 24.0)]
    #[case(11, 1.0)]
    fn test_monthly_profile(#[case] month: u8, #[case] expected: f64) {
        assert_eq!(atmospheric_temperature(month), Some(expected));
    }

    #[test]
    fn test_out_of_range_month() {
        assert_eq!(atmospheric_temperature(12), None);
        assert!(!is_valid_month(12));
        assert_eq!(month_name(200), "invalid");
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(0), "January");
        assert_eq!(month_name(6), "July");
        assert_eq!(month_name(11), "December");
    }

    #[test]
    fn test_summer_warmer_than_winter() {
        let january = atmospheric_temperature(0).unwrap();
        let july = atmospheric_temperature(6).unwrap();
        assert!(july > january);
    }
}
