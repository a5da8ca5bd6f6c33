//! Day-count and delivery-unit helpers used by the metrics engine.
//!
//! Dates are calendar dates, so every difference is a whole number of days.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// KPI label whose contracted delivery is counted in thousands.
pub const CPM_KPI: &str = "CPM";

/// Days between the strategy start and the project end.
/// `None` when either date is missing or the start falls after the end.
pub fn strategy_duration_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i64> {
    let days = (end? - start?).num_days();
    (days >= 0).then_some(days)
}

/// Days left until the project end, clamped at zero once the end has passed.
pub fn days_remaining(end: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    end.map(|end| (end - today).num_days().max(0))
}

/// Contracted delivery is divided by this before computing a target cost.
pub fn delivery_unit_divisor(kpi: Option<&str>) -> Decimal {
    match kpi {
        Some(CPM_KPI) => dec!(1000),
        _ => Decimal::ONE,
    }
}

/// Current calendar date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_duration_requires_both_dates() {
        assert_eq!(strategy_duration_days(None, Some(date(2024, 1, 10))), None);
        assert_eq!(strategy_duration_days(Some(date(2024, 1, 1)), None), None);
        assert_eq!(
            strategy_duration_days(Some(date(2024, 1, 1)), Some(date(2024, 1, 11))),
            Some(10)
        );
    }

    #[test]
    fn test_duration_rejects_start_after_end() {
        assert_eq!(
            strategy_duration_days(Some(date(2024, 2, 1)), Some(date(2024, 1, 1))),
            None
        );
        // Same-day strategies have a zero-length duration, not a missing one.
        assert_eq!(
            strategy_duration_days(Some(date(2024, 1, 1)), Some(date(2024, 1, 1))),
            Some(0)
        );
    }

    #[test]
    fn test_days_remaining_clamps_past_end() {
        let today = date(2024, 6, 15);
        assert_eq!(days_remaining(Some(date(2024, 6, 20)), today), Some(5));
        assert_eq!(days_remaining(Some(date(2024, 6, 15)), today), Some(0));
        assert_eq!(days_remaining(Some(date(2023, 12, 31)), today), Some(0));
        assert_eq!(days_remaining(None, today), None);
    }

    #[test]
    fn test_days_remaining_across_leap_day() {
        assert_eq!(days_remaining(Some(date(2024, 3, 1)), date(2024, 2, 28)), Some(2));
    }

    #[test]
    fn test_delivery_unit_divisor() {
        assert_eq!(delivery_unit_divisor(Some("CPM")), dec!(1000));
        assert_eq!(delivery_unit_divisor(Some("CPC")), dec!(1));
        // Exact match only.
        assert_eq!(delivery_unit_divisor(Some("cpm")), dec!(1));
        assert_eq!(delivery_unit_divisor(None), dec!(1));
    }
}
