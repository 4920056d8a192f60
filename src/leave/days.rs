use chrono::NaiveDate;

use crate::error::LeaveError;

/// Every calendar day from `start` to `end`, both ends included. Weekends and
/// holidays count.
pub fn inclusive_day_count(start: NaiveDate, end: NaiveDate) -> Result<u32, LeaveError> {
    if end < start {
        return Err(LeaveError::InvalidRange { start, end });
    }

    let days = (end - start).num_days() + 1;
    u32::try_from(days).map_err(|_| LeaveError::validation("leave range is too long"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn single_day_counts_as_one() {
        assert_eq!(inclusive_day_count(date("2024-01-10"), date("2024-01-10")).unwrap(), 1);
    }

    #[test]
    fn both_ends_are_included() {
        assert_eq!(inclusive_day_count(date("2024-01-10"), date("2024-01-14")).unwrap(), 5);
        assert_eq!(inclusive_day_count(date("2024-02-01"), date("2024-02-10")).unwrap(), 10);
    }

    #[test]
    fn weekends_and_leap_days_are_counted() {
        // Fri 2024-02-23 .. Mon 2024-03-04 spans a weekend pair and Feb 29.
        assert_eq!(inclusive_day_count(date("2024-02-23"), date("2024-03-04")).unwrap(), 11);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let err = inclusive_day_count(date("2024-01-14"), date("2024-01-10")).unwrap_err();
        assert!(matches!(err, LeaveError::InvalidRange { .. }));
    }
}
