use chrono::NaiveDate;

/// Days before expiry at which reminders begin. A record inside the window is
/// reminded on every daily cycle until it leaves the store.
pub const REMINDER_WINDOW_DAYS: i64 = 7;

/// Whole days between the reference date and the end date. Zero on the end
/// date itself, negative once it has passed.
pub fn days_remaining(end_date: NaiveDate, reference: NaiveDate) -> i64 {
    (end_date - reference).num_days()
}

/// Whether a record is due for a reminder on `reference`. Records expiring
/// today and records already past their end date match as well; the evaluator
/// does not distinguish "expiring soon" from "already expired".
pub fn is_expiring_soon(end_date: NaiveDate, reference: NaiveDate, window_days: i64) -> bool {
    days_remaining(end_date, reference) <= window_days
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let reference = date(2024, 1, 1);
        assert!(is_expiring_soon(date(2024, 1, 8), reference, REMINDER_WINDOW_DAYS));
        assert!(!is_expiring_soon(date(2024, 1, 9), reference, REMINDER_WINDOW_DAYS));
    }

    #[test]
    fn already_expired_records_still_match() {
        let reference = date(2024, 1, 1);
        assert_eq!(days_remaining(date(2023, 12, 31), reference), -1);
        assert!(is_expiring_soon(date(2023, 12, 31), reference, REMINDER_WINDOW_DAYS));
        assert!(is_expiring_soon(date(2023, 6, 1), reference, REMINDER_WINDOW_DAYS));
    }

    #[test]
    fn expiring_today_matches() {
        let reference = date(2024, 1, 1);
        assert_eq!(days_remaining(reference, reference), 0);
        assert!(is_expiring_soon(reference, reference, REMINDER_WINDOW_DAYS));
    }

    #[test]
    fn distant_expiry_does_not_match() {
        let reference = date(2024, 1, 1);
        assert!(!is_expiring_soon(date(2024, 3, 1), reference, REMINDER_WINDOW_DAYS));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let reference = date(2024, 6, 15);
        let end = date(2024, 6, 20);
        let first = is_expiring_soon(end, reference, REMINDER_WINDOW_DAYS);
        let second = is_expiring_soon(end, reference, REMINDER_WINDOW_DAYS);
        assert!(first);
        assert_eq!(first, second);
    }
}
