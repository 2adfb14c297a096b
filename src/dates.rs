// src/dates.rs
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};

/// Format used for every key in the workout log.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical key ("YYYY-MM-DD", zero-padded) for a local calendar date.
///
/// Takes a `NaiveDate` so no timezone conversion can shift the day.
pub fn date_key(date: NaiveDate) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    )
}

/// Canonical key for an instant as seen on the wall calendar of its own zone.
pub fn date_key_in<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    date_key(instant.date_naive())
}

/// Today's date on the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Canonical key for today's local date.
pub fn today_key() -> String {
    date_key(today())
}

/// Strict parse of a canonical key. Rejects anything that would not
/// format back to the same string (e.g. "2024-5-1").
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()?;
    (date_key(date) == key).then_some(date)
}

/// Every calendar day of `month` (1-12) in `year`, ascending.
/// Returns an empty vector for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .collect()
}

/// The `n` calendar days ending at `end` (inclusive), oldest first.
pub fn last_n_days_from(end: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..i64::from(n))
        .rev()
        .filter_map(|offset| end.checked_sub_signed(Duration::days(offset)))
        .collect()
}

/// The `n` calendar days ending today, oldest first.
pub fn last_n_days(n: u32) -> Vec<NaiveDate> {
    last_n_days_from(today(), n)
}

/// Calendar grid cells for a month, Sunday first: `None` for the padding
/// before the 1st, then one `Some(date)` per day.
pub fn month_grid(year: i32, month: u32) -> Vec<Option<NaiveDate>> {
    let days = days_in_month(year, month);
    let padding = days
        .first()
        .map_or(0, |d| d.weekday().num_days_from_sunday() as usize);
    std::iter::repeat(None)
        .take(padding)
        .chain(days.into_iter().map(Some))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_key_is_zero_padded() {
        assert_eq!(date_key(ymd(2024, 5, 1)), "2024-05-01");
        assert_eq!(date_key(ymd(2024, 12, 31)), "2024-12-31");
    }

    #[test]
    fn test_date_key_uses_wall_calendar_of_zone() {
        // 2024-05-01T23:30 at UTC-12 is already 2024-05-02 in UTC.
        let minus_12 = FixedOffset::west_opt(12 * 3600).unwrap();
        let late = minus_12.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
        assert_eq!(date_key_in(&late), "2024-05-01");
        assert_eq!(date_key_in(&late.with_timezone(&Utc)), "2024-05-02");

        // 2024-05-01T00:15 at UTC+14 is still 2024-04-30 in UTC.
        let plus_14 = FixedOffset::east_opt(14 * 3600).unwrap();
        let early = plus_14.with_ymd_and_hms(2024, 5, 1, 0, 15, 0).unwrap();
        assert_eq!(date_key_in(&early), "2024-05-01");
        assert_eq!(date_key_in(&early.with_timezone(&Utc)), "2024-04-30");
    }

    #[test]
    fn test_today_key_matches_local_date() {
        let key = today_key();
        assert_eq!(parse_date_key(&key), Some(today()));
    }

    #[test]
    fn test_parse_date_key_is_strict() {
        assert_eq!(parse_date_key("2024-05-01"), Some(ymd(2024, 5, 1)));
        assert_eq!(parse_date_key("2024-5-1"), None);
        assert_eq!(parse_date_key("2024-02-30"), None);
        assert_eq!(parse_date_key("yesterday"), None);
    }

    #[test]
    fn test_days_in_month() {
        let feb_leap = days_in_month(2024, 2);
        assert_eq!(feb_leap.len(), 29);
        assert_eq!(feb_leap[0], ymd(2024, 2, 1));
        assert_eq!(feb_leap[28], ymd(2024, 2, 29));
        assert_eq!(days_in_month(2023, 2).len(), 28);
        assert_eq!(days_in_month(2024, 12).len(), 31);
        assert!(days_in_month(2024, 13).is_empty());
    }

    #[test]
    fn test_last_n_days_from_crosses_month_boundary() {
        let days = last_n_days_from(ymd(2024, 3, 2), 4);
        assert_eq!(
            days,
            vec![ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1), ymd(2024, 3, 2)]
        );
        assert!(last_n_days_from(ymd(2024, 3, 2), 0).is_empty());
    }

    #[test]
    fn test_last_n_days_ends_today() {
        let days = last_n_days(7);
        assert_eq!(days.len(), 7);
        assert_eq!(*days.last().unwrap(), today());
    }

    #[test]
    fn test_month_grid_pads_to_weekday() {
        // 2024-05-01 was a Wednesday.
        let grid = month_grid(2024, 5);
        assert_eq!(grid.iter().take_while(|c| c.is_none()).count(), 3);
        assert_eq!(grid[3], Some(ymd(2024, 5, 1)));
        assert_eq!(grid.len(), 3 + 31);
    }
}
