//! Date arithmetic on local wall-clock dates.

use chrono::{Datelike, Days, NaiveDate, NaiveTime};

use crate::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(s.into()))
}

/// Accepts `HH:MM` as well as `HH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| Error::InvalidTime(s.into()))
}

/// Zero-padded `YYYY-MM-DD`.
#[must_use]
pub fn format_date(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}

/// Whole days from `from` to `to`, positive when `to` is later.
#[must_use]
pub fn date_offset_in_days(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// Moves `date` by `offset_days` calendar days. Saturates at the limits of
/// the representable range instead of panicking.
#[must_use]
pub fn shift_date(date: NaiveDate, offset_days: i64) -> NaiveDate {
    let days = Days::new(offset_days.unsigned_abs());

    if offset_days < 0 {
        date.checked_sub_days(days).unwrap_or(NaiveDate::MIN)
    } else {
        date.checked_add_days(days).unwrap_or(NaiveDate::MAX)
    }
}

#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (first, next) {
        (Some(first), Some(next)) => date_offset_in_days(first, next) as u32,
        _ => 0,
    }
}

/// The Sunday-first week containing `date`.
#[must_use]
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let sunday = shift_date(date, -i64::from(date.weekday().num_days_from_sunday()));
    std::array::from_fn(|idx| shift_date(sunday, idx as i64))
}

/// Month grid of `date`'s month, one row per Sunday-first week. Cells outside
/// the month are `None`.
#[must_use]
pub fn weeks_at_month(date: NaiveDate) -> Vec<[Option<u32>; 7]> {
    let Some(first) = date.with_day(1) else {
        return Vec::new();
    };

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut slot = first.weekday().num_days_from_sunday() as usize;

    for day in 1..=days_in_month(first.year(), first.month()) {
        week[slot] = Some(day);
        slot += 1;

        if slot == week.len() {
            weeks.push(week);
            week = [None; 7];
            slot = 0;
        }
    }

    if slot > 0 {
        weeks.push(week);
    }

    weeks
}

#[must_use]
pub fn is_date_in_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start <= date && date <= end
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn offset_is_signed() {
        assert_eq!(date_offset_in_days(date("2025-10-15"), date("2025-10-18")), 3);
        assert_eq!(date_offset_in_days(date("2025-10-18"), date("2025-10-15")), -3);
        assert_eq!(date_offset_in_days(date("2025-10-15"), date("2025-10-15")), 0);
    }

    #[test]
    fn shift_rolls_over_month_and_year() {
        assert_eq!(shift_date(date("2025-01-31"), 1), date("2025-02-01"));
        assert_eq!(shift_date(date("2025-12-30"), 3), date("2026-01-02"));
        assert_eq!(shift_date(date("2024-02-28"), 1), date("2024-02-29"));
        assert_eq!(shift_date(date("2025-02-28"), 1), date("2025-03-01"));
        assert_eq!(shift_date(date("2025-03-01"), -1), date("2025-02-28"));
    }

    #[test]
    fn shift_then_offset_recovers_the_offset() {
        let start = date("2024-02-27");
        for n in [-400, -31, -1, 0, 1, 2, 29, 365, 366, 1000] {
            assert_eq!(date_offset_in_days(start, shift_date(start, n)), n);
        }
    }

    #[test]
    fn format_pads_components() {
        assert_eq!(format_date(2025, 1, 5), "2025-01-05");
        assert_eq!(format_date(2025, 12, 31), "2025-12-31");
    }

    #[test]
    fn parses_times_with_and_without_seconds() {
        assert_eq!(parse_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_time("09:30:00").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert_eq!(parse_time("9h30"), Err(Error::InvalidTime("9h30".into())));
        assert_eq!(parse_date("2025-13-01"), Err(Error::InvalidDate("2025-13-01".into())));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2025, 12), 31);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 13), 0);
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2025-10-15 is a Wednesday.
        let week = week_dates(date("2025-10-15"));
        assert_eq!(week[0], date("2025-10-12"));
        assert_eq!(week[6], date("2025-10-18"));

        let across_years = week_dates(date("2025-12-31"));
        assert_eq!(across_years[0], date("2025-12-28"));
        assert_eq!(across_years[6], date("2026-01-03"));
    }

    #[test]
    fn month_grid_leaves_blank_cells() {
        // October 2025 starts on a Wednesday and has 31 days.
        let weeks = weeks_at_month(date("2025-10-20"));
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0], [None, None, None, Some(1), Some(2), Some(3), Some(4)]);
        assert_eq!(weeks[4], [Some(26), Some(27), Some(28), Some(29), Some(30), Some(31), None]);

        // February 2026 starts on a Sunday and fills exactly four rows.
        assert_eq!(weeks_at_month(date("2026-02-10")).len(), 4);
    }

    #[test]
    fn range_is_inclusive() {
        let (start, end) = (date("2025-10-01"), date("2025-10-31"));
        assert!(is_date_in_range(start, start, end));
        assert!(is_date_in_range(end, start, end));
        assert!(!is_date_in_range(date("2025-11-01"), start, end));
    }
}
