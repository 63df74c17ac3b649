//! Expansion of a repeating form into the occurrences created in bulk.

use chrono::{Datelike, NaiveDate};

use crate::dates::shift_date;
use crate::{EventForm, RepeatInfo, RepeatType};

/// Dates of every occurrence starting at `start`, up to `repeat.end_date` or,
/// for open-ended series, `horizon`.
///
/// Monthly series skip months without the start day and yearly series that
/// start on February 29 only land on leap years.
#[must_use]
pub fn occurrence_dates(start: NaiveDate, repeat: &RepeatInfo, horizon: NaiveDate) -> Vec<NaiveDate> {
    if !repeat.is_recurring() {
        return vec![start];
    }

    let end = repeat.end_date.unwrap_or(horizon);
    let interval = i64::from(repeat.interval);
    let mut dates = Vec::new();

    match repeat.kind {
        RepeatType::None => dates.push(start),
        RepeatType::Daily | RepeatType::Weekly => {
            let step = if repeat.kind == RepeatType::Weekly {
                interval * 7
            } else {
                interval
            };

            let mut date = start;
            while date <= end {
                dates.push(date);
                let next = shift_date(date, step);
                // saturated at the end of the calendar
                if next == date {
                    break;
                }
                date = next;
            }
        }
        RepeatType::Monthly => {
            let first_month = i64::from(start.year()) * 12 + i64::from(start.month0());

            for month_index in (first_month..).step_by(repeat.interval as usize) {
                let Some((year, month)) = split_month_index(month_index) else {
                    break;
                };

                match NaiveDate::from_ymd_opt(year, month, 1) {
                    Some(first) if first <= end => {}
                    _ => break,
                }

                if let Some(date) = NaiveDate::from_ymd_opt(year, month, start.day()) {
                    if date <= end {
                        dates.push(date);
                    }
                }
            }
        }
        RepeatType::Yearly => {
            for year in (i64::from(start.year())..).step_by(repeat.interval as usize) {
                let Ok(year) = i32::try_from(year) else {
                    break;
                };

                if year > end.year() {
                    break;
                }

                if let Some(date) = NaiveDate::from_ymd_opt(year, start.month(), start.day()) {
                    if date <= end {
                        dates.push(date);
                    }
                }
            }
        }
    }

    dates
}

fn split_month_index(month_index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(month_index.div_euclid(12)).ok()?;
    let month = u32::try_from(month_index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// One form per occurrence, each a copy of `form` on its own date.
#[must_use]
pub fn generate_occurrences(form: &EventForm, horizon: NaiveDate) -> Vec<EventForm> {
    occurrence_dates(form.date, &form.repeat, horizon)
        .into_iter()
        .map(|date| EventForm {
            date,
            ..form.clone()
        })
        .collect()
}
