//! Search and calendar-view filtering of the event list.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::dates::{is_date_in_range, week_dates};
use crate::{Error, Event, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Week,
    Month,
}

impl View {
    #[must_use]
    pub fn contains(self, reference: NaiveDate, date: NaiveDate) -> bool {
        match self {
            Self::Week => {
                let week = week_dates(reference);
                is_date_in_range(date, week[0], week[6])
            }
            Self::Month => date.year() == reference.year() && date.month() == reference.month(),
        }
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(Error::InvalidView(s.into())),
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Week => "week",
            Self::Month => "month",
        })
    }
}

/// Case-insensitive match on title, description and location. An empty term
/// matches everything.
#[must_use]
pub fn matches_search(event: &Event, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    [&event.title, &event.description, &event.location]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&term))
}

/// Events matching `term` and visible in `view` around `reference`, in
/// collection order.
pub fn filter_events<'e>(
    events: &'e [Event],
    term: &str,
    view: View,
    reference: NaiveDate,
) -> Vec<&'e Event> {
    events
        .iter()
        .filter(|event| view.contains(reference, event.date))
        .filter(|event| matches_search(event, term))
        .collect()
}

pub fn events_for_day(events: &[Event], date: NaiveDate) -> Vec<&Event> {
    events.iter().filter(|event| event.date == date).collect()
}
