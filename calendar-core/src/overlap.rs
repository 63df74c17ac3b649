use chrono::{NaiveDate, NaiveTime};

use crate::{Event, EventForm};

/// A half-open `[start, end)` range on one date, optionally owned by an
/// existing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot<'a> {
    pub id: Option<&'a str>,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot<'_> {
    /// Touching boundaries do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &TimeSlot<'_>) -> bool {
        self.date == other.date && self.start < other.end && other.start < self.end
    }
}

impl<'a> From<&'a Event> for TimeSlot<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            id: Some(event.id.as_str()),
            date: event.date,
            start: event.start_time,
            end: event.end_time,
        }
    }
}

impl From<&EventForm> for TimeSlot<'static> {
    fn from(form: &EventForm) -> Self {
        Self {
            id: None,
            date: form.date,
            start: form.start_time,
            end: form.end_time,
        }
    }
}

/// Every event in `pool` that conflicts with `candidate`, in pool order. An
/// event never conflicts with itself, so the candidate's own id is skipped.
pub fn find_overlaps<'e, I>(candidate: &TimeSlot<'_>, pool: I) -> Vec<&'e Event>
where
    I: IntoIterator<Item = &'e Event>,
{
    pool.into_iter()
        .filter(|event| candidate.id != Some(event.id.as_str()))
        .filter(|event| candidate.overlaps(&TimeSlot::from(*event)))
        .collect()
}
