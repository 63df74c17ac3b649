use chrono::NaiveTime;

use crate::{Event, RepeatType};

/// The fields shared by every occurrence generated from one recurrence
/// definition. `date` is not part of it since occurrences differ by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesSignature<'a> {
    pub kind: RepeatType,
    pub interval: u32,
    pub title: &'a str,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: &'a str,
    pub location: &'a str,
    pub category: &'a str,
}

impl Event {
    #[must_use]
    pub fn series_signature(&self) -> SeriesSignature<'_> {
        SeriesSignature {
            kind: self.repeat.kind,
            interval: self.repeat.interval,
            title: &self.title,
            start_time: self.start_time,
            end_time: self.end_time,
            description: &self.description,
            location: &self.location,
            category: &self.category,
        }
    }
}

/// Events of `events` that belong to the same recurring series as `target`,
/// in collection order and including the target itself.
///
/// Membership is decided by signature, not by `repeat.id`: the id is what the
/// server groups by, but the visible snapshot can diverge from it once an
/// occurrence has been edited on its own. A series with a single visible
/// member is not a series, so both non-recurring targets and singletons
/// yield an empty list.
pub fn find_related_recurring_events<'e>(target: &Event, events: &'e [Event]) -> Vec<&'e Event> {
    if !target.is_recurring() {
        return Vec::new();
    }

    let signature = target.series_signature();
    let series = events
        .iter()
        .filter(|event| event.is_recurring() && event.series_signature() == signature)
        .collect::<Vec<_>>();

    if series.len() > 1 {
        series
    } else {
        Vec::new()
    }
}
