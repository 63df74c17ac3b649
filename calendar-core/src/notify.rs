//! Reminders that fire `notificationTime` minutes before an event starts.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub event_id: String,
    pub message: String,
}

impl Notification {
    fn for_event(event: &Event) -> Self {
        Self {
            event_id: event.id.clone(),
            message: format!(
                "{} starts in {} minutes",
                event.title, event.notification_time
            ),
        }
    }
}

/// True while `now` lies within the reminder window: the event has not
/// started yet and starts in at most `notificationTime` minutes.
#[must_use]
pub fn is_due(event: &Event, now: NaiveDateTime) -> bool {
    let start = event.date.and_time(event.start_time);
    let remaining = start.signed_duration_since(now).num_seconds();

    remaining > 0 && remaining <= i64::from(event.notification_time) * 60
}

/// Remembers which events already produced a notification so that polling
/// repeatedly reports each event once.
#[derive(Debug, Default)]
pub struct NotificationTracker {
    notified: HashSet<String>,
}

impl NotificationTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(&mut self, events: &[Event], now: NaiveDateTime) -> Vec<Notification> {
        events
            .iter()
            .filter(|event| is_due(event, now))
            .filter(|event| self.notified.insert(event.id.clone()))
            .map(Notification::for_event)
            .collect()
    }

    #[must_use]
    pub fn was_notified(&self, event_id: &str) -> bool {
        self.notified.contains(event_id)
    }

    /// Forgets ids that no longer exist in `events`.
    pub fn retain_existing(&mut self, events: &[Event]) {
        let ids = events
            .iter()
            .map(|event| event.id.as_str())
            .collect::<HashSet<_>>();
        self.notified.retain(|id| ids.contains(id.as_str()));
    }
}
