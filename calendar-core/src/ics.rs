use ics::{
    properties::{Categories, Description, DtEnd, DtStart, Location, Summary, Trigger},
    Alarm,
};

use crate::{Calendar, Event};

impl Calendar {
    /// Floating local times: events carry no timezone.
    #[must_use]
    pub fn to_ics<'a>(&'a self, name: &'a str) -> ics::ICalendar<'a> {
        let mut icalendar = ics::ICalendar::new("2.0", name);

        for event in &self.events {
            icalendar.add_event(event.to_ics());
        }

        icalendar
    }
}

impl Event {
    #[must_use]
    pub fn to_ics(&self) -> ics::Event<'_> {
        let start = format!(
            "{}T{}00",
            self.date.format("%Y%m%d"),
            self.start_time.format("%H%M")
        );

        let end = format!(
            "{}T{}00",
            self.date.format("%Y%m%d"),
            self.end_time.format("%H%M")
        );

        let mut ics_event = ics::Event::new(self.id.as_str(), start.clone());

        ics_event.push(DtStart::new(start));
        ics_event.push(DtEnd::new(end));
        ics_event.push(Summary::new(&self.title));

        if !self.description.is_empty() {
            ics_event.push(Description::new(&self.description));
        }

        if !self.location.is_empty() {
            ics_event.push(Location::new(&self.location));
        }

        if !self.category.is_empty() {
            ics_event.push(Categories::new(&self.category));
        }

        if self.notification_time > 0 {
            ics_event.add_alarm(Alarm::display(
                Trigger::new(format!("-PT{}M", self.notification_time)),
                Description::new(&self.title),
            ));
        }

        ics_event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{parse_date, parse_time};
    use crate::RepeatInfo;

    fn standup(notification_time: u32) -> Event {
        Event {
            id: "1".into(),
            title: "Standup".into(),
            date: parse_date("2025-10-15").unwrap(),
            start_time: parse_time("09:00").unwrap(),
            end_time: parse_time("09:15").unwrap(),
            description: String::new(),
            location: "Room A".into(),
            category: "work".into(),
            repeat: RepeatInfo::none(),
            notification_time,
        }
    }

    #[test]
    fn exports_floating_times_and_alarm() {
        let calendar = Calendar {
            events: vec![standup(10)],
        };
        let rendered = calendar.to_ics("calendar-client").to_string();

        assert!(rendered.contains("BEGIN:VCALENDAR"));
        assert!(rendered.contains("UID:1"));
        assert!(rendered.contains("DTSTART:20251015T090000"));
        assert!(rendered.contains("DTEND:20251015T091500"));
        assert!(rendered.contains("SUMMARY:Standup"));
        assert!(rendered.contains("LOCATION:Room A"));
        assert!(rendered.contains("CATEGORIES:work"));
        assert!(rendered.contains("BEGIN:VALARM"));
        assert!(rendered.contains("TRIGGER:-PT10M"));
        assert!(!rendered.contains("DESCRIPTION:\r\n"));
    }

    #[test]
    fn no_alarm_without_notification_time() {
        let rendered = standup(0).to_ics().to_string();
        assert!(!rendered.contains("VALARM"));
    }
}
