use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Body of `GET /api/events`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calendar {
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(with = "wall_clock"))]
    pub start_time: NaiveTime,
    #[cfg_attr(feature = "serde", serde(with = "wall_clock"))]
    pub end_time: NaiveTime,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub repeat: RepeatInfo,
    #[cfg_attr(feature = "serde", serde(default))]
    pub notification_time: u32,
}

/// An event that has not been persisted yet and therefore carries no id.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EventForm {
    pub title: String,
    pub date: NaiveDate,
    #[cfg_attr(feature = "serde", serde(with = "wall_clock"))]
    pub start_time: NaiveTime,
    #[cfg_attr(feature = "serde", serde(with = "wall_clock"))]
    pub end_time: NaiveTime,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub repeat: RepeatInfo,
    #[cfg_attr(feature = "serde", serde(default))]
    pub notification_time: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RepeatType {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RepeatInfo {
    #[cfg_attr(feature = "serde", serde(rename = "type", default))]
    pub kind: RepeatType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub interval: u32,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub end_date: Option<NaiveDate>,
    /// Series id shared by every occurrence created in one bulk request.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub id: Option<String>,
}

impl RepeatInfo {
    /// The value a detached occurrence carries: `{type: none, interval: 0}`.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(kind: RepeatType, interval: u32) -> Self {
        Self {
            kind,
            interval,
            end_date: None,
            id: None,
        }
    }

    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.kind != RepeatType::None && self.interval > 0
    }
}

impl Event {
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.repeat.is_recurring()
    }

    #[must_use]
    pub fn to_form(&self) -> EventForm {
        EventForm {
            title: self.title.clone(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            description: self.description.clone(),
            location: self.location.clone(),
            category: self.category.clone(),
            repeat: self.repeat.clone(),
            notification_time: self.notification_time,
        }
    }
}

impl EventForm {
    #[must_use]
    pub fn with_id<S: Into<String>>(self, id: S) -> Event {
        Event {
            id: id.into(),
            title: self.title,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            description: self.description,
            location: self.location,
            category: self.category,
            repeat: self.repeat,
            notification_time: self.notification_time,
        }
    }
}

impl EventForm {
    /// Checks performed before an event is created or edited.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::MissingTitle);
        }

        if self.start_time >= self.end_time {
            return Err(Error::InvalidTimeRange {
                start: self.start_time,
                end: self.end_time,
            });
        }

        if self.repeat.kind != RepeatType::None {
            if self.repeat.interval == 0 {
                return Err(Error::InvalidInterval);
            }

            if let Some(end) = self.repeat.end_date.filter(|end| *end < self.date) {
                return Err(Error::RepeatEndsBeforeStart {
                    start: self.date,
                    end,
                });
            }
        }

        Ok(())
    }
}

impl FromStr for RepeatType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(Error::InvalidRepeatType(s.into())),
        }
    }
}

/// `HH:MM` on the wire; seconds are accepted on input and never emitted.
#[cfg(feature = "serde")]
mod wall_clock {
    use chrono::{NaiveTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted_time = format!("{:02}:{:02}", time.hour(), time.minute());
        serializer.serialize_str(&formatted_time)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::dates::parse_time(&raw).map_err(de::Error::custom)
    }
}
