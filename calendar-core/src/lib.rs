pub mod dates;
pub mod dnd;
pub mod filter;
pub mod notify;
pub mod recurrence;

mod error;
mod overlap;
mod series;
mod structs;

#[cfg(feature = "ics")]
mod ics;

pub use error::{Error, Result};
pub use overlap::{find_overlaps, TimeSlot};
pub use series::{find_related_recurring_events, SeriesSignature};
pub use structs::{Calendar, Event, EventForm, RepeatInfo, RepeatType};
