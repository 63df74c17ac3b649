use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time `{0}`, expected HH:MM")]
    InvalidTime(String),

    #[error("invalid view `{0}`, expected `week` or `month`")]
    InvalidView(String),

    #[error("invalid repeat type `{0}`")]
    InvalidRepeatType(String),

    #[error("title must not be empty")]
    MissingTitle,

    #[error("start time {} must be before end time {}", .start.format("%H:%M"), .end.format("%H:%M"))]
    InvalidTimeRange { start: NaiveTime, end: NaiveTime },

    #[error("repeat interval must be at least 1")]
    InvalidInterval,

    #[error("repeat ends on {end}, before the first occurrence on {start}")]
    RepeatEndsBeforeStart { start: NaiveDate, end: NaiveDate },
}
