//! Client side of the calendar REST API.
//!
//! [`coordinator::RecurringOperations`] decides, for every edit or delete of
//! an event that may belong to a repeating series, whether the change targets
//! one occurrence or the whole series, and whether the series is addressed
//! through its `repeat.id` or by fanning out one request per occurrence.
//! Whatever happens on the wire, the operation settles by invoking the
//! caller's refresh callback with an empty list.

pub mod api;
pub mod cli;
pub mod config;
pub mod coordinator;
pub mod transport;

mod error;

pub use api::{EventsApi, Outcome, SeriesPatch};
pub use config::Config;
pub use coordinator::RecurringOperations;
pub use error::{ApiError, ConfigError};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, RecordingTransport, Reply, Transport};
