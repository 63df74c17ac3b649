use calendar_core::{Calendar, Event, EventForm};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::transport::{ApiRequest, Method, Transport};
use crate::ApiError;

pub const EVENTS_PATH: &str = "/api/events";
pub const EVENTS_LIST_PATH: &str = "/api/events-list";
pub const RECURRING_EVENTS_PATH: &str = "/api/recurring-events";

/// Everything but the unreserved characters of RFC 3986.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// `{collection}/{id}` with `id` encoded as exactly one path segment. Ids
/// that URL resolution would treat as dot segments cannot be addressed.
fn resource_path(collection: &str, id: &str) -> Result<String, ApiError> {
    if matches!(id, "" | "." | "..") {
        return Err(ApiError::Url(format!("`{id}` is not a valid resource id")));
    }

    Ok(format!("{collection}/{}", utf8_percent_encode(id, PATH_SEGMENT)))
}

/// How a mutation ended. Failures never surface as errors from a mutation;
/// they are logged and reported here instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    TransportError,
    HttpError(u16),
    /// Some requests of a fan-out succeeded and the rest did not. Nothing is
    /// rolled back.
    PartialFailure { succeeded: usize, failed: usize },
}

impl Outcome {
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    /// All ok is ok, all failed is the first failure, anything in between is
    /// a partial failure.
    pub fn combine<I: IntoIterator<Item = Outcome>>(outcomes: I) -> Self {
        let mut succeeded = 0;
        let mut failed = 0;
        let mut first_failure = None;

        for outcome in outcomes {
            if outcome.is_ok() {
                succeeded += 1;
            } else {
                failed += 1;
                first_failure.get_or_insert(outcome);
            }
        }

        match first_failure {
            None => Self::Ok,
            Some(failure) if succeeded == 0 => failure,
            Some(_) => Self::PartialFailure { succeeded, failed },
        }
    }
}

/// Shared fields propagated to every occurrence of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPatch {
    pub title: String,
    pub description: String,
    pub location: String,
    pub category: String,
    pub notification_time: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_offset: Option<i64>,
}

impl SeriesPatch {
    #[must_use]
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone(),
            category: event.category.clone(),
            notification_time: event.notification_time,
            date_offset: None,
        }
    }

    /// `event` with the shared fields replaced. The date offset is not
    /// applied here.
    #[must_use]
    pub fn apply_to(&self, event: &Event) -> Event {
        Event {
            title: self.title.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            category: self.category.clone(),
            notification_time: self.notification_time,
            ..event.clone()
        }
    }
}

#[derive(Serialize)]
struct EventList<'a> {
    events: &'a [EventForm],
}

pub struct EventsApi<T> {
    transport: T,
}

impl<T: Transport> EventsApi<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch_events(&self) -> Result<Vec<Event>, ApiError> {
        let response = self
            .transport
            .execute(ApiRequest::new(Method::Get, EVENTS_PATH))
            .await?;

        if !response.is_success() {
            return Err(ApiError::Status(response.status));
        }

        Ok(response.json::<Calendar>()?.events)
    }

    pub async fn create_event(&self, form: &EventForm) -> Result<(), ApiError> {
        let request = ApiRequest::new(Method::Post, EVENTS_PATH).with_json(form)?;
        self.expect_success(request).await
    }

    /// Creates every occurrence of a series in one request; the server
    /// assigns them a shared `repeat.id`.
    pub async fn create_events(&self, forms: &[EventForm]) -> Result<(), ApiError> {
        let request =
            ApiRequest::new(Method::Post, EVENTS_LIST_PATH).with_json(&EventList { events: forms })?;
        self.expect_success(request).await
    }

    pub async fn update_event(&self, event: &Event) -> Outcome {
        let request = resource_path(EVENTS_PATH, &event.id)
            .and_then(|path| ApiRequest::new(Method::Put, path).with_json(event));
        self.send(request).await
    }

    pub async fn delete_event(&self, id: &str) -> Outcome {
        let request = resource_path(EVENTS_PATH, id).map(|path| ApiRequest::new(Method::Delete, path));
        self.send(request).await
    }

    pub async fn update_series(&self, repeat_id: &str, patch: &SeriesPatch) -> Outcome {
        let request = resource_path(RECURRING_EVENTS_PATH, repeat_id)
            .and_then(|path| ApiRequest::new(Method::Put, path).with_json(patch));
        self.send(request).await
    }

    pub async fn delete_series(&self, repeat_id: &str) -> Outcome {
        let request = resource_path(RECURRING_EVENTS_PATH, repeat_id)
            .map(|path| ApiRequest::new(Method::Delete, path));
        self.send(request).await
    }

    async fn expect_success(&self, request: ApiRequest) -> Result<(), ApiError> {
        let response = self.transport.execute(request).await?;

        if response.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status(response.status))
        }
    }

    async fn send(&self, request: Result<ApiRequest, ApiError>) -> Outcome {
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                error!("Failed to build request: {err}");
                return Outcome::TransportError;
            }
        };

        let (method, path) = (request.method, request.path.clone());
        debug!(%method, %path, "Sending request");

        match self.transport.execute(request).await {
            Ok(response) if response.is_success() => Outcome::Ok,
            Ok(response) => {
                warn!(%method, %path, status = response.status, "Request rejected");
                Outcome::HttpError(response.status)
            }
            Err(err) => {
                error!(%method, %path, "API request failed: {err}");
                Outcome::TransportError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use calendar_core::dates::{parse_date, parse_time};
    use calendar_core::{RepeatInfo, RepeatType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::transport::{RecordingTransport, Reply};

    fn standup() -> Event {
        Event {
            id: "1".into(),
            title: "Standup".into(),
            date: parse_date("2025-10-15").unwrap(),
            start_time: parse_time("09:00").unwrap(),
            end_time: parse_time("09:15").unwrap(),
            description: "daily sync".into(),
            location: "Room A".into(),
            category: "work".into(),
            repeat: RepeatInfo::new(RepeatType::Daily, 1),
            notification_time: 10,
        }
    }

    #[test]
    fn combine_outcomes() {
        assert_eq!(Outcome::combine([]), Outcome::Ok);
        assert_eq!(Outcome::combine([Outcome::Ok, Outcome::Ok]), Outcome::Ok);
        assert_eq!(
            Outcome::combine([Outcome::HttpError(404), Outcome::TransportError]),
            Outcome::HttpError(404)
        );
        assert_eq!(
            Outcome::combine([Outcome::Ok, Outcome::TransportError, Outcome::Ok]),
            Outcome::PartialFailure {
                succeeded: 2,
                failed: 1
            }
        );
    }

    #[test]
    fn patch_serializes_offset_only_when_set() {
        let patch = SeriesPatch::from_event(&standup());
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "title": "Standup",
                "description": "daily sync",
                "location": "Room A",
                "category": "work",
                "notificationTime": 10,
            })
        );

        let shifted = SeriesPatch {
            date_offset: Some(-2),
            ..patch
        };
        assert_eq!(serde_json::to_value(&shifted).unwrap()["dateOffset"], -2);
    }

    #[test]
    fn patch_keeps_identity_and_schedule() {
        let mut edited = standup();
        edited.title = "Sync".into();
        edited.start_time = parse_time("11:00").unwrap();

        let mut sibling = standup();
        sibling.id = "2".into();
        sibling.date = parse_date("2025-10-16").unwrap();

        let patched = SeriesPatch::from_event(&edited).apply_to(&sibling);
        assert_eq!(patched.title, "Sync");
        assert_eq!(patched.id, "2");
        assert_eq!(patched.date, sibling.date);
        assert_eq!(patched.start_time, sibling.start_time);
    }

    #[test]
    fn ids_become_a_single_path_segment() {
        assert_eq!(resource_path(EVENTS_PATH, "event-1_a.b~").unwrap(), "/api/events/event-1_a.b~");
        assert_eq!(resource_path(EVENTS_PATH, "1/../2").unwrap(), "/api/events/1%2F..%2F2");
        assert_eq!(resource_path(EVENTS_PATH, "a#b?c").unwrap(), "/api/events/a%23b%3Fc");
        assert_eq!(
            resource_path(RECURRING_EVENTS_PATH, "série 1").unwrap(),
            "/api/recurring-events/s%C3%A9rie%201"
        );
        assert!(matches!(resource_path(EVENTS_PATH, ".."), Err(ApiError::Url(_))));
        assert!(matches!(resource_path(EVENTS_PATH, ""), Err(ApiError::Url(_))));
    }

    #[tokio::test]
    async fn unaddressable_ids_send_nothing() {
        let api = EventsApi::new(RecordingTransport::new());

        assert_eq!(api.delete_event("..").await, Outcome::TransportError);
        assert_eq!(api.delete_series(".").await, Outcome::TransportError);
        assert!(api.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn fetch_reads_the_events_envelope() {
        let body = json!({ "events": [serde_json::to_value(standup()).unwrap()] }).to_string();
        let api = EventsApi::new(RecordingTransport::replying(Reply::Respond { status: 200, body }));

        assert_eq!(api.fetch_events().await.unwrap(), [standup()]);
        assert_eq!(api.transport().requests()[0].to_string(), "GET /api/events");
    }

    #[tokio::test]
    async fn fetch_surfaces_failures() {
        let api = EventsApi::new(RecordingTransport::replying(Reply::status(500)));
        assert!(matches!(api.fetch_events().await, Err(ApiError::Status(500))));

        let api = EventsApi::new(RecordingTransport::replying(Reply::Respond {
            status: 200,
            body: "not json".into(),
        }));
        assert!(matches!(api.fetch_events().await, Err(ApiError::Json(_))));
    }

    #[tokio::test]
    async fn bulk_create_wraps_forms() {
        let api = EventsApi::new(RecordingTransport::replying(Reply::status(201)));
        let forms = [standup().to_form()];

        api.create_events(&forms).await.unwrap();

        let requests = api.transport().requests();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].path, EVENTS_LIST_PATH);
        assert_eq!(requests[0].body.as_ref().unwrap()["events"][0]["title"], "Standup");
        assert!(requests[0].body.as_ref().unwrap()["events"][0].get("id").is_none());
    }

    #[tokio::test]
    async fn mutations_fold_failures_into_outcomes() {
        let api = EventsApi::new(
            RecordingTransport::new()
                .with_reply("/api/events/404", Reply::status(404))
                .with_reply("/api/events/down", Reply::Fail("connection refused".into())),
        );

        assert_eq!(api.delete_event("1").await, Outcome::Ok);
        assert_eq!(api.delete_event("404").await, Outcome::HttpError(404));
        assert_eq!(api.delete_event("down").await, Outcome::TransportError);
        assert_eq!(api.delete_series("repeat-1").await, Outcome::Ok);
        assert_eq!(
            api.transport().requests()[3].path,
            "/api/recurring-events/repeat-1"
        );
    }
}
