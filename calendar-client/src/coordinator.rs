use calendar_core::dates::{date_offset_in_days, shift_date};
use calendar_core::{Event, RepeatInfo};
use futures::future::join_all;
use tracing::{debug, info};

use crate::api::{EventsApi, Outcome, SeriesPatch};
use crate::transport::Transport;

/// How a series-wide change reaches the server.
enum SeriesTarget<'e> {
    /// One request to the series endpoint under this `repeat.id`.
    Endpoint(&'e str),
    /// One request per visible member.
    Members(Vec<&'e Event>),
}

impl<'e> SeriesTarget<'e> {
    fn select(original: &'e Event, members: Vec<&'e Event>) -> Self {
        match original.repeat.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => Self::Endpoint(id),
            None => Self::Members(members),
        }
    }
}

/// Edit and delete operations over a snapshot of the event collection.
///
/// Every operation settles by calling `on_settled` with an empty list exactly
/// once, whatever happened on the wire. The caller is expected to refetch the
/// collection at that point.
pub struct RecurringOperations<'a, T, F> {
    events: &'a [Event],
    api: &'a EventsApi<T>,
    on_settled: F,
}

impl<'a, T, F> RecurringOperations<'a, T, F>
where
    T: Transport,
    F: Fn(Vec<Event>),
{
    pub fn new(events: &'a [Event], api: &'a EventsApi<T>, on_settled: F) -> Self {
        Self {
            events,
            api,
            on_settled,
        }
    }

    pub fn find_related_recurring_events(&self, event: &Event) -> Vec<&'a Event> {
        calendar_core::find_related_recurring_events(event, self.events)
    }

    pub async fn handle_recurring_edit(
        &self,
        updated: &Event,
        edit_single_only: bool,
        is_drag_and_drop: bool,
    ) -> Outcome {
        let outcome = self
            .edit(updated, edit_single_only, is_drag_and_drop)
            .await;
        self.settle("edit", &updated.id, outcome)
    }

    pub async fn handle_recurring_delete(&self, event: &Event, delete_single_only: bool) -> Outcome {
        let outcome = self.delete(event, delete_single_only).await;
        self.settle("delete", &event.id, outcome)
    }

    async fn edit(&self, updated: &Event, edit_single_only: bool, is_drag_and_drop: bool) -> Outcome {
        let Some(original) = self.events.iter().find(|event| event.id == updated.id) else {
            debug!(id = %updated.id, "Event not in snapshot, updating it on its own");
            return self.api.update_event(updated).await;
        };

        let related = self.find_related_recurring_events(original);
        if related.is_empty() || edit_single_only {
            debug!(id = %updated.id, "Detaching single occurrence");
            let detached = Event {
                repeat: RepeatInfo::none(),
                ..updated.clone()
            };
            return self.api.update_event(&detached).await;
        }

        let offset = date_offset_in_days(original.date, updated.date);
        let shift = (is_drag_and_drop && offset != 0).then_some(offset);
        let patch = SeriesPatch::from_event(updated);

        match SeriesTarget::select(original, related) {
            SeriesTarget::Endpoint(repeat_id) => {
                debug!(%repeat_id, ?shift, "Editing series through its id");
                let patch = SeriesPatch {
                    date_offset: shift,
                    ..patch
                };
                self.api.update_series(repeat_id, &patch).await
            }
            SeriesTarget::Members(members) => {
                debug!(members = members.len(), ?shift, "Editing series member by member");
                let edits = members
                    .into_iter()
                    .map(|member| {
                        let mut edited = patch.apply_to(member);
                        if let Some(offset) = shift {
                            edited.date = shift_date(member.date, offset);
                        }
                        edited
                    })
                    .collect::<Vec<_>>();

                let outcomes = join_all(edits.iter().map(|event| self.api.update_event(event))).await;
                Outcome::combine(outcomes)
            }
        }
    }

    async fn delete(&self, event: &Event, delete_single_only: bool) -> Outcome {
        let related = self.find_related_recurring_events(event);
        if related.is_empty() || delete_single_only {
            return self.api.delete_event(&event.id).await;
        }

        match SeriesTarget::select(event, related) {
            SeriesTarget::Endpoint(repeat_id) => {
                debug!(%repeat_id, "Deleting series through its id");
                self.api.delete_series(repeat_id).await
            }
            SeriesTarget::Members(members) => {
                debug!(members = members.len(), "Deleting series member by member");
                let outcomes =
                    join_all(members.iter().map(|member| self.api.delete_event(&member.id))).await;
                Outcome::combine(outcomes)
            }
        }
    }

    fn settle(&self, operation: &str, id: &str, outcome: Outcome) -> Outcome {
        info!(operation, id, ?outcome, "Operation settled");
        (self.on_settled)(Vec::new());
        outcome
    }
}
