use std::cell::Cell;
use std::{env, io, process};

use anyhow::{anyhow, bail, Context, Result};
use calendar_client::cli::{self, Command};
use calendar_client::{
    Config, EventsApi, HttpTransport, Outcome, RecordingTransport, RecurringOperations, Transport,
};
use calendar_core::dates::shift_date;
use calendar_core::dnd::change_date_only;
use calendar_core::filter::{filter_events, View};
use calendar_core::notify::NotificationTracker;
use calendar_core::recurrence::generate_occurrences;
use calendar_core::{find_overlaps, Calendar, Event, EventForm, TimeSlot};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How far ahead an open-ended series is generated.
const SERIES_HORIZON_DAYS: i64 = 365;

enum Change<'e> {
    Move {
        event: &'e Event,
        moved: Event,
        series: bool,
    },
    Delete {
        event: &'e Event,
        series: bool,
    },
    Create(Vec<EventForm>),
}

impl Change<'_> {
    /// The day the change lands on.
    fn date(&self) -> Option<NaiveDate> {
        match self {
            Change::Move { moved, .. } => Some(moved.date),
            Change::Delete { event, .. } => Some(event.date),
            Change::Create(forms) => forms.first().map(|form| form.date),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "calendar_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = cli::parse(env::args().skip(1).collect());

    if args.command == Command::Help {
        println!("{}", cli::usage());
        return Ok(());
    }

    let config = match Config::from_env(args.url.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let api = EventsApi::new(HttpTransport::new(config.base_url));
    let events = api
        .fetch_events()
        .await
        .context("Failed to fetch events")?;
    let today = Local::now().date_naive();

    let change = match args.command {
        Command::Help => return Ok(()),
        Command::List { search, view, date } => {
            for event in filter_events(&events, &search, view, date.unwrap_or(today)) {
                println!("{}", describe(event));
            }
            return Ok(());
        }
        Command::Overlaps { id } => {
            let event = find(&events, &id)?;
            for other in find_overlaps(&TimeSlot::from(event), &events) {
                println!("{}", describe(other));
            }
            return Ok(());
        }
        Command::Series { id } => {
            let event = find(&events, &id)?;
            for member in calendar_core::find_related_recurring_events(event, &events) {
                println!("{}", describe(member));
            }
            return Ok(());
        }
        Command::Notify { at } => {
            let now = at.unwrap_or_else(|| Local::now().naive_local());
            for notification in NotificationTracker::new().poll(&events, now) {
                println!("{}", notification.message);
            }
            return Ok(());
        }
        Command::Export => {
            let calendar = Calendar { events };
            print!("{}", calendar.to_ics(env!("CARGO_PKG_NAME")));
            return Ok(());
        }
        Command::Move { id, date, series } => {
            let event = find(&events, &id)?;
            let moved = change_date_only(event, date);
            warn_overlaps(&TimeSlot::from(&moved), &events);
            Change::Move {
                event,
                moved,
                series,
            }
        }
        Command::Delete { id, series } => Change::Delete {
            event: find(&events, &id)?,
            series,
        },
        Command::Create(form) => {
            form.validate()?;
            warn_overlaps(&TimeSlot::from(&form), &events);
            let horizon = shift_date(form.date, SERIES_HORIZON_DAYS);
            Change::Create(generate_occurrences(&form, horizon))
        }
    };

    if args.dry_run {
        let preview = EventsApi::new(RecordingTransport::new());
        let (outcome, _) = apply(&preview, &events, change).await?;
        for request in preview.transport().requests() {
            println!("{request}");
        }
        return report(outcome);
    }

    let focus = change.date().unwrap_or(today);
    let (outcome, refresh) = apply(&api, &events, change).await?;
    if refresh {
        let refreshed = api
            .fetch_events()
            .await
            .context("Failed to refetch events")?;
        info!(events = refreshed.len(), "Refreshed event list");
        for event in filter_events(&refreshed, "", View::Week, focus) {
            println!("{}", describe(event));
        }
    }

    report(outcome)
}

/// Sends `change` through `api`. The flag tells whether the collection has
/// to be refetched.
async fn apply<T: Transport>(
    api: &EventsApi<T>,
    events: &[Event],
    change: Change<'_>,
) -> Result<(Outcome, bool)> {
    let refresh = Cell::new(false);
    let ops = RecurringOperations::new(events, api, |_| refresh.set(true));

    let outcome = match change {
        Change::Move {
            event,
            moved,
            series,
        } => {
            if series && ops.find_related_recurring_events(event).is_empty() {
                warn!(id = %event.id, "Event is not part of a series, moving it alone");
            }
            ops.handle_recurring_edit(&moved, !series, true).await
        }
        Change::Delete { event, series } => ops.handle_recurring_delete(event, !series).await,
        Change::Create(forms) => {
            let created = match forms.as_slice() {
                [form] => api.create_event(form).await,
                forms => api.create_events(forms).await,
            };
            created.context("Failed to create event")?;
            return Ok((Outcome::Ok, true));
        }
    };

    Ok((outcome, refresh.get()))
}

fn report(outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Ok => Ok(()),
        Outcome::TransportError => bail!("The calendar API could not be reached"),
        Outcome::HttpError(status) => bail!("The calendar API rejected the change ({status})"),
        Outcome::PartialFailure { succeeded, failed } => bail!(
            "Only {succeeded} of {} changes were applied",
            succeeded + failed
        ),
    }
}

fn find<'e>(events: &'e [Event], id: &str) -> Result<&'e Event> {
    events
        .iter()
        .find(|event| event.id == id)
        .ok_or_else(|| anyhow!("No event with id `{id}`"))
}

fn warn_overlaps(slot: &TimeSlot<'_>, events: &[Event]) {
    for other in find_overlaps(slot, events) {
        warn!("Overlaps with {}", describe(other));
    }
}

fn describe(event: &Event) -> String {
    format!(
        "{}  {} {}-{}  {}",
        event.id,
        event.date,
        event.start_time.format("%H:%M"),
        event.end_time.format("%H:%M"),
        event.title
    )
}
