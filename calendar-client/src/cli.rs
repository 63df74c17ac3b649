use std::num::ParseIntError;
use std::process;

use calendar_core::dates::{parse_date, parse_time};
use calendar_core::filter::View;
use calendar_core::{EventForm, RepeatInfo, RepeatType};
use chrono::{NaiveDate, NaiveDateTime};
use getopts::{Matches, Options};
use thiserror::Error;

const COMMANDS: &str = "\
Commands:
    list                  List events [--search TERM] [--view week|month] [--date DATE]
    overlaps ID           Events conflicting with event ID
    series ID             Members of the series containing event ID
    move ID DATE          Move an event to DATE [--series]
    delete ID             Delete an event [--series]
    create                Create an event or a repeating series
    notify                Notifications due now [--at DATE'T'HH:MM]
    export                Print all events as iCalendar";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Options(#[from] getopts::Fail),

    #[error("No command given")]
    MissingCommand,

    #[error("Unknown command `{0}`")]
    UnknownCommand(String),

    #[error("Command `{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("Option '{0}' is required")]
    MissingOption(&'static str),

    #[error("Provided value for option '{name}' is invalid: {source}")]
    InvalidValue {
        name: &'static str,
        source: calendar_core::Error,
    },

    #[error("Provided value for option '{name}' is invalid: {source}")]
    InvalidNumber {
        name: &'static str,
        source: ParseIntError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub url: Option<String>,
    pub dry_run: bool,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List {
        search: String,
        view: View,
        date: Option<NaiveDate>,
    },
    Overlaps {
        id: String,
    },
    Series {
        id: String,
    },
    Move {
        id: String,
        date: NaiveDate,
        series: bool,
    },
    Delete {
        id: String,
        series: bool,
    },
    Create(EventForm),
    Notify {
        at: Option<NaiveDateTime>,
    },
    Export,
    Help,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "u",
        "url",
        "Base URL of the calendar API [Default: $CALENDAR_API_URL or http://127.0.0.1:3000]",
        "URL",
    );
    opts.optflag(
        "n",
        "dry-run",
        "Print the requests a change would send instead of sending them",
    );
    opts.optopt("s", "search", "Only events matching TERM", "TERM");
    opts.optopt("v", "view", "Calendar view [Default: week]", "week|month");
    opts.optopt("d", "date", "Date of the event or view [Default: today]", "YYYY-MM-DD");
    opts.optflag("", "series", "Apply the change to the whole series");
    opts.optopt("", "title", "Event title", "TITLE");
    opts.optopt("", "start", "Start time", "HH:MM");
    opts.optopt("", "end", "End time", "HH:MM");
    opts.optopt("", "description", "Event description", "TEXT");
    opts.optopt("", "location", "Event location", "TEXT");
    opts.optopt("", "category", "Event category", "TEXT");
    opts.optopt(
        "",
        "remind",
        "Minutes before the start to notify [Default: 10]",
        "MINUTES",
    );
    opts.optopt(
        "r",
        "repeat",
        "Repeat the event [Default: none]",
        "none|daily|weekly|monthly|yearly",
    );
    opts.optopt("i", "interval", "Repeat every N periods [Default: 1]", "N");
    opts.optopt("", "until", "Last date of a repeating event", "YYYY-MM-DD");
    opts.optopt(
        "",
        "at",
        "Point in time to check notifications for [Default: now]",
        "YYYY-MM-DDTHH:MM",
    );
    opts
}

pub fn usage() -> String {
    let opts = opts();
    let brief = format!(
        "{}\n\n{COMMANDS}",
        opts.short_usage(env!("CARGO_PKG_NAME"))
    );
    opts.usage(&brief)
}

pub fn parse(args: Vec<String>) -> Args {
    match try_parse(args) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}

/// `args` excludes the program name.
pub fn try_parse(args: Vec<String>) -> Result<Args, CliError> {
    let matches = opts().parse(args)?;

    let url = matches.opt_str("url");
    let dry_run = matches.opt_present("dry-run");

    if matches.opt_present("help") {
        return Ok(Args {
            url,
            dry_run,
            command: Command::Help,
        });
    }

    let mut free = matches.free.iter().map(String::as_str);
    let command = match free.next() {
        None => return Err(CliError::MissingCommand),
        Some("help") => Command::Help,
        Some("list") => Command::List {
            search: matches.opt_str("search").unwrap_or_default(),
            view: optional(&matches, "view", |value| value.parse())?.unwrap_or_default(),
            date: optional(&matches, "date", parse_date)?,
        },
        Some("overlaps") => Command::Overlaps {
            id: required_arg(free.next(), "overlaps", "an event ID")?,
        },
        Some("series") => Command::Series {
            id: required_arg(free.next(), "series", "an event ID")?,
        },
        Some("move") => {
            let id = required_arg(free.next(), "move", "an event ID and a date")?;
            let date = required_arg(free.next(), "move", "an event ID and a date")?;
            Command::Move {
                id,
                date: parse_date(&date).map_err(|source| CliError::InvalidValue {
                    name: "date",
                    source,
                })?,
                series: matches.opt_present("series"),
            }
        }
        Some("delete") => Command::Delete {
            id: required_arg(free.next(), "delete", "an event ID")?,
            series: matches.opt_present("series"),
        },
        Some("create") => Command::Create(event_form(&matches)?),
        Some("notify") => Command::Notify {
            at: optional(&matches, "at", parse_timestamp)?,
        },
        Some("export") => Command::Export,
        Some(other) => return Err(CliError::UnknownCommand(other.into())),
    };

    Ok(Args {
        url,
        dry_run,
        command,
    })
}

fn required_arg(
    value: Option<&str>,
    command: &'static str,
    expected: &'static str,
) -> Result<String, CliError> {
    value
        .map(str::to_owned)
        .ok_or(CliError::MissingArgument { command, expected })
}

fn optional<T>(
    matches: &Matches,
    name: &'static str,
    parse: impl Fn(&str) -> calendar_core::Result<T>,
) -> Result<Option<T>, CliError> {
    matches
        .opt_str(name)
        .map(|value| parse(&value))
        .transpose()
        .map_err(|source| CliError::InvalidValue { name, source })
}

fn required<T>(
    matches: &Matches,
    name: &'static str,
    parse: impl Fn(&str) -> calendar_core::Result<T>,
) -> Result<T, CliError> {
    optional(matches, name, parse)?.ok_or(CliError::MissingOption(name))
}

fn number(matches: &Matches, name: &'static str, default: u32) -> Result<u32, CliError> {
    matches
        .opt_get_default(name, default)
        .map_err(|source| CliError::InvalidNumber { name, source })
}

fn parse_timestamp(value: &str) -> calendar_core::Result<NaiveDateTime> {
    let (date, time) = value
        .split_once('T')
        .ok_or_else(|| calendar_core::Error::InvalidDate(value.into()))?;

    Ok(parse_date(date)?.and_time(parse_time(time)?))
}

fn event_form(matches: &Matches) -> Result<EventForm, CliError> {
    let kind = optional(matches, "repeat", |value| value.parse::<RepeatType>())?.unwrap_or_default();
    let repeat = match kind {
        RepeatType::None => RepeatInfo::none(),
        kind => RepeatInfo {
            end_date: optional(matches, "until", parse_date)?,
            ..RepeatInfo::new(kind, number(matches, "interval", 1)?)
        },
    };

    Ok(EventForm {
        title: matches
            .opt_str("title")
            .ok_or(CliError::MissingOption("title"))?,
        date: required(matches, "date", parse_date)?,
        start_time: required(matches, "start", parse_time)?,
        end_time: required(matches, "end", parse_time)?,
        description: matches.opt_str("description").unwrap_or_default(),
        location: matches.opt_str("location").unwrap_or_default(),
        category: matches.opt_str("category").unwrap_or_default(),
        repeat,
        notification_time: number(matches, "remind", 10)?,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(line: &str) -> Result<Args, CliError> {
        try_parse(line.split_whitespace().map(str::to_owned).collect())
    }

    #[test]
    fn global_options() {
        let parsed = args("-u http://calendar:3000 --dry-run delete 7").unwrap();

        assert_eq!(parsed.url.as_deref(), Some("http://calendar:3000"));
        assert!(parsed.dry_run);
        assert_eq!(
            parsed.command,
            Command::Delete {
                id: "7".into(),
                series: false
            }
        );
    }

    #[test]
    fn list_defaults_to_the_week_view() {
        assert_eq!(
            args("list").unwrap().command,
            Command::List {
                search: String::new(),
                view: View::Week,
                date: None
            }
        );

        assert_eq!(
            args("list --search team --view month --date 2025-10-01")
                .unwrap()
                .command,
            Command::List {
                search: "team".into(),
                view: View::Month,
                date: Some(parse_date("2025-10-01").unwrap())
            }
        );
    }

    #[test]
    fn move_a_whole_series() {
        assert_eq!(
            args("move 3 2025-10-20 --series").unwrap().command,
            Command::Move {
                id: "3".into(),
                date: parse_date("2025-10-20").unwrap(),
                series: true
            }
        );
    }

    #[test]
    fn create_a_repeating_event() {
        let Command::Create(form) = args(
            "create --title Standup --date 2025-10-15 --start 09:00 --end 09:15 --repeat weekly --interval 2 --until 2025-12-31",
        )
        .unwrap()
        .command
        else {
            panic!("expected a create command");
        };

        assert_eq!(form.title, "Standup");
        assert_eq!(form.repeat.kind, RepeatType::Weekly);
        assert_eq!(form.repeat.interval, 2);
        assert_eq!(form.repeat.end_date, Some(parse_date("2025-12-31").unwrap()));
        assert_eq!(form.notification_time, 10);
    }

    #[test]
    fn create_a_single_event() {
        let Command::Create(form) =
            args("create --title Lunch --date 2025-10-15 --start 12:00 --end 13:00 --remind 0")
                .unwrap()
                .command
        else {
            panic!("expected a create command");
        };

        assert_eq!(form.repeat, RepeatInfo::none());
        assert_eq!(form.notification_time, 0);
    }

    #[test]
    fn notify_at_a_point_in_time() {
        assert_eq!(
            args("notify --at 2025-10-15T13:50").unwrap().command,
            Command::Notify {
                at: Some(
                    parse_date("2025-10-15")
                        .unwrap()
                        .and_time(parse_time("13:50").unwrap())
                )
            }
        );
    }

    #[test]
    fn help_wins_over_commands() {
        assert_eq!(args("-h list").unwrap().command, Command::Help);
        assert_eq!(args("help").unwrap().command, Command::Help);
        assert!(usage().contains("overlaps ID"));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(args(""), Err(CliError::MissingCommand)));
        assert!(matches!(args("frobnicate"), Err(CliError::UnknownCommand(_))));
        assert!(matches!(args("move 3"), Err(CliError::MissingArgument { .. })));
        assert!(matches!(args("list --view year"), Err(CliError::InvalidValue { name: "view", .. })));
        assert!(matches!(args("notify --at 13:50"), Err(CliError::InvalidValue { name: "at", .. })));
        assert!(matches!(
            args("create --date 2025-10-15 --start 09:00 --end 10:00"),
            Err(CliError::MissingOption("title"))
        ));
        assert!(matches!(
            args("create --title T --date 2025-10-15 --start 09:00 --end 10:00 --repeat daily --interval x"),
            Err(CliError::InvalidNumber { name: "interval", .. })
        ));
        assert!(matches!(args("--bogus list"), Err(CliError::Options(_))));
    }
}
