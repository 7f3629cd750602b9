use std::path::PathBuf;

use anyhow::{Context, Error};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

use tagged_time::{
    aggregate_durations, default_cutoff, fetch::fetch_calendar, report::start_of_day,
    tagged_events, VCalendar,
};

/// Report the time spent per #tag per day from an iCalendar feed.
#[derive(Debug, Parser)]
#[command(name = "tagged-time", version)]
struct Cli {
    /// URL or file to read the calendar from. Reads stdin when absent or `-`.
    #[arg(env = "TAGGED_TIME_SOURCE")]
    source: Option<String>,

    /// Report on events from the start of the day this many days ago.
    #[arg(long, env = "TAGGED_TIME_DAYS", default_value_t = tagged_time::DEFAULT_DAYS)]
    days: u64,

    /// Report on events from the start of this day instead (YYYY-MM-DD).
    /// Takes precedence over `--days`.
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Time zone that days are counted in.
    #[arg(long, env = "TAGGED_TIME_TZ", default_value = "UTC", value_parser = parse_timezone)]
    timezone: Tz,

    /// Print the tagged events rather than the daily totals.
    #[arg(long)]
    events: bool,

    /// Pretty print the JSON output.
    #[arg(long)]
    pretty: bool,
}

impl Cli {
    /// The start of the reporting window, counted back from `now`.
    fn cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Tz>, Error> {
        match self.since {
            Some(date) => start_of_day(&self.timezone, date),
            None => default_cutoff(&now.with_timezone(&self.timezone), self.days),
        }
    }
}

fn parse_timezone(s: &str) -> Result<Tz, String> {
    s.parse()
        .map_err(|_| format!("unknown time zone {:?}, expected e.g. Europe/London", s))
}

#[derive(Debug, PartialEq)]
enum Source {
    Stdin,
    Url(Url),
    File(PathBuf),
}

impl Source {
    fn from_arg(arg: Option<&str>) -> Source {
        match arg {
            None | Some("-") => Source::Stdin,
            Some(arg) => match Url::parse(arg) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Url(url),
                _ => Source::File(PathBuf::from(arg)),
            },
        }
    }

    async fn read(&self) -> Result<String, Error> {
        match self {
            Source::Stdin => {
                let mut data = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut data)
                    .await
                    .context("reading stdin")?;
                Ok(data)
            }
            Source::Url(url) => fetch_calendar(&reqwest::Client::new(), url).await,
            Source::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let cutoff = cli.cutoff(Utc::now())?;
    debug!(%cutoff, "reporting on events since cutoff");

    let data = Source::from_arg(cli.source.as_deref()).read().await?;
    let calendar: VCalendar = data.parse()?;

    let tagged = tagged_events(&cutoff, &calendar)?;

    let output = if cli.events {
        to_json(&tagged, cli.pretty)?
    } else {
        to_json(&aggregate_durations(&tagged), cli.pretty)?
    };

    println!("{}", output);

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, Error> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn source_from_arg() {
        assert_eq!(Source::from_arg(None), Source::Stdin);
        assert_eq!(Source::from_arg(Some("-")), Source::Stdin);
        assert_eq!(
            Source::from_arg(Some("https://example.org/basic.ics")),
            Source::Url(Url::parse("https://example.org/basic.ics").unwrap())
        );
        assert_eq!(
            Source::from_arg(Some("calendar.ics")),
            Source::File(PathBuf::from("calendar.ics"))
        );
        // Only http(s) URLs are fetched, anything else is a path.
        assert_eq!(
            Source::from_arg(Some("c:/calendar.ics")),
            Source::File(PathBuf::from("c:/calendar.ics"))
        );
    }

    #[test]
    fn cutoff_from_days() {
        let cli = Cli::try_parse_from(["tagged-time", "--days", "3", "--timezone", "Europe/London"]).unwrap();
        let now = Utc.with_ymd_and_hms(2018, 12, 10, 9, 30, 0).unwrap();

        let cutoff = cli.cutoff(now).unwrap();
        assert_eq!(
            cutoff,
            chrono_tz::Europe::London.with_ymd_and_hms(2018, 12, 7, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn since_overrides_days() {
        let cli = Cli::try_parse_from(["tagged-time", "--days", "3", "--since", "2018-12-01"]).unwrap();
        let now = Utc.with_ymd_and_hms(2018, 12, 10, 9, 30, 0).unwrap();

        let cutoff = cli.cutoff(now).unwrap();
        assert_eq!(cutoff, Tz::UTC.with_ymd_and_hms(2018, 12, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert!(Cli::try_parse_from(["tagged-time", "--timezone", "Mars/Olympus_Mons"]).is_err());
    }
}
