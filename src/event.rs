use anyhow::{ensure, Context, Error};
use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::components::VEvent;

/// A single resolved event: when it started, when it ended and what it was
/// called.
///
/// The end is never before the start.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    start_date: DateTime<Tz>,
    end_date: DateTime<Tz>,
    summary: String,
}

impl CalendarEvent {
    pub fn new(
        start_date: DateTime<Tz>,
        end_date: DateTime<Tz>,
        summary: impl Into<String>,
    ) -> Result<CalendarEvent, Error> {
        let summary = summary.into();

        ensure!(
            start_date <= end_date,
            "event {:?} ends at {} before it starts at {}",
            summary,
            end_date,
            start_date,
        );

        Ok(CalendarEvent {
            start_date,
            end_date,
            summary,
        })
    }

    /// Resolve a decoded `VEVENT`, with times expressed in `local`.
    ///
    /// A missing `SUMMARY` is treated as empty.
    pub fn from_vevent(vevent: &VEvent, local: &Tz) -> Result<CalendarEvent, Error> {
        let (start, end) = vevent.timespan(local)?;

        CalendarEvent::new(start, end, vevent.summary.as_deref().unwrap_or_default())
    }

    pub fn start_date(&self) -> &DateTime<Tz> {
        &self.start_date
    }

    pub fn end_date(&self) -> &DateTime<Tz> {
        &self.end_date
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// The local calendar day the event started on. Events running past
    /// midnight still belong entirely to this day.
    pub fn day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }

    pub fn duration(&self) -> Duration {
        self.end_date - self.start_date
    }
}

/// Describe a `VEVENT` for error messages.
pub(crate) fn describe(vevent: &VEvent, index: usize) -> String {
    match (&vevent.uid, &vevent.summary) {
        (Some(uid), _) => format!("event {}", uid),
        (None, Some(summary)) => format!("event #{} {:?}", index + 1, summary),
        (None, None) => format!("event #{}", index + 1),
    }
}

/// Resolve every event in order, failing on the first that can't be placed
/// in time.
pub(crate) fn resolve_all<'a>(
    vevents: impl IntoIterator<Item = &'a VEvent>,
    local: &Tz,
) -> Result<Vec<CalendarEvent>, Error> {
    vevents
        .into_iter()
        .enumerate()
        .map(|(index, vevent)| {
            CalendarEvent::from_vevent(vevent, local)
                .with_context(|| format!("resolving {}", describe(vevent, index)))
        })
        .collect()
}
