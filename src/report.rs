use anyhow::{format_err, Error};
use chrono::{DateTime, Days};
use chrono_tz::Tz;
use tracing::debug;

use crate::{
    aggregate::{aggregate_durations, Report},
    components::VCalendar,
    extract::tagged_events,
};

pub use crate::property::start_of_day;

/// How far back a report looks when no cutoff is given.
pub const DEFAULT_DAYS: u64 = 7;

/// Time per tag per day for every event starting at or after `cutoff`.
///
/// Days are calendar days in the cutoff's time zone.
pub fn build_report(cutoff: &DateTime<Tz>, calendar: &VCalendar) -> Result<Report, Error> {
    let tagged = tagged_events(cutoff, calendar)?;
    let report = aggregate_durations(&tagged);

    debug!(%cutoff, tags = report.len(), "built report");

    Ok(report)
}

/// Decode `data` as an iCalendar stream and report on it.
pub fn report_from_str(cutoff: &DateTime<Tz>, data: &str) -> Result<Report, Error> {
    let calendar: VCalendar = data.parse()?;

    build_report(cutoff, &calendar)
}

/// The start of the day `days` before `now`, in `now`'s time zone.
pub fn default_cutoff(now: &DateTime<Tz>, days: u64) -> Result<DateTime<Tz>, Error> {
    let date = now
        .date_naive()
        .checked_sub_days(Days::new(days))
        .ok_or_else(|| format_err!("{} days before {} is out of range", days, now))?;

    start_of_day(&now.timezone(), date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn cutoff_is_start_of_day_a_week_ago() {
        let london = chrono_tz::Europe::London;
        let now = london.with_ymd_and_hms(2018, 12, 13, 17, 45, 12).unwrap();

        let cutoff = default_cutoff(&now, DEFAULT_DAYS).unwrap();

        assert_eq!(cutoff, london.with_ymd_and_hms(2018, 12, 6, 0, 0, 0).unwrap());
        assert_eq!(cutoff.timezone(), london);
    }

    #[test]
    fn cutoff_crosses_dst_by_calendar_days() {
        let london = chrono_tz::Europe::London;
        let now = london.with_ymd_and_hms(2018, 10, 30, 9, 0, 0).unwrap();

        let cutoff = default_cutoff(&now, 7).unwrap();

        // Still local midnight, although that was BST.
        assert_eq!(cutoff.to_rfc3339(), "2018-10-23T00:00:00+01:00");
    }

    #[test]
    fn day_without_midnight() {
        // Santiago moved its clocks from 00:00 to 01:00 on 2018-08-12.
        let santiago = chrono_tz::America::Santiago;
        let date = NaiveDate::from_ymd_opt(2018, 8, 12).unwrap();

        let start = start_of_day(&santiago, date).unwrap();
        assert_eq!(start.date_naive(), date);
        assert_eq!(start.format("%H:%M").to_string(), "01:00");
    }

    #[test]
    fn report_from_text() {
        let data = "BEGIN:VCALENDAR
PRODID:-//Dummy//Unit Test//iCal
VERSION:2.0
BEGIN:VEVENT
DTSTART:20181206T150000Z
DTEND:20181206T160000Z
SUMMARY:Nosferatu #music
END:VEVENT
END:VCALENDAR
";
        let cutoff = Tz::UTC.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();

        let report = report_from_str(&cutoff, data).unwrap();
        assert_eq!(report["music"]["2018-12-06"], "PT1H");

        assert!(report_from_str(&cutoff, "BEGIN:VCALENDAR\nnonsense").is_err());
    }
}
