use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::extract::TaggedEvents;

/// Total time per tag per day: tag → `YYYY-MM-DD` → ISO-8601 duration.
pub type Report = BTreeMap<String, BTreeMap<String, String>>;

/// Sum the time spent on each tag, per local day of the event start.
///
/// The result does not depend on the order of events within a tag, and tags
/// with no events don't appear.
pub fn aggregate_durations(tagged: &TaggedEvents) -> Report {
    let mut totals: BTreeMap<&str, BTreeMap<NaiveDate, Duration>> = BTreeMap::new();

    for (tag, events) in tagged {
        for event in events {
            let total = totals
                .entry(tag.as_str())
                .or_default()
                .entry(event.day())
                .or_insert_with(Duration::zero);

            *total = *total + event.duration();
        }
    }

    totals
        .into_iter()
        .map(|(tag, days)| {
            let days = days
                .into_iter()
                .map(|(day, total)| (day.format("%Y-%m-%d").to_string(), format_duration(&total)))
                .collect();

            (tag.to_string(), days)
        })
        .collect()
}

/// Format a duration as ISO-8601, e.g. `PT1H30M`.
///
/// Only hours, minutes and seconds are used, so a day and a half is `PT36H`.
/// Precision is to the millisecond (`PT1.5S`) and zero is `P0D`.
pub fn format_duration(duration: &Duration) -> String {
    let millis = duration.num_milliseconds();
    if millis == 0 {
        return "P0D".to_string();
    }

    let sign = if millis < 0 { "-" } else { "" };
    let millis = millis.unsigned_abs();

    let hours = millis / 3_600_000;
    let minutes = millis / 60_000 % 60;
    let seconds = millis / 1_000 % 60;
    let fraction = millis % 1_000;

    let mut iso = format!("{}PT", sign);
    if hours > 0 {
        iso.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        iso.push_str(&format!("{}M", minutes));
    }
    if fraction > 0 {
        let fraction = format!("{:03}", fraction);
        iso.push_str(&format!("{}.{}S", seconds, fraction.trim_end_matches('0')));
    } else if seconds > 0 {
        iso.push_str(&format!("{}S", seconds));
    }

    iso
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CalendarEvent;
    use chrono::{DateTime, TimeZone};
    use chrono_tz::Tz;
    use rstest::rstest;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
        Tz::UTC
            .with_ymd_and_hms(2018, 12, day, hour, minute, 0)
            .unwrap()
    }

    fn event(start: DateTime<Tz>, end: DateTime<Tz>) -> CalendarEvent {
        CalendarEvent::new(start, end, "Nosferatu #music").unwrap()
    }

    #[rstest]
    #[case(Duration::zero(), "P0D")]
    #[case(Duration::hours(1), "PT1H")]
    #[case(Duration::minutes(60), "PT1H")]
    #[case(Duration::seconds(3600), "PT1H")]
    #[case(Duration::minutes(90), "PT1H30M")]
    #[case(Duration::minutes(50), "PT50M")]
    #[case(Duration::seconds(3605), "PT1H5S")]
    #[case(Duration::hours(36), "PT36H")]
    #[case(Duration::milliseconds(1500), "PT1.5S")]
    #[case(Duration::milliseconds(61_020), "PT1M1.02S")]
    #[case(Duration::minutes(-45), "-PT45M")]
    fn iso_durations(#[case] duration: Duration, #[case] expected: &str) {
        assert_eq!(format_duration(&duration), expected);
    }

    #[test]
    fn sums_per_tag_and_day() {
        let mut tagged = TaggedEvents::new();
        tagged.insert(
            "music".to_string(),
            vec![
                event(at(6, 15, 0), at(6, 16, 0)),
                event(at(6, 18, 0), at(6, 18, 30)),
                event(at(7, 9, 0), at(7, 10, 0)),
            ],
        );
        tagged.insert(
            "soundtrack".to_string(),
            vec![event(at(6, 15, 0), at(6, 16, 0))],
        );
        tagged.insert("empty".to_string(), vec![]);

        let report = aggregate_durations(&tagged);

        assert_eq!(report.len(), 2);
        assert_eq!(report["music"]["2018-12-06"], "PT1H30M");
        assert_eq!(report["music"]["2018-12-07"], "PT1H");
        assert_eq!(report["soundtrack"].len(), 1);
        assert_eq!(report["soundtrack"]["2018-12-06"], "PT1H");
    }

    #[test]
    fn order_does_not_matter() {
        let events = vec![
            event(at(6, 15, 0), at(6, 16, 0)),
            event(at(7, 9, 0), at(7, 9, 20)),
            event(at(6, 23, 0), at(7, 1, 0)),
        ];

        let mut forwards = TaggedEvents::new();
        forwards.insert("music".to_string(), events.clone());

        let mut backwards = TaggedEvents::new();
        backwards.insert("music".to_string(), events.into_iter().rev().collect());

        let report = aggregate_durations(&forwards);
        assert_eq!(report, aggregate_durations(&backwards));
        assert_eq!(report, aggregate_durations(&forwards));

        // The late event is counted in full against the day it started.
        assert_eq!(report["music"]["2018-12-06"], "PT3H");
        assert_eq!(report["music"]["2018-12-07"], "PT20M");
    }
}
