use std::collections::BTreeMap;

use anyhow::Error;
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::trace;

use crate::{components::VCalendar, event, event::CalendarEvent, tags::extract_tags};

/// Events grouped by tag. Each list keeps the calendar's order.
pub type TaggedEvents = BTreeMap<String, Vec<CalendarEvent>>;

/// Group the events starting at or after `cutoff` by the tags in their
/// summaries.
///
/// Times are expressed in the cutoff's time zone. An event carrying several
/// tags appears once under each of them; events without tags are dropped.
///
/// Every event is resolved, including ones before the cutoff, and the first
/// that can't be is an error for the whole calendar.
pub fn tagged_events(cutoff: &DateTime<Tz>, calendar: &VCalendar) -> Result<TaggedEvents, Error> {
    let local = cutoff.timezone();
    let events = event::resolve_all(&calendar.events, &local)?;

    let mut tagged = TaggedEvents::new();
    for event in events {
        if event.start_date() < cutoff {
            trace!(summary = event.summary(), start = %event.start_date(), "before cutoff");
            continue;
        }

        for tag in extract_tags(event.summary()) {
            tagged.entry(tag).or_default().push(event.clone());
        }
    }

    Ok(tagged)
}
