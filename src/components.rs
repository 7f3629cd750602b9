use crate::{
    parser::{self, Component},
    property::{DateOrDateTime, Property},
};
use std::str::FromStr;

use anyhow::{bail, ensure, format_err, Context, Error};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct VCalendar {
    pub prodid: String,
    pub version: String,

    /// Every `VEVENT` in document order. Recurrence rules are not expanded
    /// and overrides (`RECURRENCE-ID`) are listed as events of their own.
    pub events: Vec<VEvent>,
}

impl TryFrom<parser::Component> for VCalendar {
    type Error = Error;

    fn try_from(component: parser::Component) -> Result<Self, Self::Error> {
        ensure!(
            component.is("VCALENDAR"),
            "Expected VCALENDAR, found {}",
            component.name
        );

        // VTIMEZONE rules aren't evaluated, `TZID`s are looked up in the IANA
        // database. Todos, journals etc. carry no time to report on.
        let mut events = Vec::new();
        for component in component.sub_components_named("VEVENT") {
            let index = events.len() + 1;
            let event = VEvent::try_from(component.clone())
                .with_context(|| format!("parsing VEVENT #{}", index))?;
            events.push(event);
        }

        let mut prodid = None;
        let mut version = None;

        for prop in component.properties {
            let parsed: Property = prop.try_into()?;

            match parsed {
                Property::ProductIdentifier(value) => prodid = Some(value),
                Property::Version(value) => version = Some(value),
                _ => {}
            }
        }

        let vcalendar = VCalendar {
            prodid: prodid.ok_or_else(|| format_err!("Missing PRODID field in VCALENDAR"))?,
            version: version.ok_or_else(|| format_err!("Missing VERSION field in VCALENDAR"))?,
            events,
        };

        debug!(
            prodid = %vcalendar.prodid,
            events = vcalendar.events.len(),
            "decoded calendar"
        );

        Ok(vcalendar)
    }
}

impl FromStr for VCalendar {
    type Err = Error;

    /// Decode a stream holding exactly one `VCALENDAR`.
    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut components = Component::from_str_to_stream(data)?;

        match components.len() {
            1 => components.remove(0).try_into(),
            0 => bail!("No VCALENDAR in stream"),
            n => bail!("Expected a single VCALENDAR, found {} components", n),
        }
    }
}

/// How the end of an event was given, if at all.
#[derive(Debug, Clone, PartialEq)]
pub enum EventEnd {
    End(DateOrDateTime),
    Duration(Duration),
}

/// Purpose: Provide a grouping of component properties that describe an event.
///
/// The "DTSTART" property for a "VEVENT" specifies the inclusive start of the
/// event.  The "DTEND" property specifies the non-inclusive end of the event.
/// For cases where a "VEVENT" calendar component specifies a "DTSTART"
/// property with a DATE value type but no "DTEND" nor "DURATION" property, the
/// event's duration is taken to be one day.  For cases where a "VEVENT"
/// calendar component specifies a "DTSTART" property with a DATE-TIME value
/// type but no "DTEND" property, the event ends on the same calendar date and
/// time of day specified by the "DTSTART" property.
#[derive(Debug, Clone)]
pub struct VEvent {
    pub uid: Option<String>,
    pub summary: Option<String>,
    pub start: Option<DateOrDateTime>,
    pub end: Option<EventEnd>,
}

impl TryFrom<parser::Component> for VEvent {
    type Error = Error;

    fn try_from(component: parser::Component) -> Result<Self, Self::Error> {
        ensure!(component.is("VEVENT"));

        let mut uid = None;
        let mut summary = None;
        let mut start = None;
        let mut dtend = None;
        let mut duration = None;

        for prop in component.properties {
            let parsed: Property = prop.try_into()?;

            match parsed {
                Property::UID(value) => uid = Some(value),
                Property::Summary(value) => summary = Some(value),
                Property::Start(value) => start = Some(value),
                Property::End(value) => dtend = Some(value),
                Property::Duration(value) => duration = Some(value),
                _ => {}
            }
        }

        let end = match (dtend, duration) {
            (Some(_), Some(_)) => bail!("VEVENT has both DURATION and DTEND"),
            (Some(dtend), None) => Some(EventEnd::End(dtend)),
            (None, Some(duration)) => Some(EventEnd::Duration(duration)),
            (None, None) => None,
        };

        Ok(VEvent {
            uid,
            summary,
            start,
            end,
        })
    }
}

impl VEvent {
    /// Resolve the start and end of the event as instants in the `local` zone.
    ///
    /// Fails if there is no `DTSTART`, or if either time can't be placed on
    /// the timeline (unknown `TZID`, a local time skipped by DST).
    pub fn timespan(&self, local: &Tz) -> Result<(DateTime<Tz>, DateTime<Tz>), Error> {
        let dtstart = self
            .start
            .as_ref()
            .ok_or_else(|| format_err!("VEVENT has no DTSTART"))?;

        let start = dtstart.resolve(local).context("resolving DTSTART")?;

        let end = match (&self.end, dtstart) {
            (Some(EventEnd::End(dtend)), _) => dtend.resolve(local).context("resolving DTEND")?,
            (Some(EventEnd::Duration(duration)), _) => start
                .checked_add_signed(*duration)
                .ok_or_else(|| format_err!("DURATION overflows DTSTART"))?,
            (None, DateOrDateTime::Date(date)) => {
                let next_day = date
                    .succ_opt()
                    .ok_or_else(|| format_err!("DTSTART has no following day"))?;

                DateOrDateTime::Date(next_day).resolve(local)?
            }
            (None, DateOrDateTime::DateTime(_)) => start,
        };

        Ok((start, end))
    }
}
