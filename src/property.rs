use anyhow::{bail, format_err, Context, Error};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::{parameters::ParameterSet, parser, unescape::unescape};

#[derive(Debug, Clone)]
pub enum Property {
    /// Purpose:  This property specifies when the calendar component begins.
    ///
    /// Description:  Within the "VEVENT" calendar component, this property
    /// defines the start date and time for the event.
    Start(DateOrDateTime),

    /// Purpose:  This property specifies the date and time that a calendar
    /// component ends.
    ///
    /// Description:  Within the "VEVENT" calendar component, this property
    /// defines the date and time by which the event ends.  The value type of
    /// this property MUST be the same as the "DTSTART" property, and its value
    /// MUST be later in time than the value of the "DTSTART" property.
    End(DateOrDateTime),

    /// Purpose:  This property specifies a positive duration of time.
    ///
    /// Description:  In a "VEVENT" calendar component the property may be used
    /// to specify a duration of the event, instead of an explicit end
    /// DATE-TIME.
    Duration(Duration),

    /// Purpose:  This property defines a short summary or subject for the
    /// calendar component.
    ///
    /// This is where the tags we report on live.
    Summary(String),

    /// Purpose:  This property defines the persistent, globally unique
    /// identifier for the calendar component.
    UID(String),

    /// Purpose:  This property specifies the identifier for the product that
    /// created the iCalendar object.
    ProductIdentifier(String),

    /// Purpose:  This property specifies the identifier corresponding to the
    /// highest version number or the minimum and maximum range of the
    /// iCalendar specification that is required in order to interpret the
    /// iCalendar object.
    Version(String),

    /// Anything else, by name. Its value is not decoded.
    Other(String),
}

impl TryFrom<parser::Property> for Property {
    type Error = Error;

    fn try_from(property: parser::Property) -> Result<Self, Self::Error> {
        let parameters: ParameterSet = property.parameters.into();

        let prop = match &property.name.to_ascii_uppercase() as &str {
            "DTSTART" => Property::Start(DateOrDateTime::parse_from(&property.value, &parameters)?),
            "DTEND" => Property::End(DateOrDateTime::parse_from(&property.value, &parameters)?),
            "DURATION" => Property::Duration(parse_duration(&property.value)?),
            "SUMMARY" => Property::Summary(unescape(&property.value)),
            "UID" => Property::UID(unescape(&property.value)),
            "PRODID" => Property::ProductIdentifier(property.value),
            "VERSION" => Property::Version(property.value),
            _ => Property::Other(property.name),
        };

        Ok(prop)
    }
}

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-])?P(?:([0-9]+)W)?(?:([0-9]+)D)?(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)S)?)?$")
        .expect("valid duration regex")
});

/// Parse a `dur-value` (RFC 5545 section 3.3.6), e.g. `PT1H30M` or `-P1D`.
pub fn parse_duration(value: &str) -> Result<Duration, Error> {
    let captures = DURATION
        .captures(value.trim())
        .with_context(|| format!("invalid duration {:?}", value))?;

    // Weeks, days, hours, minutes and seconds in that order.
    let units = [7 * 24 * 60 * 60, 24 * 60 * 60, 60 * 60, 60, 1];

    let mut seconds: i64 = 0;
    let mut seen_component = false;
    for (group, unit) in (2..=6).zip(units) {
        if let Some(digits) = captures.get(group) {
            let amount: i64 = digits.as_str().parse()?;
            seconds = amount
                .checked_mul(unit)
                .and_then(|part| seconds.checked_add(part))
                .with_context(|| format!("duration {:?} out of range", value))?;
            seen_component = true;
        }
    }

    if !seen_component || value.trim_end().ends_with('T') {
        bail!("invalid duration {:?}", value);
    }

    if captures.get(1).map(|sign| sign.as_str()) == Some("-") {
        seconds = -seconds;
    }

    Duration::try_seconds(seconds).with_context(|| format!("duration {:?} out of range", value))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IcalDateTime {
    /// A "floating" time, not bound to any time zone.
    Local(NaiveDateTime),
    Utc(DateTime<Utc>),
    TZ { date: NaiveDateTime, tzid: String },
}

impl IcalDateTime {
    /// Resolve to a concrete instant, expressed in the `local` zone.
    ///
    /// Floating times are taken to be in `local`. Times with a `TZID` are
    /// looked up in the IANA database; during a DST fold the earliest instant
    /// wins, and a time skipped by a DST gap is an error.
    ///
    /// A `TZID` that isn't an IANA name, e.g. Outlook's `W. Europe Standard
    /// Time`, is treated as floating.
    pub fn resolve(&self, local: &Tz) -> Result<DateTime<Tz>, Error> {
        match self {
            IcalDateTime::Utc(d) => Ok(d.with_timezone(local)),
            IcalDateTime::Local(d) => from_local(local, d),
            IcalDateTime::TZ { date, tzid } => match tzid.parse::<Tz>() {
                Ok(tz) => Ok(from_local(&tz, date)?.with_timezone(local)),
                Err(_) => {
                    warn!(%tzid, %date, zone = %local, "unknown time zone, treating time as floating");
                    from_local(local, date)
                }
            },
        }
    }
}

fn from_local(tz: &Tz, date: &NaiveDateTime) -> Result<DateTime<Tz>, Error> {
    tz.from_local_datetime(date)
        .earliest()
        .with_context(|| format!("{} does not exist in {}", date, tz))
}

/// The first instant of `date` in `tz`. Where midnight is skipped by a DST
/// change the day starts at the first hour that exists.
pub fn start_of_day(tz: &Tz, date: NaiveDate) -> Result<DateTime<Tz>, Error> {
    (0..3)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| tz.from_local_datetime(&date.and_time(time)).earliest())
        .ok_or_else(|| format_err!("{} has no start in {}", date, tz))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateOrDateTime {
    Date(NaiveDate),
    DateTime(IcalDateTime),
}

impl DateOrDateTime {
    fn parse_from(value: &str, params: &ParameterSet) -> Result<Self, Error> {
        let is_date = params
            .get_value_data_type()
            .map_or(!value.contains('T'), |data_type| data_type == "DATE");

        if is_date {
            return Ok(DateOrDateTime::Date(
                NaiveDate::parse_from_str(value, "%Y%m%d")
                    .with_context(|| format!("invalid date {:?}", value))?,
            ));
        }

        if let Some(utc) = value.strip_suffix('Z') {
            Ok(DateOrDateTime::DateTime(IcalDateTime::Utc(
                NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
                    .with_context(|| format!("invalid date-time {:?}", value))?
                    .and_utc(),
            )))
        } else {
            let date = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
                .with_context(|| format!("invalid date-time {:?}", value))?;

            if let Some(tzid) = params.get_tzid() {
                Ok(DateOrDateTime::DateTime(IcalDateTime::TZ {
                    date,
                    tzid: tzid.to_string(),
                }))
            } else {
                Ok(DateOrDateTime::DateTime(IcalDateTime::Local(date)))
            }
        }
    }

    /// Resolve to a concrete instant in the `local` zone. Dates resolve to
    /// the start of that local day.
    pub fn resolve(&self, local: &Tz) -> Result<DateTime<Tz>, Error> {
        match self {
            DateOrDateTime::Date(d) => start_of_day(local, *d),
            DateOrDateTime::DateTime(d) => d.resolve(local),
        }
    }
}
