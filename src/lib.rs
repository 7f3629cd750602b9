//! Time tracking from calendar annotations.
//!
//! Events in an iCalendar feed are labelled with hashtags in their summaries,
//! e.g. `Mixing session #music`. This crate totals the time spent per tag per
//! day:
//!
//! ```
//! use chrono::TimeZone;
//! use chrono_tz::Tz;
//!
//! let data = "BEGIN:VCALENDAR
//! PRODID:-//Example//EN
//! VERSION:2.0
//! BEGIN:VEVENT
//! DTSTART:20181206T150000Z
//! DTEND:20181206T163000Z
//! SUMMARY:Nosferatu #music
//! END:VEVENT
//! END:VCALENDAR
//! ";
//!
//! let cutoff = Tz::UTC.with_ymd_and_hms(2018, 12, 1, 0, 0, 0).unwrap();
//! let report = tagged_time::report_from_str(&cutoff, data)?;
//!
//! assert_eq!(report["music"]["2018-12-06"], "PT1H30M");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod components;
pub mod event;
pub mod extract;
pub mod fetch;
pub mod parameters;
pub mod parser;
pub mod property;
pub mod report;
pub mod tags;
pub mod unescape;

pub use aggregate::{aggregate_durations, format_duration, Report};
pub use components::VCalendar;
pub use event::CalendarEvent;
pub use extract::{tagged_events, TaggedEvents};
pub use report::{build_report, default_cutoff, report_from_str, DEFAULT_DAYS};
pub use tags::extract_tags;
