//! # Build Timestamp
//!
//! Renders the moment of a deploy in the form the mod's logger prints on load,
//! e.g. `Tue, Jan 7 - 3:45 PM`: abbreviated weekday, abbreviated month,
//! unpadded day, unpadded 12-hour clock, two-digit minute and an AM/PM marker.

use std::fmt::Display;
use chrono::{DateTime, Local, TimeZone};
use crate::invariants::assert_invariant;

/// chrono rendering of `EEE, MMM d - h:mm a`.
pub const BUILD_TIME_FORMAT: &str = "%a, %b %-d - %-I:%M %p";

/// Formats `at` as a build timestamp.
pub fn format_build_time<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let stamp = at.format(BUILD_TIME_FORMAT).to_string();
    assert_invariant(
        !stamp.contains('\n'),
        "Build timestamp is a single line",
        Some("Timestamp"),
    );
    stamp
}

/// The build timestamp for right now, in local time.
pub fn now() -> String {
    format_build_time(&Local::now())
}
