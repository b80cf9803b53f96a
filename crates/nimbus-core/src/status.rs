//! Status line formatting
//!
//! The status line shows the local wall-clock time as `dd/MM/yy hh:mm AM`,
//! shifted from UTC by a fixed whole-hour offset.

use core::fmt::Write;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use heapless::String;

/// Capacity of a formatted status line
pub const STATUS_TEXT_CAPACITY: usize = 24;

/// Shown while the wall clock is not yet known
pub const UNKNOWN_TIME_TEXT: &str = "--/--/-- --:-- --";

const SECONDS_PER_HOUR: i32 = 3600;

pub type StatusText = String<STATUS_TEXT_CAPACITY>;

/// Format `now` (unix seconds) for the status line
///
/// Returns [`UNKNOWN_TIME_TEXT`] when the time is unknown or the offset is out
/// of range.
pub fn format_status(now: Option<u32>, timezone_offset_hours: i8) -> StatusText {
    let mut text = StatusText::new();

    let local = now.and_then(|secs| {
        let utc = DateTime::<Utc>::from_timestamp(i64::from(secs), 0)?;
        let offset = FixedOffset::east_opt(i32::from(timezone_offset_hours) * SECONDS_PER_HOUR)?;
        Some(utc.with_timezone(&offset))
    });

    match local {
        Some(local) => {
            let (is_pm, hour) = local.hour12();
            let _ = write!(
                text,
                "{:02}/{:02}/{:02} {:02}:{:02} {}",
                local.day(),
                local.month(),
                local.year().rem_euclid(100),
                hour,
                local.minute(),
                if is_pm { "PM" } else { "AM" }
            );
        }
        None => {
            let _ = text.push_str(UNKNOWN_TIME_TEXT);
        }
    }

    text
}
