//! # Event Timestamps
//!
//! Events are stored with local ISO-8601 timestamps derived from a calendar
//! date and an optional time of day. Duration tracking does not exist yet, so
//! the end of an event is always its start.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::errors::{PlannerError, PlannerResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(date: &str) -> PlannerResult<NaiveDate> {
    let date = date.trim();
    if date.is_empty() {
        return Err(PlannerError::BadRequest("date is required".to_string()));
    }

    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| {
        PlannerError::BadRequest(format!("Invalid date '{date}', expected YYYY-MM-DD"))
    })
}

/// Parses an `HH:MM` (or `HH:MM:SS`) time of day.
pub fn parse_time(time: &str) -> PlannerResult<NaiveTime> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .map_err(|_| PlannerError::BadRequest(format!("Invalid time '{time}', expected HH:MM")))
}

/// Combines a date and an optional time into the event start timestamp.
///
/// A missing or blank time means midnight of that date.
pub fn event_start(date: &str, time: Option<&str>) -> PlannerResult<NaiveDateTime> {
    let date = parse_date(date)?;
    let time = match time.map(str::trim).filter(|t| !t.is_empty()) {
        Some(time) => parse_time(time)?,
        None => NaiveTime::MIN,
    };

    Ok(date.and_time(time))
}

/// Start and end timestamps of an event. The end currently mirrors the start.
pub fn event_span(date: &str, time: Option<&str>) -> PlannerResult<(NaiveDateTime, NaiveDateTime)> {
    let start = event_start(date, time)?;
    Ok((start, start))
}

/// Inclusive bounds of a calendar day: `[00:00:00, 23:59:59]`.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    let end = date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN));
    (start, end)
}
