//! Session extraction for a single race record.
//!
//! Turns the loosely structured feed record into a chronologically sorted
//! list of sessions. Pure function, no I/O.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::{Session, SessionKind};
use crate::services::jolpica::RawRaceRecord;

/// Time assumed when a session carries a date but no time.
const DEFAULT_TIME: &str = "00:00:00Z";

/// Offset-less layouts accepted after RFC 3339 fails; interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid date/time value for {field}: '{value}'")]
    InvalidDateTime { field: &'static str, value: String },
}

/// Combine a feed date and optional time into a UTC instant.
///
/// `field` names the feed field for error reporting.
pub fn to_utc_instant(
    field: &'static str,
    date: &str,
    time: Option<&str>,
) -> Result<DateTime<Utc>, SessionError> {
    let time = time.filter(|t| !t.is_empty()).unwrap_or(DEFAULT_TIME);
    let combined = format!("{}T{}", date.trim(), time.trim());

    if let Ok(dt) = DateTime::parse_from_rfc3339(&combined) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive_input = combined.strip_suffix('Z').unwrap_or(&combined);
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive_input, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or(SessionError::InvalidDateTime {
            field,
            value: combined,
        })
}

/// Extract every dated session of a race, sorted by start time.
///
/// Sub-records are visited in `SessionKind::SUB_RECORDS` order and the race
/// itself is appended last; the sort is stable, so sessions sharing an
/// instant keep that order.
pub fn extract_sessions(race: &RawRaceRecord) -> Result<Vec<Session>, SessionError> {
    let mut sessions = Vec::with_capacity(SessionKind::SUB_RECORDS.len() + 1);

    for kind in SessionKind::SUB_RECORDS {
        let Some(slot) = race.session_slot(kind) else {
            continue;
        };
        let Some(date) = non_empty(slot.date.as_deref()) else {
            continue;
        };
        let utc_time = to_utc_instant(kind.feed_field(), date, slot.time.as_deref())?;
        sessions.push(Session::new(kind, utc_time));
    }

    if let Some(date) = non_empty(race.date.as_deref()) {
        let utc_time = to_utc_instant(SessionKind::Race.feed_field(), date, race.time.as_deref())?;
        sessions.push(Session::new(SessionKind::Race, utc_time));
    }

    sessions.sort_by_key(|s| s.utc_time);
    Ok(sessions)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
