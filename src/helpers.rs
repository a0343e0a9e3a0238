//! Shared helpers for UTC timestamp formatting.
//!
//! Every instant leaving the API uses the same shape, millisecond precision
//! with a `Z` suffix (`2026-05-08T11:30:00.000Z`), so viewers can hand the
//! string straight to their local-time formatter.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

/// Format an instant as ISO 8601 UTC with millisecond precision.
pub(crate) fn to_iso_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `serialize_with` adapter for `DateTime<Utc>` fields.
pub(crate) fn serialize_utc_millis<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_iso_millis(*dt))
}
