//! Public JSON shapes served by the API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::helpers::serialize_utc_millis;

/// Kind of a timed event within a race weekend.
///
/// Declaration order matters: sessions sharing an instant keep this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum SessionKind {
    FirstPractice,
    SecondPractice,
    ThirdPractice,
    SprintShootout,
    SprintQualifying,
    Sprint,
    Qualifying,
    Race,
}

impl SessionKind {
    /// Feed sub-records in traversal order. `Race` comes from the record itself.
    pub const SUB_RECORDS: [SessionKind; 7] = [
        SessionKind::FirstPractice,
        SessionKind::SecondPractice,
        SessionKind::ThirdPractice,
        SessionKind::SprintShootout,
        SessionKind::SprintQualifying,
        SessionKind::Sprint,
        SessionKind::Qualifying,
    ];

    /// Human-readable label shown to viewers.
    pub fn display_name(self) -> &'static str {
        match self {
            SessionKind::FirstPractice => "Practice 1",
            SessionKind::SecondPractice => "Practice 2",
            SessionKind::ThirdPractice => "Practice 3",
            SessionKind::SprintShootout => "Sprint Shootout",
            SessionKind::SprintQualifying => "Sprint Qualifying",
            SessionKind::Sprint => "Sprint",
            SessionKind::Qualifying => "Qualifying",
            SessionKind::Race => "Race",
        }
    }

    /// Field name in the upstream feed.
    pub fn feed_field(self) -> &'static str {
        match self {
            SessionKind::FirstPractice => "FirstPractice",
            SessionKind::SecondPractice => "SecondPractice",
            SessionKind::ThirdPractice => "ThirdPractice",
            SessionKind::SprintShootout => "SprintShootout",
            SessionKind::SprintQualifying => "SprintQualifying",
            SessionKind::Sprint => "Sprint",
            SessionKind::Qualifying => "Qualifying",
            SessionKind::Race => "Race",
        }
    }
}

/// A single session with its resolved start instant.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session kind (e.g. "Qualifying")
    pub key: SessionKind,
    /// Display name (e.g. "Practice 1")
    pub name: String,
    /// Session start in ISO 8601 UTC (e.g. "2026-05-08T11:30:00.000Z")
    #[serde(serialize_with = "serialize_utc_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub utc_time: DateTime<Utc>,
}

impl Session {
    pub fn new(key: SessionKind, utc_time: DateTime<Utc>) -> Self {
        Self {
            key,
            name: key.display_name().to_string(),
            utc_time,
        }
    }
}

/// The next race weekend as exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRaceWeekend {
    /// Championship season (e.g. "2026")
    pub season: String,
    /// Round number within the season
    pub round: String,
    /// Race name (e.g. "Miami Grand Prix")
    pub race_name: String,
    /// Circuit name, null when the feed omits it
    pub circuit_name: Option<String>,
    /// Circuit locality, null when the feed omits it
    pub locality: Option<String>,
    /// Circuit country, null when the feed omits it
    pub country: Option<String>,
    /// Sessions sorted chronologically
    pub sessions: Vec<Session>,
}
