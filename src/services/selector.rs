//! Next race weekend selection.

use chrono::{DateTime, Utc};

use crate::models::{NormalizedRaceWeekend, Session};
use crate::services::jolpica::RawRaceRecord;
use crate::services::sessions::{extract_sessions, SessionError};

/// The chosen race together with its sorted sessions.
#[derive(Debug, Clone)]
pub struct RaceWeekendSelection<'a> {
    pub race: &'a RawRaceRecord,
    pub sessions: Vec<Session>,
}

/// Pick the first race, in feed order, whose last session has not finished
/// before `now`.
///
/// Races are not re-sorted; the feed is assumed chronological. Races with no
/// dated sessions are skipped. A race ending exactly at `now` still counts.
/// `Ok(None)` means the season is over.
pub fn pick_next_race_weekend(
    races: &[RawRaceRecord],
    now: DateTime<Utc>,
) -> Result<Option<RaceWeekendSelection<'_>>, SessionError> {
    for race in races {
        let sessions = extract_sessions(race)?;
        let Some(last) = sessions.last() else {
            continue;
        };

        if last.utc_time >= now {
            return Ok(Some(RaceWeekendSelection { race, sessions }));
        }
    }

    Ok(None)
}

impl NormalizedRaceWeekend {
    pub fn from_selection(selection: RaceWeekendSelection<'_>) -> Self {
        let race = selection.race;
        Self {
            season: race.season.clone(),
            round: race.round.clone(),
            race_name: race.race_name.clone(),
            circuit_name: race.circuit_name().map(str::to_string),
            locality: race.locality().map(str::to_string),
            country: race.country().map(str::to_string),
            sessions: selection.sessions,
        }
    }
}
