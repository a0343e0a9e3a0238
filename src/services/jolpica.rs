//! Jolpica (Ergast-compatible) F1 schedule feed client.
//!
//! Fetches the current season's race table.
//! See: https://github.com/jolpica/jolpica-f1/blob/main/docs/README.md

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::SessionKind;
use crate::services::schedule::ScheduleError;

pub const DEFAULT_SCHEDULE_URL: &str = "https://api.jolpi.ca/ergast/f1/current.json";
pub const DEFAULT_USER_AGENT: &str = "f1-monitor/1.0";

/// JSON pointer to the race list inside the feed payload.
pub const RACE_LIST_POINTER: &str = "/MRData/RaceTable/Races";

// --- Feed record types ---

/// One race as published by the feed. Only the fields we consume are typed.
///
/// Decoding never fails on an object: text fields accept strings or numbers,
/// and sub-records that are not objects count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRaceRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub season: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub round: String,
    #[serde(rename = "raceName", default, deserialize_with = "lenient_text")]
    pub race_name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(rename = "FirstPractice", default, deserialize_with = "lenient_object")]
    pub first_practice: Option<SessionSlot>,
    #[serde(rename = "SecondPractice", default, deserialize_with = "lenient_object")]
    pub second_practice: Option<SessionSlot>,
    #[serde(rename = "ThirdPractice", default, deserialize_with = "lenient_object")]
    pub third_practice: Option<SessionSlot>,
    #[serde(rename = "SprintShootout", default, deserialize_with = "lenient_object")]
    pub sprint_shootout: Option<SessionSlot>,
    #[serde(rename = "SprintQualifying", default, deserialize_with = "lenient_object")]
    pub sprint_qualifying: Option<SessionSlot>,
    #[serde(rename = "Sprint", default, deserialize_with = "lenient_object")]
    pub sprint: Option<SessionSlot>,
    #[serde(rename = "Qualifying", default, deserialize_with = "lenient_object")]
    pub qualifying: Option<SessionSlot>,
    #[serde(rename = "Circuit", default, deserialize_with = "lenient_object")]
    pub circuit: Option<Circuit>,
}

/// Date and optional time of a single session sub-record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSlot {
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Circuit {
    #[serde(rename = "circuitName", default, deserialize_with = "lenient_string")]
    pub circuit_name: Option<String>,
    #[serde(rename = "Location", default, deserialize_with = "lenient_object")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_string")]
    pub locality: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: Option<String>,
}

/// Strings pass through, numbers are stringified, anything else is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// Objects decode into `T`; any other JSON value is absent.
fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

impl RawRaceRecord {
    /// The sub-record for a session kind. `Race` has none; its date lives on the record.
    pub fn session_slot(&self, kind: SessionKind) -> Option<&SessionSlot> {
        match kind {
            SessionKind::FirstPractice => self.first_practice.as_ref(),
            SessionKind::SecondPractice => self.second_practice.as_ref(),
            SessionKind::ThirdPractice => self.third_practice.as_ref(),
            SessionKind::SprintShootout => self.sprint_shootout.as_ref(),
            SessionKind::SprintQualifying => self.sprint_qualifying.as_ref(),
            SessionKind::Sprint => self.sprint.as_ref(),
            SessionKind::Qualifying => self.qualifying.as_ref(),
            SessionKind::Race => None,
        }
    }

    pub fn circuit_name(&self) -> Option<&str> {
        self.circuit
            .as_ref()
            .and_then(|c| c.circuit_name.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn locality(&self) -> Option<&str> {
        self.location()
            .and_then(|l| l.locality.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn country(&self) -> Option<&str> {
        self.location()
            .and_then(|l| l.country.as_deref())
            .filter(|s| !s.is_empty())
    }

    fn location(&self) -> Option<&Location> {
        self.circuit.as_ref().and_then(|c| c.location.as_ref())
    }
}

/// Locate and decode the race list in a feed payload.
///
/// Only the race list itself is shape-checked. Entries that are not objects
/// decode as empty records, which the selector skips.
pub fn parse_race_list(payload: &Value) -> Result<Vec<RawRaceRecord>, ScheduleError> {
    let races = payload
        .pointer(RACE_LIST_POINTER)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ScheduleError::UnexpectedShape("race list missing or not an array".to_string())
        })?;

    Ok(races
        .iter()
        .map(|race| RawRaceRecord::deserialize(race).unwrap_or_default())
        .collect())
}

// --- Outbound fetch capability ---

/// Raw upstream reply: status code plus the unparsed body.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues the single outbound schedule request.
///
/// Timeouts are enforced by the caller, which drops the future at the deadline.
#[async_trait]
pub trait ScheduleFetcher: Send + Sync {
    async fn fetch_schedule(&self) -> Result<UpstreamResponse, ScheduleError>;
}

/// Production fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct JolpicaClient {
    client: reqwest::Client,
    url: String,
    user_agent: String,
}

impl JolpicaClient {
    pub fn new(url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            url: url.to_string(),
            user_agent: user_agent.to_string(),
        }
    }
}

#[async_trait]
impl ScheduleFetcher for JolpicaClient {
    async fn fetch_schedule(&self) -> Result<UpstreamResponse, ScheduleError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| ScheduleError::Request(format!("Invalid User-Agent: {}", e)))?,
        );

        let response = self
            .client
            .get(&self.url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| ScheduleError::Request(format!("schedule request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ScheduleError::Request(format!("schedule body read failed: {}", e)))?;

        Ok(UpstreamResponse {
            status,
            body: body.to_vec(),
        })
    }
}
