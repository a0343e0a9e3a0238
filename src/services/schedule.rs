//! Time-boxed cache around the fetch → select → normalize pipeline.
//!
//! Architecture:
//! - One slot per `ScheduleCache`, holding the current "next race" answer
//! - Cache hits return without network access until `expires_at`
//! - A refresh issues exactly one outbound request, bounded by `request_timeout`
//! - Success replaces the slot as a whole value; failure leaves it untouched
//!
//! Concurrent misses are not coalesced: each may fetch and overwrite the slot
//! with its own result.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::NormalizedRaceWeekend;
use crate::services::jolpica::{parse_race_list, ScheduleFetcher};
use crate::services::selector::pick_next_race_weekend;
use crate::services::sessions::SessionError;

/// How long a resolved answer stays fresh.
pub const CACHE_TTL_SECS: i64 = 15 * 60;

/// Deadline for the outbound schedule request.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Schedule request timed out")]
    Timeout,

    #[error("Schedule request failed with status {0}")]
    UpstreamStatus(u16),

    #[error("Unexpected schedule response shape: {0}")]
    UnexpectedShape(String),

    #[error("Schedule request error: {0}")]
    Request(String),

    #[error("Schedule response is not valid JSON: {0}")]
    InvalidBody(String),

    #[error(transparent)]
    DateParse(#[from] SessionError),
}

/// Tunables for a `ScheduleCache`.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSettings {
    pub ttl: Duration,
    pub request_timeout: std::time::Duration,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(CACHE_TTL_SECS),
            request_timeout: std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Contents of the cache slot.
#[derive(Debug, Clone)]
pub enum CacheState {
    /// Nothing fetched successfully yet.
    Unpopulated,
    /// A race weekend was resolved.
    Race {
        weekend: Arc<NormalizedRaceWeekend>,
        expires_at: DateTime<Utc>,
    },
    /// The feed was fetched but no race is upcoming (off-season).
    NoUpcomingRace { expires_at: DateTime<Utc> },
}

impl CacheState {
    fn resolve(value: Option<Arc<NormalizedRaceWeekend>>, expires_at: DateTime<Utc>) -> Self {
        match value {
            Some(weekend) => CacheState::Race {
                weekend,
                expires_at,
            },
            None => CacheState::NoUpcomingRace { expires_at },
        }
    }

    /// Whether the slot holds an answer that has not expired at `now`.
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self {
            CacheState::Unpopulated => false,
            CacheState::Race { expires_at, .. } | CacheState::NoUpcomingRace { expires_at } => {
                now < *expires_at
            }
        }
    }

    /// The stored answer; `None` for both off-season and unpopulated.
    fn value(&self) -> Option<Arc<NormalizedRaceWeekend>> {
        match self {
            CacheState::Race { weekend, .. } => Some(weekend.clone()),
            CacheState::Unpopulated | CacheState::NoUpcomingRace { .. } => None,
        }
    }

    pub fn is_populated(&self) -> bool {
        !matches!(self, CacheState::Unpopulated)
    }
}

/// Caches the next race weekend resolved from a `ScheduleFetcher`.
pub struct ScheduleCache {
    fetcher: Arc<dyn ScheduleFetcher>,
    settings: ScheduleSettings,
    slot: RwLock<CacheState>,
}

impl ScheduleCache {
    pub fn new(fetcher: Arc<dyn ScheduleFetcher>, settings: ScheduleSettings) -> Self {
        Self {
            fetcher,
            settings,
            slot: RwLock::new(CacheState::Unpopulated),
        }
    }

    /// Snapshot of the slot.
    pub async fn state(&self) -> CacheState {
        self.slot.read().await.clone()
    }

    /// Resolve the next race weekend relative to the wall clock.
    ///
    /// `Ok(None)` means no upcoming race this season.
    pub async fn fetch_next_race(
        &self,
        force_refresh: bool,
    ) -> Result<Option<Arc<NormalizedRaceWeekend>>, ScheduleError> {
        self.fetch_next_race_at(force_refresh, Utc::now()).await
    }

    /// Same as `fetch_next_race`, with `now` used for both expiry and selection.
    pub async fn fetch_next_race_at(
        &self,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<Arc<NormalizedRaceWeekend>>, ScheduleError> {
        if !force_refresh {
            let slot = self.slot.read().await;
            if slot.is_fresh(now) {
                tracing::debug!("Schedule cache hit");
                return Ok(slot.value());
            }
        }

        let next = match self.refresh(now).await {
            Ok(next) => next,
            Err(e) => {
                tracing::warn!("Schedule refresh failed: {}", e);
                return Err(e);
            }
        };

        let expires_at = now + self.settings.ttl;
        *self.slot.write().await = CacheState::resolve(next.clone(), expires_at);

        match &next {
            Some(weekend) => tracing::info!(
                "Schedule refreshed: next race '{}' (season {}, round {}), fresh until {}",
                weekend.race_name,
                weekend.season,
                weekend.round,
                expires_at
            ),
            None => tracing::info!(
                "Schedule refreshed: no upcoming race, fresh until {}",
                expires_at
            ),
        }

        Ok(next)
    }

    /// Fetch, shape-check, select and normalize. Does not touch the slot.
    async fn refresh(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Option<Arc<NormalizedRaceWeekend>>, ScheduleError> {
        let response =
            tokio::time::timeout(self.settings.request_timeout, self.fetcher.fetch_schedule())
                .await
                .map_err(|_| ScheduleError::Timeout)??;

        if !response.is_success() {
            return Err(ScheduleError::UpstreamStatus(response.status));
        }

        let payload: serde_json::Value = serde_json::from_slice(&response.body)
            .map_err(|e| ScheduleError::InvalidBody(e.to_string()))?;
        let races = parse_race_list(&payload)?;
        tracing::debug!("Schedule feed returned {} races", races.len());

        let next = pick_next_race_weekend(&races, now)?
            .map(NormalizedRaceWeekend::from_selection)
            .map(Arc::new);
        Ok(next)
    }
}
