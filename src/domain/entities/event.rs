//! Event entity and repository trait.
//!
//! Maps to the `events` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::services::effects::{Document, Effect, SetField};
use crate::domain::value_objects::{GeoPoint, Page, PageRequest};
use crate::shared::error::AppError;
use crate::shared::validation::FieldErrors;

pub const EVENT_TITLE_MIN: u64 = 3;
pub const EVENT_TITLE_MAX: u64 = 200;
pub const EVENT_DESCRIPTION_MAX: u64 = 2000;

/// A campus event hosted by a user.
///
/// Maps to the `events` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - title: VARCHAR(200) NOT NULL
/// - description: VARCHAR(2000) NOT NULL
/// - location: TEXT NULL
/// - longitude / latitude: DOUBLE PRECISION NULL
/// - start_time / end_time: TIMESTAMPTZ NOT NULL, CHECK (end_time > start_time)
/// - host_id: BIGINT NOT NULL (weak reference to users)
/// - attendees: BIGINT[] NOT NULL DEFAULT '{}'
///
/// The host attends implicitly and is never stored in `attendees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub host_id: i64,

    /// Attending users in join order, without duplicates
    pub attendees: Vec<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_host(&self, user_id: i64) -> bool {
        self.host_id == user_id
    }

    /// Whether the user is an explicit attendee (the host is not).
    pub fn is_attendee(&self, user_id: i64) -> bool {
        self.attendees.contains(&user_id)
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now
    }

    /// Attendee count shown to clients; excludes the host.
    pub fn attendee_count(&self) -> usize {
        self.attendees.len()
    }

    /// Apply an update. Schedule checks run on the merged result.
    pub fn apply_patch(&mut self, patch: EventPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(coordinates) = patch.coordinates {
            self.coordinates = Some(coordinates);
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
    }
}

impl Document for Event {
    const KIND: &'static str = "event";

    fn set_mut(&mut self, field: SetField) -> Option<&mut Vec<i64>> {
        match field {
            SetField::Attendees => Some(&mut self.attendees),
            _ => None,
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// `endTime` must be strictly after `startTime`.
pub fn check_schedule(start: DateTime<Utc>, end: DateTime<Utc>, errors: &mut FieldErrors) {
    if end <= start {
        errors.add("endTime", "endTime must be after startTime", end.to_rfc3339());
    }
}

/// New events must start in the future. Updates are exempt.
pub fn check_starts_in_future(start: DateTime<Utc>, now: DateTime<Utc>, errors: &mut FieldErrors) {
    if start <= now {
        errors.add("startTime", "startTime must be in the future", start.to_rfc3339());
    }
}

/// The event fields that may be changed after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl EventPatch {
    pub fn touches_schedule(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter for event listings. Events are ordered by start time.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Only events starting at or after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only events starting at or before this instant
    pub to: Option<DateTime<Utc>>,
    pub host_id: Option<i64>,
    pub attendee_id: Option<i64>,
    pub sort: SortOrder,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        self.from.map_or(true, |from| event.start_time >= from)
            && self.to.map_or(true, |to| event.start_time <= to)
            && self.host_id.map_or(true, |host| event.host_id == host)
            && self.attendee_id.map_or(true, |user| event.is_attendee(user))
    }
}

/// Repository trait for Event data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError>;

    async fn search(&self, filter: &EventFilter, page: PageRequest) -> Result<Page<Event>, AppError>;

    async fn create(&self, event: &Event) -> Result<Event, AppError>;

    /// Persist the descriptive and schedule fields of an existing event.
    async fn update(&self, event: &Event) -> Result<Event, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Atomically apply relationship effects to one event.
    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Event, AppError>;

    /// Number of events hosted by a user.
    async fn count_hosted(&self, user_id: i64) -> Result<u64, AppError>;

    /// Number of events a user is attending (as a non-host attendee).
    async fn count_attending(&self, user_id: i64) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn create_test_event() -> Event {
        let start = Utc.with_ymd_and_hms(2099, 1, 1, 10, 0, 0).unwrap();
        Event {
            id: 1,
            title: "Hack Night".into(),
            description: "Bring a laptop".into(),
            location: Some("Library".into()),
            coordinates: None,
            start_time: start,
            end_time: start + Duration::hours(2),
            host_id: 10,
            attendees: vec![11, 12],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let start = Utc.with_ymd_and_hms(2099, 1, 1, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2099, 1, 1, 9, 0, 0).unwrap();
        let mut errors = FieldErrors::new();
        check_schedule(start, end, &mut errors);
        assert!(errors.has("endTime"));
    }

    #[test]
    fn test_end_equal_to_start_is_rejected() {
        let start = Utc::now();
        let mut errors = FieldErrors::new();
        check_schedule(start, start, &mut errors);
        assert!(errors.has("endTime"));
    }

    #[test]
    fn test_start_in_past_is_rejected() {
        let now = Utc::now();
        let mut errors = FieldErrors::new();
        check_starts_in_future(now - Duration::minutes(1), now, &mut errors);
        assert!(errors.has("startTime"));
    }

    #[test]
    fn test_host_is_not_counted_as_attendee() {
        let event = create_test_event();
        assert!(event.is_host(10));
        assert!(!event.is_attendee(10));
        assert_eq!(event.attendee_count(), 2);
    }

    #[test]
    fn test_patch_merges_with_existing_schedule() {
        let mut event = create_test_event();
        let new_end = event.start_time + Duration::hours(5);
        let patch = EventPatch {
            end_time: Some(new_end),
            ..Default::default()
        };
        assert!(patch.touches_schedule());
        event.apply_patch(patch);
        assert_eq!(event.end_time, new_end);
        assert_eq!(event.title, "Hack Night");
    }

    #[test]
    fn test_filter_time_window_and_attendee() {
        let event = create_test_event();
        let inside = EventFilter {
            from: Some(event.start_time - Duration::days(1)),
            to: Some(event.start_time),
            attendee_id: Some(12),
            ..Default::default()
        };
        let after = EventFilter {
            from: Some(event.start_time + Duration::seconds(1)),
            ..Default::default()
        };
        let host_as_attendee = EventFilter {
            attendee_id: Some(10),
            ..Default::default()
        };

        assert!(inside.matches(&event));
        assert!(!after.matches(&event));
        assert!(!host_as_attendee.matches(&event));
    }
}
