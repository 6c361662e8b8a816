//! Event Service
//!
//! Handles event CRUD, listing filters, and attendance.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use validator::Validate;

use super::population::{event_refs, UserDirectory};
use crate::application::dto::{
    CreateEventRequest, EventQueryParams, EventResponse, Paginated, UpdateEventRequest,
    UserActionRequest,
};
use crate::domain::services::{attend_event, leave_event, MutationError};
use crate::domain::value_objects::{PageMeta, PageRequest};
use crate::domain::{
    check_schedule, check_starts_in_future, Event, EventFilter, EventPatch, EventRepository,
    SortOrder, UserRepository,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{trim_field, FieldErrors};

/// Event service trait
#[async_trait]
pub trait EventService: Send + Sync {
    async fn list_events(&self, query: EventQueryParams) -> Result<Paginated<EventResponse>, EventError>;

    async fn create_event(&self, request: CreateEventRequest) -> Result<EventResponse, EventError>;

    async fn get_event(&self, event_id: i64) -> Result<EventResponse, EventError>;

    /// Update descriptive and schedule fields. Schedule rules are checked
    /// against the merged old and new values.
    async fn update_event(
        &self,
        event_id: i64,
        request: UpdateEventRequest,
    ) -> Result<EventResponse, EventError>;

    async fn delete_event(&self, event_id: i64) -> Result<(), EventError>;

    /// Add a user to the attendee set
    async fn attend_event(
        &self,
        event_id: i64,
        request: UserActionRequest,
    ) -> Result<EventResponse, EventError>;

    /// Remove a user from the attendee set; succeeds when not attending
    async fn leave_event(
        &self,
        event_id: i64,
        request: UserActionRequest,
    ) -> Result<EventResponse, EventError>;
}

/// Event service errors
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Event not found")]
    NotFound,

    #[error("Host not found")]
    HostNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<EventError> for AppError {
    fn from(e: EventError) -> Self {
        match e {
            EventError::NotFound | EventError::HostNotFound | EventError::UserNotFound => {
                AppError::NotFound(e.to_string())
            }
            EventError::Mutation(m) => m.into(),
            EventError::App(inner) => inner,
        }
    }
}

/// EventService implementation
pub struct EventServiceImpl {
    event_repo: Arc<dyn EventRepository>,
    user_repo: Arc<dyn UserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl EventServiceImpl {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        user_repo: Arc<dyn UserRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            event_repo,
            user_repo,
            id_generator,
        }
    }

    async fn find_event(&self, event_id: i64) -> Result<Event, EventError> {
        self.event_repo
            .find_by_id(event_id)
            .await?
            .ok_or(EventError::NotFound)
    }

    async fn expand(&self, event: Event) -> Result<EventResponse, EventError> {
        let directory = UserDirectory::load(&self.user_repo, event_refs(&event)).await?;
        Ok(directory.event(event))
    }

    /// Parse the acting user and make sure the account exists.
    async fn actor(&self, request: &UserActionRequest) -> Result<i64, EventError> {
        let mut errors = FieldErrors::from_validator(request.validate());
        let user_id = request
            .user_id
            .as_deref()
            .and_then(|raw| errors.identifier("userId", raw));
        errors.into_result()?;

        let user_id = user_id.ok_or(EventError::UserNotFound)?;
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(EventError::UserNotFound);
        }
        Ok(user_id)
    }
}

fn parse_optional_time(
    errors: &mut FieldErrors,
    field: &str,
    raw: Option<&str>,
) -> Option<DateTime<Utc>> {
    raw.and_then(|r| errors.timestamp(field, r))
}

#[async_trait]
impl EventService for EventServiceImpl {
    async fn list_events(&self, query: EventQueryParams) -> Result<Paginated<EventResponse>, EventError> {
        let mut errors = FieldErrors::new();
        let page = PageRequest::parse(query.page, query.limit, &mut errors);
        let mut from = parse_optional_time(&mut errors, "from", query.from.as_deref());
        let to = parse_optional_time(&mut errors, "to", query.to.as_deref());
        let host_id = query
            .host
            .as_deref()
            .and_then(|raw| errors.identifier("host", raw));
        let attendee_id = query
            .attendee
            .as_deref()
            .and_then(|raw| errors.identifier("attendee", raw));
        let sort = match query.sort.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("asc") => SortOrder::Ascending,
            Some("desc") => SortOrder::Descending,
            Some(other) => {
                errors.add("sort", "sort must be 'asc' or 'desc'", other);
                SortOrder::Ascending
            }
        };
        errors.into_result()?;

        if query.upcoming == Some(true) {
            let now = Utc::now();
            from = Some(from.map_or(now, |f| f.max(now)));
        }

        let filter = EventFilter {
            from,
            to,
            host_id,
            attendee_id,
            sort,
        };
        let result = self.event_repo.search(&filter, page).await?;

        let directory = UserDirectory::load(
            &self.user_repo,
            result.items.iter().flat_map(|e| event_refs(e)).collect::<Vec<_>>(),
        )
        .await?;

        Ok(Paginated {
            pagination: PageMeta::new(page, result.total),
            items: result.items.into_iter().map(|e| directory.event(e)).collect(),
        })
    }

    async fn create_event(&self, mut request: CreateEventRequest) -> Result<EventResponse, EventError> {
        let now = Utc::now();
        trim_field(&mut request.title);
        trim_field(&mut request.description);
        let mut errors = FieldErrors::from_validator(request.validate());

        let start_time = parse_optional_time(&mut errors, "startTime", request.start_time.as_deref());
        let end_time = parse_optional_time(&mut errors, "endTime", request.end_time.as_deref());
        if let Some(start) = start_time {
            check_starts_in_future(start, now, &mut errors);
        }
        if let (Some(start), Some(end)) = (start_time, end_time) {
            check_schedule(start, end, &mut errors);
        }
        if let Some(point) = &request.coordinates {
            point.check(&mut errors);
        }
        let host_id = request
            .host_id
            .as_deref()
            .and_then(|raw| errors.identifier("hostId", raw));
        errors.into_result()?;

        let (Some(title), Some(description), Some(start_time), Some(end_time), Some(host_id)) = (
            request.title,
            request.description,
            start_time,
            end_time,
            host_id,
        ) else {
            return Err(AppError::Internal("validated event request is incomplete".into()).into());
        };

        if self.user_repo.find_by_id(host_id).await?.is_none() {
            return Err(EventError::HostNotFound);
        }

        let event = Event {
            id: self.id_generator.generate(),
            title,
            description,
            location: request.location,
            coordinates: request.coordinates,
            start_time,
            end_time,
            host_id,
            attendees: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let created = self.event_repo.create(&event).await?;
        tracing::info!(event_id = created.id, host_id, "Event created");

        self.expand(created).await
    }

    async fn get_event(&self, event_id: i64) -> Result<EventResponse, EventError> {
        let event = self.find_event(event_id).await?;
        self.expand(event).await
    }

    async fn update_event(
        &self,
        event_id: i64,
        mut request: UpdateEventRequest,
    ) -> Result<EventResponse, EventError> {
        trim_field(&mut request.title);
        trim_field(&mut request.description);
        let mut errors = FieldErrors::from_validator(request.validate());
        let start_time = parse_optional_time(&mut errors, "startTime", request.start_time.as_deref());
        let end_time = parse_optional_time(&mut errors, "endTime", request.end_time.as_deref());
        if let Some(point) = &request.coordinates {
            point.check(&mut errors);
        }
        errors.into_result()?;

        let mut event = self.find_event(event_id).await?;
        let patch = EventPatch {
            title: request.title,
            description: request.description,
            location: request.location,
            coordinates: request.coordinates,
            start_time,
            end_time,
        };

        if patch.touches_schedule() {
            let mut errors = FieldErrors::new();
            check_schedule(
                start_time.unwrap_or(event.start_time),
                end_time.unwrap_or(event.end_time),
                &mut errors,
            );
            errors.into_result()?;
        }

        event.apply_patch(patch);
        event.updated_at = Utc::now();

        let updated = self.event_repo.update(&event).await?;
        self.expand(updated).await
    }

    async fn delete_event(&self, event_id: i64) -> Result<(), EventError> {
        self.find_event(event_id).await?;
        self.event_repo.delete(event_id).await?;
        tracing::info!(event_id, "Event deleted");
        Ok(())
    }

    async fn attend_event(
        &self,
        event_id: i64,
        request: UserActionRequest,
    ) -> Result<EventResponse, EventError> {
        let event = self.find_event(event_id).await?;
        let user_id = self.actor(&request).await?;

        let effects = attend_event(&event, user_id, Utc::now()).map_err(|e| {
            metrics::record_mutation("event", "attend", "rejected");
            e
        })?;

        let updated = self.event_repo.apply(event_id, &effects).await.map_err(|e| {
            metrics::record_mutation("event", "attend", "rejected");
            e
        })?;
        metrics::record_mutation("event", "attend", "applied");
        tracing::info!(event_id, user_id, "User attending event");

        self.expand(updated).await
    }

    async fn leave_event(
        &self,
        event_id: i64,
        request: UserActionRequest,
    ) -> Result<EventResponse, EventError> {
        let event = self.find_event(event_id).await?;
        let user_id = self.actor(&request).await?;

        let outcome = if event.is_attendee(user_id) { "applied" } else { "noop" };
        let updated = self
            .event_repo
            .apply(event_id, &leave_event(&event, user_id))
            .await?;
        metrics::record_mutation("event", "leave", outcome);

        self.expand(updated).await
    }
}
