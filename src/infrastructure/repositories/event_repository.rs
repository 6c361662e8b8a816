//! Event Repository Implementation
//!
//! PostgreSQL implementation of the EventRepository trait. The attendee set
//! is a `BIGINT[]` column; attendance changes lock the row and rewrite it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::services::{apply_effects, Effect};
use crate::domain::value_objects::{GeoPoint, Page, PageRequest};
use crate::domain::{Event, EventFilter, EventRepository, SortOrder};
use crate::infrastructure::database::{timed, to_count};
use crate::shared::error::AppError;

const EVENT_COLUMNS: &str = "id, title, description, location, longitude, latitude, start_time, \
                             end_time, host_id, attendees, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i64,
    title: String,
    description: String,
    location: Option<String>,
    longitude: Option<f64>,
    latitude: Option<f64>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    host_id: i64,
    attendees: Vec<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self) -> Event {
        Event {
            id: self.id,
            title: self.title,
            description: self.description,
            location: self.location,
            coordinates: match (self.longitude, self.latitude) {
                (Some(lon), Some(lat)) => Some(GeoPoint::new(lon, lat)),
                _ => None,
            },
            start_time: self.start_time,
            end_time: self.end_time,
            host_id: self.host_id,
            attendees: self.attendees,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &EventFilter) {
    qb.push(" WHERE TRUE");
    if let Some(from) = filter.from {
        qb.push(" AND start_time >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND start_time <= ").push_bind(to);
    }
    if let Some(host_id) = filter.host_id {
        qb.push(" AND host_id = ").push_bind(host_id);
    }
    if let Some(attendee_id) = filter.attendee_id {
        qb.push(" AND ").push_bind(attendee_id).push(" = ANY(attendees)");
    }
}

/// PostgreSQL event repository implementation.
#[derive(Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AppError> {
        let row = timed(
            "find_by_id",
            "events",
            sqlx::query_as::<_, EventRow>(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(EventRow::into_event))
    }

    async fn search(&self, filter: &EventFilter, page: PageRequest) -> Result<Page<Event>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events");
        push_filter(&mut count, filter);
        let total: i64 = timed("count", "events", count.build_query_scalar().fetch_one(&self.pool)).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM events", EVENT_COLUMNS));
        push_filter(&mut select, filter);
        select.push(match filter.sort {
            SortOrder::Ascending => " ORDER BY start_time ASC, id ASC",
            SortOrder::Descending => " ORDER BY start_time DESC, id DESC",
        });
        select
            .push(" LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = timed(
            "search",
            "events",
            select.build_query_as::<EventRow>().fetch_all(&self.pool),
        )
        .await?;

        Ok(Page::new(
            rows.into_iter().map(EventRow::into_event).collect(),
            to_count(total),
        ))
    }

    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        let row = timed(
            "create",
            "events",
            sqlx::query_as::<_, EventRow>(&format!(
                r#"
                INSERT INTO events (id, title, description, location, longitude, latitude,
                                    start_time, end_time, host_id, attendees, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING {}
                "#,
                EVENT_COLUMNS
            ))
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.coordinates.map(|c| c.longitude))
            .bind(event.coordinates.map(|c| c.latitude))
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.host_id)
            .bind(&event.attendees)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.into_event())
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        let row = timed(
            "update",
            "events",
            sqlx::query_as::<_, EventRow>(&format!(
                r#"
                UPDATE events
                SET title = $2, description = $3, location = $4, longitude = $5, latitude = $6,
                    start_time = $7, end_time = $8, updated_at = $9
                WHERE id = $1
                RETURNING {}
                "#,
                EVENT_COLUMNS
            ))
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.coordinates.map(|c| c.longitude))
            .bind(event.coordinates.map(|c| c.latitude))
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.updated_at)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

        Ok(row.into_event())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = timed(
            "delete",
            "events",
            sqlx::query("DELETE FROM events WHERE id = $1").bind(id).execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(())
    }

    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Event, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut event = timed(
            "lock",
            "events",
            sqlx::query_as::<_, EventRow>(&format!(
                "SELECT {} FROM events WHERE id = $1 FOR UPDATE",
                EVENT_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&mut *tx),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?
        .into_event();

        if !apply_effects(&mut event, effects, Utc::now())? {
            tx.rollback().await?;
            return Ok(event);
        }

        timed(
            "apply",
            "events",
            sqlx::query("UPDATE events SET attendees = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(&event.attendees)
                .bind(event.updated_at)
                .execute(&mut *tx),
        )
        .await?;

        tx.commit().await?;
        Ok(event)
    }

    async fn count_hosted(&self, user_id: i64) -> Result<u64, AppError> {
        let n: i64 = timed(
            "count_hosted",
            "events",
            sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE host_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(to_count(n))
    }

    async fn count_attending(&self, user_id: i64) -> Result<u64, AppError> {
        let n: i64 = timed(
            "count_attending",
            "events",
            sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE $1 = ANY(attendees)")
                .bind(user_id)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(to_count(n))
    }
}
