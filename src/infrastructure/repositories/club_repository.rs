//! Club Repository Implementation
//!
//! PostgreSQL implementation of the ClubRepository trait. `officers <@ members`
//! is enforced by a CHECK constraint as well as by the mutators.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::services::{apply_effects, Effect};
use crate::domain::value_objects::{Page, PageRequest};
use crate::domain::{Club, ClubFilter, ClubRepository};
use crate::infrastructure::database::{timed, to_count};
use crate::shared::error::AppError;

const CLUB_COLUMNS: &str = "id, name, description, members, officers, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ClubRow {
    id: i64,
    name: String,
    description: Option<String>,
    members: Vec<i64>,
    officers: Vec<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClubRow> for Club {
    fn from(row: ClubRow) -> Self {
        Club {
            id: row.id,
            name: row.name,
            description: row.description,
            members: row.members,
            officers: row.officers,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ClubFilter) {
    qb.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        let pattern = search.like_pattern();
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(member_id) = filter.member_id {
        qb.push(" AND ").push_bind(member_id).push(" = ANY(members)");
    }
}

/// PostgreSQL club repository implementation.
#[derive(Clone)]
pub struct PgClubRepository {
    pool: PgPool,
}

impl PgClubRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count_where(&self, operation: &str, sql: &str, user_id: i64) -> Result<u64, AppError> {
        let n: i64 = timed(
            operation,
            "clubs",
            sqlx::query_scalar(sql).bind(user_id).fetch_one(&self.pool),
        )
        .await?;
        Ok(to_count(n))
    }
}

#[async_trait]
impl ClubRepository for PgClubRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Club>, AppError> {
        let row = timed(
            "find_by_id",
            "clubs",
            sqlx::query_as::<_, ClubRow>(&format!("SELECT {} FROM clubs WHERE id = $1", CLUB_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(Club::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Club>, AppError> {
        let row = timed(
            "find_by_name",
            "clubs",
            sqlx::query_as::<_, ClubRow>(&format!(
                "SELECT {} FROM clubs WHERE lower(name) = lower($1)",
                CLUB_COLUMNS
            ))
            .bind(name.trim())
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(Club::from))
    }

    async fn search(&self, filter: &ClubFilter, page: PageRequest) -> Result<Page<Club>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM clubs");
        push_filter(&mut count, filter);
        let total: i64 = timed("count", "clubs", count.build_query_scalar().fetch_one(&self.pool)).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM clubs", CLUB_COLUMNS));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY lower(name) ASC, id ASC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = timed(
            "search",
            "clubs",
            select.build_query_as::<ClubRow>().fetch_all(&self.pool),
        )
        .await?;

        Ok(Page::new(rows.into_iter().map(Club::from).collect(), to_count(total)))
    }

    async fn create(&self, club: &Club) -> Result<Club, AppError> {
        let row = timed(
            "create",
            "clubs",
            sqlx::query_as::<_, ClubRow>(&format!(
                r#"
                INSERT INTO clubs (id, name, description, members, officers, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {}
                "#,
                CLUB_COLUMNS
            ))
            .bind(club.id)
            .bind(&club.name)
            .bind(&club.description)
            .bind(&club.members)
            .bind(&club.officers)
            .bind(club.created_at)
            .bind(club.updated_at)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.into())
    }

    async fn update(&self, club: &Club) -> Result<Club, AppError> {
        let row = timed(
            "update",
            "clubs",
            sqlx::query_as::<_, ClubRow>(&format!(
                r#"
                UPDATE clubs
                SET name = $2, description = $3, updated_at = $4
                WHERE id = $1
                RETURNING {}
                "#,
                CLUB_COLUMNS
            ))
            .bind(club.id)
            .bind(&club.name)
            .bind(&club.description)
            .bind(club.updated_at)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Club not found".into()))?;

        Ok(row.into())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = timed(
            "delete",
            "clubs",
            sqlx::query("DELETE FROM clubs WHERE id = $1").bind(id).execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Club not found".into()));
        }
        Ok(())
    }

    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Club, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut club: Club = timed(
            "lock",
            "clubs",
            sqlx::query_as::<_, ClubRow>(&format!(
                "SELECT {} FROM clubs WHERE id = $1 FOR UPDATE",
                CLUB_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&mut *tx),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Club not found".into()))?
        .into();

        if !apply_effects(&mut club, effects, Utc::now())? {
            tx.rollback().await?;
            return Ok(club);
        }

        timed(
            "apply",
            "clubs",
            sqlx::query("UPDATE clubs SET members = $2, officers = $3, updated_at = $4 WHERE id = $1")
                .bind(id)
                .bind(&club.members)
                .bind(&club.officers)
                .bind(club.updated_at)
                .execute(&mut *tx),
        )
        .await?;

        tx.commit().await?;
        Ok(club)
    }

    async fn count_memberships(&self, user_id: i64) -> Result<u64, AppError> {
        self.count_where(
            "count_memberships",
            "SELECT COUNT(*) FROM clubs WHERE $1 = ANY(members)",
            user_id,
        )
        .await
    }

    async fn count_officer_positions(&self, user_id: i64) -> Result<u64, AppError> {
        self.count_where(
            "count_officer_positions",
            "SELECT COUNT(*) FROM clubs WHERE $1 = ANY(officers)",
            user_id,
        )
        .await
    }
}
