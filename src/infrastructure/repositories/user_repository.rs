//! User Repository Implementation
//!
//! PostgreSQL implementation of the UserRepository trait.
//! Maps between the database schema and domain User entity.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::value_objects::{Page, PageRequest};
use crate::domain::{User, UserFilter, UserRepository};
use crate::infrastructure::database::{timed, to_count};
use crate::shared::error::AppError;

const USER_COLUMNS: &str =
    "id, name, email, bio, major, profile_picture_url, push_token, created_at, updated_at";

/// Database row representation of the users table.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    bio: Option<String>,
    major: Option<String>,
    profile_picture_url: Option<String>,
    push_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            bio: self.bio,
            major: self.major,
            profile_picture_url: self.profile_picture_url,
            push_token: self.push_token,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Append the WHERE clause for `filter` to a users query.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    qb.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        let pattern = search.like_pattern();
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR major ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// PostgreSQL user repository implementation.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = timed(
            "find_by_id",
            "users",
            sqlx::query_as::<_, UserRow>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = timed(
            "find_many",
            "users",
            sqlx::query_as::<_, UserRow>(&format!(
                "SELECT {} FROM users WHERE id = ANY($1)",
                USER_COLUMNS
            ))
            .bind(ids)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = timed(
            "find_by_email",
            "users",
            sqlx::query_as::<_, UserRow>(&format!(
                "SELECT {} FROM users WHERE lower(email) = lower($1)",
                USER_COLUMNS
            ))
            .bind(email)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn search(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filter(&mut count, filter);
        let total: i64 = timed(
            "count",
            "users",
            count.build_query_scalar().fetch_one(&self.pool),
        )
        .await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM users", USER_COLUMNS));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = timed(
            "search",
            "users",
            select.build_query_as::<UserRow>().fetch_all(&self.pool),
        )
        .await?;

        Ok(Page::new(
            rows.into_iter().map(UserRow::into_user).collect(),
            to_count(total),
        ))
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let row = timed(
            "create",
            "users",
            sqlx::query_as::<_, UserRow>(&format!(
                r#"
                INSERT INTO users (id, name, email, bio, major, profile_picture_url, push_token,
                                   created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING {}
                "#,
                USER_COLUMNS
            ))
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.bio)
            .bind(&user.major)
            .bind(&user.profile_picture_url)
            .bind(&user.push_token)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.into_user())
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let row = timed(
            "update",
            "users",
            sqlx::query_as::<_, UserRow>(&format!(
                r#"
                UPDATE users
                SET name = $2,
                    bio = $3,
                    major = $4,
                    profile_picture_url = $5,
                    push_token = $6,
                    updated_at = $7
                WHERE id = $1
                RETURNING {}
                "#,
                USER_COLUMNS
            ))
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.bio)
            .bind(&user.major)
            .bind(&user.profile_picture_url)
            .bind(&user.push_token)
            .bind(user.updated_at)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        Ok(row.into_user())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = timed(
            "delete",
            "users",
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        Ok(())
    }
}
