//! Post Repository Implementation
//!
//! PostgreSQL implementation of the PostRepository trait. Likes are a
//! `BIGINT[]` column and comments a JSONB array on the post row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::services::{apply_effects, Effect};
use crate::domain::value_objects::{Page, PageRequest};
use crate::domain::{Comment, Post, PostFilter, PostRepository};
use crate::infrastructure::database::{timed, to_count};
use crate::shared::error::AppError;

const POST_COLUMNS: &str =
    "id, content, author_id, image_url, likes, comments, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: i64,
    content: String,
    author_id: i64,
    image_url: Option<String>,
    likes: Vec<i64>,
    comments: Json<Vec<Comment>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PostRow {
    fn into_post(self) -> Post {
        Post {
            id: self.id,
            content: self.content,
            author_id: self.author_id,
            image_url: self.image_url,
            likes: self.likes,
            comments: self.comments.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    qb.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        qb.push(" AND content ILIKE ")
            .push_bind(search.like_pattern())
            .push(" ESCAPE '\\'");
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND author_id = ").push_bind(author_id);
    }
}

/// PostgreSQL post repository implementation.
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        let row = timed(
            "find_by_id",
            "posts",
            sqlx::query_as::<_, PostRow>(&format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(PostRow::into_post))
    }

    async fn search(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts");
        push_filter(&mut count, filter);
        let total: i64 = timed("count", "posts", count.build_query_scalar().fetch_one(&self.pool)).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM posts", POST_COLUMNS));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = timed(
            "search",
            "posts",
            select.build_query_as::<PostRow>().fetch_all(&self.pool),
        )
        .await?;

        Ok(Page::new(
            rows.into_iter().map(PostRow::into_post).collect(),
            to_count(total),
        ))
    }

    async fn create(&self, post: &Post) -> Result<Post, AppError> {
        let row = timed(
            "create",
            "posts",
            sqlx::query_as::<_, PostRow>(&format!(
                r#"
                INSERT INTO posts (id, content, author_id, image_url, likes, comments,
                                   created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {}
                "#,
                POST_COLUMNS
            ))
            .bind(post.id)
            .bind(&post.content)
            .bind(post.author_id)
            .bind(&post.image_url)
            .bind(&post.likes)
            .bind(Json(&post.comments))
            .bind(post.created_at)
            .bind(post.updated_at)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.into_post())
    }

    async fn update(&self, post: &Post) -> Result<Post, AppError> {
        let row = timed(
            "update",
            "posts",
            sqlx::query_as::<_, PostRow>(&format!(
                r#"
                UPDATE posts
                SET content = $2, image_url = $3, updated_at = $4
                WHERE id = $1
                RETURNING {}
                "#,
                POST_COLUMNS
            ))
            .bind(post.id)
            .bind(&post.content)
            .bind(&post.image_url)
            .bind(post.updated_at)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

        Ok(row.into_post())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = timed(
            "delete",
            "posts",
            sqlx::query("DELETE FROM posts WHERE id = $1").bind(id).execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found".into()));
        }
        Ok(())
    }

    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Post, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut post = timed(
            "lock",
            "posts",
            sqlx::query_as::<_, PostRow>(&format!(
                "SELECT {} FROM posts WHERE id = $1 FOR UPDATE",
                POST_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&mut *tx),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?
        .into_post();

        if !apply_effects(&mut post, effects, Utc::now())? {
            tx.rollback().await?;
            return Ok(post);
        }

        timed(
            "apply",
            "posts",
            sqlx::query("UPDATE posts SET likes = $2, comments = $3, updated_at = $4 WHERE id = $1")
                .bind(id)
                .bind(&post.likes)
                .bind(Json(&post.comments))
                .bind(post.updated_at)
                .execute(&mut *tx),
        )
        .await?;

        tx.commit().await?;
        Ok(post)
    }

    async fn count_by_author(&self, author_id: i64) -> Result<u64, AppError> {
        let n: i64 = timed(
            "count_by_author",
            "posts",
            sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&self.pool),
        )
        .await?;
        Ok(to_count(n))
    }
}
