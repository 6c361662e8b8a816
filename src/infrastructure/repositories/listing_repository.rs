//! Listing Repository Implementation
//!
//! PostgreSQL implementation of the ListingRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::services::{apply_effects, Effect};
use crate::domain::value_objects::{Page, PageRequest};
use crate::domain::{Listing, ListingCategory, ListingFilter, ListingRepository};
use crate::infrastructure::database::{timed, to_count};
use crate::shared::error::AppError;

const LISTING_COLUMNS: &str = "id, title, description, price, seller_id, image_urls, category, \
                               is_available, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    description: Option<String>,
    price: f64,
    seller_id: i64,
    image_urls: Vec<String>,
    category: String,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ListingRow {
    fn into_listing(self) -> Listing {
        Listing {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            seller_id: self.seller_id,
            image_urls: self.image_urls,
            category: ListingCategory::parse(&self.category).unwrap_or_default(),
            is_available: self.is_available,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
    qb.push(" WHERE TRUE");
    if let Some(search) = &filter.search {
        let pattern = search.like_pattern();
        qb.push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(category) = filter.category {
        qb.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(available) = filter.available {
        qb.push(" AND is_available = ").push_bind(available);
    }
    if let Some(seller_id) = filter.seller_id {
        qb.push(" AND seller_id = ").push_bind(seller_id);
    }
}

/// PostgreSQL listing repository implementation.
#[derive(Clone)]
pub struct PgListingRepository {
    pool: PgPool,
}

impl PgListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepository for PgListingRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Listing>, AppError> {
        let row = timed(
            "find_by_id",
            "listings",
            sqlx::query_as::<_, ListingRow>(&format!(
                "SELECT {} FROM listings WHERE id = $1",
                LISTING_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(ListingRow::into_listing))
    }

    async fn search(
        &self,
        filter: &ListingFilter,
        page: PageRequest,
    ) -> Result<Page<Listing>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM listings");
        push_filter(&mut count, filter);
        let total: i64 = timed(
            "count",
            "listings",
            count.build_query_scalar().fetch_one(&self.pool),
        )
        .await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM listings", LISTING_COLUMNS));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);
        let rows = timed(
            "search",
            "listings",
            select.build_query_as::<ListingRow>().fetch_all(&self.pool),
        )
        .await?;

        Ok(Page::new(
            rows.into_iter().map(ListingRow::into_listing).collect(),
            to_count(total),
        ))
    }

    async fn create(&self, listing: &Listing) -> Result<Listing, AppError> {
        let row = timed(
            "create",
            "listings",
            sqlx::query_as::<_, ListingRow>(&format!(
                r#"
                INSERT INTO listings (id, title, description, price, seller_id, image_urls,
                                      category, is_available, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                RETURNING {}
                "#,
                LISTING_COLUMNS
            ))
            .bind(listing.id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.price)
            .bind(listing.seller_id)
            .bind(&listing.image_urls)
            .bind(listing.category.as_str())
            .bind(listing.is_available)
            .bind(listing.created_at)
            .bind(listing.updated_at)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(row.into_listing())
    }

    async fn update(&self, listing: &Listing) -> Result<Listing, AppError> {
        let row = timed(
            "update",
            "listings",
            sqlx::query_as::<_, ListingRow>(&format!(
                r#"
                UPDATE listings
                SET title = $2, description = $3, price = $4, image_urls = $5,
                    category = $6, is_available = $7, updated_at = $8
                WHERE id = $1
                RETURNING {}
                "#,
                LISTING_COLUMNS
            ))
            .bind(listing.id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(listing.price)
            .bind(&listing.image_urls)
            .bind(listing.category.as_str())
            .bind(listing.is_available)
            .bind(listing.updated_at)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".into()))?;

        Ok(row.into_listing())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = timed(
            "delete",
            "listings",
            sqlx::query("DELETE FROM listings WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Listing not found".into()));
        }
        Ok(())
    }

    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Listing, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut listing = timed(
            "lock",
            "listings",
            sqlx::query_as::<_, ListingRow>(&format!(
                "SELECT {} FROM listings WHERE id = $1 FOR UPDATE",
                LISTING_COLUMNS
            ))
            .bind(id)
            .fetch_optional(&mut *tx),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Listing not found".into()))?
        .into_listing();

        if !apply_effects(&mut listing, effects, Utc::now())? {
            tx.rollback().await?;
            return Ok(listing);
        }

        timed(
            "apply",
            "listings",
            sqlx::query("UPDATE listings SET is_available = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(listing.is_available)
                .bind(listing.updated_at)
                .execute(&mut *tx),
        )
        .await?;

        tx.commit().await?;
        Ok(listing)
    }

    async fn count_active(&self, seller_id: i64) -> Result<u64, AppError> {
        let n: i64 = timed(
            "count_active",
            "listings",
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM listings WHERE seller_id = $1 AND is_available",
            )
            .bind(seller_id)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(to_count(n))
    }
}
