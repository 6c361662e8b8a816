//! Listing Service
//!
//! Handles marketplace listings: CRUD, browsing filters and availability.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use super::population::UserDirectory;
use crate::application::dto::{
    CreateListingRequest, ListingQueryParams, ListingResponse, Paginated, UpdateListingRequest,
};
use crate::domain::services::{set_availability, MutationError};
use crate::domain::value_objects::{PageMeta, PageRequest, SearchTerm};
use crate::domain::{
    check_images, check_price, Listing, ListingCategory, ListingFilter, ListingPatch,
    ListingRepository, UserRepository,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{trim_field, FieldErrors};

/// Listing service trait
#[async_trait]
pub trait ListingService: Send + Sync {
    /// Browse listings. Only available listings unless `available=false`.
    async fn list_listings(
        &self,
        query: ListingQueryParams,
    ) -> Result<Paginated<ListingResponse>, ListingError>;

    async fn create_listing(&self, request: CreateListingRequest) -> Result<ListingResponse, ListingError>;

    async fn get_listing(&self, listing_id: i64) -> Result<ListingResponse, ListingError>;

    async fn update_listing(
        &self,
        listing_id: i64,
        request: UpdateListingRequest,
    ) -> Result<ListingResponse, ListingError>;

    async fn delete_listing(&self, listing_id: i64) -> Result<(), ListingError>;

    /// Flip availability; already in the requested state is a conflict
    async fn set_availability(
        &self,
        listing_id: i64,
        available: bool,
    ) -> Result<ListingResponse, ListingError>;
}

/// Listing service errors
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("Listing not found")]
    NotFound,

    #[error("Seller not found")]
    SellerNotFound,

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<ListingError> for AppError {
    fn from(e: ListingError) -> Self {
        match e {
            ListingError::NotFound | ListingError::SellerNotFound => {
                AppError::NotFound(e.to_string())
            }
            ListingError::Mutation(m) => m.into(),
            ListingError::App(inner) => inner,
        }
    }
}

/// ListingService implementation
pub struct ListingServiceImpl {
    listing_repo: Arc<dyn ListingRepository>,
    user_repo: Arc<dyn UserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl ListingServiceImpl {
    pub fn new(
        listing_repo: Arc<dyn ListingRepository>,
        user_repo: Arc<dyn UserRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            listing_repo,
            user_repo,
            id_generator,
        }
    }

    async fn find_listing(&self, listing_id: i64) -> Result<Listing, ListingError> {
        self.listing_repo
            .find_by_id(listing_id)
            .await?
            .ok_or(ListingError::NotFound)
    }

    async fn expand(&self, listing: Listing) -> Result<ListingResponse, ListingError> {
        let directory = UserDirectory::load(&self.user_repo, [listing.seller_id]).await?;
        Ok(directory.listing(listing))
    }
}

fn parse_category(errors: &mut FieldErrors, raw: Option<&str>) -> Option<ListingCategory> {
    let raw = raw?;
    let category = ListingCategory::parse(raw);
    if category.is_none() {
        errors.add(
            "category",
            "Category must be one of books, electronics, furniture, other",
            raw,
        );
    }
    category
}

#[async_trait]
impl ListingService for ListingServiceImpl {
    async fn list_listings(
        &self,
        query: ListingQueryParams,
    ) -> Result<Paginated<ListingResponse>, ListingError> {
        let mut errors = FieldErrors::new();
        let page = PageRequest::parse(query.page, query.limit, &mut errors);
        let search = SearchTerm::parse(query.search.as_deref(), &mut errors);
        let category = parse_category(&mut errors, query.category.as_deref());
        let seller_id = query
            .seller
            .as_deref()
            .and_then(|raw| errors.identifier("seller", raw));
        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                errors.add("minPrice", "minPrice must not exceed maxPrice", min);
            }
        }
        errors.into_result()?;

        let filter = ListingFilter {
            search,
            category,
            min_price: query.min_price,
            max_price: query.max_price,
            available: Some(query.available.unwrap_or(true)),
            seller_id,
        };
        let result = self.listing_repo.search(&filter, page).await?;
        let directory = UserDirectory::load(
            &self.user_repo,
            result.items.iter().map(|l| l.seller_id).collect::<Vec<_>>(),
        )
        .await?;

        Ok(Paginated {
            pagination: PageMeta::new(page, result.total),
            items: result.items.into_iter().map(|l| directory.listing(l)).collect(),
        })
    }

    async fn create_listing(&self, mut request: CreateListingRequest) -> Result<ListingResponse, ListingError> {
        trim_field(&mut request.title);
        let mut errors = FieldErrors::from_validator(request.validate());
        if let Some(price) = request.price {
            check_price(price, &mut errors);
        }
        check_images(&request.image_urls, &mut errors);
        let category = parse_category(&mut errors, request.category.as_deref());
        let seller_id = request
            .seller_id
            .as_deref()
            .and_then(|raw| errors.identifier("sellerId", raw));
        errors.into_result()?;

        let (Some(title), Some(price), Some(seller_id)) = (request.title, request.price, seller_id)
        else {
            return Err(AppError::Internal("validated listing request is incomplete".into()).into());
        };

        if self.user_repo.find_by_id(seller_id).await?.is_none() {
            return Err(ListingError::SellerNotFound);
        }

        let now = Utc::now();
        let listing = Listing {
            id: self.id_generator.generate(),
            title,
            description: request.description,
            price,
            seller_id,
            image_urls: request.image_urls,
            category: category.unwrap_or_default(),
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        let created = self.listing_repo.create(&listing).await?;
        tracing::info!(listing_id = created.id, seller_id, "Listing created");

        self.expand(created).await
    }

    async fn get_listing(&self, listing_id: i64) -> Result<ListingResponse, ListingError> {
        let listing = self.find_listing(listing_id).await?;
        self.expand(listing).await
    }

    async fn update_listing(
        &self,
        listing_id: i64,
        mut request: UpdateListingRequest,
    ) -> Result<ListingResponse, ListingError> {
        trim_field(&mut request.title);
        let mut errors = FieldErrors::from_validator(request.validate());
        if let Some(price) = request.price {
            check_price(price, &mut errors);
        }
        if let Some(urls) = &request.image_urls {
            check_images(urls, &mut errors);
        }
        let category = parse_category(&mut errors, request.category.as_deref());
        errors.into_result()?;

        let mut listing = self.find_listing(listing_id).await?;
        listing.apply_patch(ListingPatch {
            title: request.title,
            description: request.description,
            price: request.price,
            category,
            image_urls: request.image_urls,
            is_available: request.is_available,
        });
        listing.updated_at = Utc::now();

        let updated = self.listing_repo.update(&listing).await?;
        self.expand(updated).await
    }

    async fn delete_listing(&self, listing_id: i64) -> Result<(), ListingError> {
        self.find_listing(listing_id).await?;
        self.listing_repo.delete(listing_id).await?;
        tracing::info!(listing_id, "Listing deleted");
        Ok(())
    }

    async fn set_availability(
        &self,
        listing_id: i64,
        available: bool,
    ) -> Result<ListingResponse, ListingError> {
        let operation = if available { "mark_available" } else { "mark_sold" };
        let listing = self.find_listing(listing_id).await?;

        let effects = set_availability(&listing, available).map_err(|e| {
            metrics::record_mutation("listing", operation, "rejected");
            e
        })?;
        let updated = self.listing_repo.apply(listing_id, &effects).await?;
        metrics::record_mutation("listing", operation, "applied");
        tracing::info!(listing_id, available, "Listing availability changed");

        self.expand(updated).await
    }
}
