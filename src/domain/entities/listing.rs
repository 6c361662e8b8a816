//! Marketplace listing entity and repository trait.
//!
//! Maps to the `listings` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::services::effects::{Document, Effect, SetField};
use crate::domain::value_objects::{check_image_url, Page, PageRequest, SearchTerm};
use crate::shared::error::AppError;
use crate::shared::validation::FieldErrors;

pub const LISTING_TITLE_MIN: u64 = 3;
pub const LISTING_TITLE_MAX: u64 = 200;
pub const LISTING_DESCRIPTION_MAX: u64 = 1000;
pub const MAX_LISTING_IMAGES: usize = 10;

/// Listing category enum matching the database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ListingCategory {
    Books,
    Electronics,
    Furniture,
    #[default]
    Other,
}

impl ListingCategory {
    pub const ALL: [ListingCategory; 4] = [
        Self::Books,
        Self::Electronics,
        Self::Furniture,
        Self::Other,
    ];

    /// Parse from the API/database representation. Unknown values are `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "books" => Some(Self::Books),
            "electronics" => Some(Self::Electronics),
            "furniture" => Some(Self::Furniture),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Electronics => "electronics",
            Self::Furniture => "furniture",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ListingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An item offered for sale by a student.
///
/// Maps to the `listings` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - title: VARCHAR(200) NOT NULL
/// - description: VARCHAR(1000) NULL
/// - price: DOUBLE PRECISION NOT NULL, CHECK (price >= 0)
/// - seller_id: BIGINT NOT NULL (weak reference to users)
/// - image_urls: TEXT[] NOT NULL, CHECK (cardinality(image_urls) <= 10)
/// - category: VARCHAR(20) NOT NULL
/// - is_available: BOOLEAN NOT NULL DEFAULT TRUE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub seller_id: i64,
    pub image_urls: Vec<String>,
    pub category: ListingCategory,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_seller(&self, user_id: i64) -> bool {
        self.seller_id == user_id
    }

    pub fn apply_patch(&mut self, patch: ListingPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(image_urls) = patch.image_urls {
            self.image_urls = image_urls;
        }
        if let Some(is_available) = patch.is_available {
            self.is_available = is_available;
        }
    }
}

impl Document for Listing {
    const KIND: &'static str = "listing";

    fn set_mut(&mut self, _field: SetField) -> Option<&mut Vec<i64>> {
        None
    }

    fn availability_mut(&mut self) -> Option<&mut bool> {
        Some(&mut self.is_available)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Price must be a finite, non-negative number.
pub fn check_price(price: f64, errors: &mut FieldErrors) {
    if !price.is_finite() || price < 0.0 {
        let shown = if price.is_finite() {
            serde_json::json!(price)
        } else {
            serde_json::json!(price.to_string())
        };
        errors.add("price", "Price must be a non-negative number", shown);
    }
}

/// At most ten images, each a valid image URL. Never truncated.
pub fn check_images(urls: &[String], errors: &mut FieldErrors) {
    if urls.len() > MAX_LISTING_IMAGES {
        errors.add(
            "imageUrls",
            format!("A listing can have at most {} images", MAX_LISTING_IMAGES),
            urls.len(),
        );
        return;
    }
    for (i, url) in urls.iter().enumerate() {
        check_image_url(&format!("imageUrls[{}]", i), url, errors);
    }
}

/// The listing fields the seller may change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<ListingCategory>,
    pub image_urls: Option<Vec<String>>,
    pub is_available: Option<bool>,
}

/// Filter for marketplace browsing.
#[derive(Debug, Clone)]
pub struct ListingFilter {
    /// Matches title or description
    pub search: Option<SearchTerm>,
    pub category: Option<ListingCategory>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// `Some(true)` by default: only listings still for sale
    pub available: Option<bool>,
    pub seller_id: Option<i64>,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            min_price: None,
            max_price: None,
            available: Some(true),
            seller_id: None,
        }
    }
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        self.search.as_ref().map_or(true, |s| {
            s.matches_any([Some(listing.title.as_str()), listing.description.as_deref()])
        }) && self.category.map_or(true, |c| listing.category == c)
            && self.min_price.map_or(true, |min| listing.price >= min)
            && self.max_price.map_or(true, |max| listing.price <= max)
            && self.available.map_or(true, |a| listing.is_available == a)
            && self.seller_id.map_or(true, |s| listing.seller_id == s)
    }
}

/// Repository trait for Listing data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Listing>, AppError>;

    /// Page through listings matching `filter`, newest first.
    async fn search(
        &self,
        filter: &ListingFilter,
        page: PageRequest,
    ) -> Result<Page<Listing>, AppError>;

    async fn create(&self, listing: &Listing) -> Result<Listing, AppError>;

    async fn update(&self, listing: &Listing) -> Result<Listing, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Atomically apply effects (availability flips) to one listing.
    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Listing, AppError>;

    /// Listings a user still has for sale.
    async fn count_active(&self, seller_id: i64) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn create_test_listing() -> Listing {
        Listing {
            id: 1,
            title: "Calculus textbook".into(),
            description: Some("Lightly used".into()),
            price: 40.0,
            seller_id: 7,
            image_urls: vec![],
            category: ListingCategory::Books,
            is_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_category_parse_roundtrip() {
        for category in ListingCategory::ALL {
            assert_eq!(ListingCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(ListingCategory::parse("ELECTRONICS"), Some(ListingCategory::Electronics));
        assert_eq!(ListingCategory::parse("cars"), None);
    }

    #[test_case(0.0, true ; "free")]
    #[test_case(19.99, true ; "positive")]
    #[test_case(-0.01, false ; "negative")]
    #[test_case(f64::NAN, false ; "nan")]
    #[test_case(f64::INFINITY, false ; "infinity")]
    fn test_check_price(price: f64, valid: bool) {
        let mut errors = FieldErrors::new();
        check_price(price, &mut errors);
        assert_eq!(errors.is_empty(), valid);
    }

    #[test]
    fn test_eleven_images_rejected_not_truncated() {
        let urls: Vec<String> = (0..11)
            .map(|i| format!("https://cdn.example.com/{}.jpg", i))
            .collect();
        let mut errors = FieldErrors::new();
        check_images(&urls, &mut errors);
        assert!(errors.has("imageUrls"));
        assert_eq!(urls.len(), 11);
    }

    #[test]
    fn test_ten_valid_images_accepted() {
        let urls: Vec<String> = (0..10)
            .map(|i| format!("https://cdn.example.com/{}.png", i))
            .collect();
        let mut errors = FieldErrors::new();
        check_images(&urls, &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_invalid_image_reports_index() {
        let mut errors = FieldErrors::new();
        check_images(&["https://x.com/a.jpg".into(), "nope".into()], &mut errors);
        assert!(errors.has("imageUrls[1]"));
    }

    #[test]
    fn test_default_filter_hides_sold_listings() {
        let mut listing = create_test_listing();
        assert!(ListingFilter::default().matches(&listing));
        listing.is_available = false;
        assert!(!ListingFilter::default().matches(&listing));
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let listing = create_test_listing();
        let filter = ListingFilter {
            min_price: Some(40.0),
            max_price: Some(40.0),
            category: Some(ListingCategory::Books),
            ..Default::default()
        };
        assert!(filter.matches(&listing));
    }
}
