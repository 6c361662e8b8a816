//! Request DTOs
//!
//! Data structures for API request bodies and query strings. Field names are
//! camelCase on the wire; identifiers and timestamps arrive as strings and are
//! parsed by the services so that every problem is reported together.

use serde::Deserialize;
use validator::Validate;

use crate::domain::value_objects::GeoPoint;

// ============================================================================
// Users
// ============================================================================

/// Create user request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, max = 100, message = "Name must be 1-100 characters")
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Email is required"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 100, message = "Major must be at most 100 characters"))]
    pub major: Option<String>,

    pub profile_picture_url: Option<String>,

    pub push_token: Option<String>,
}

/// Update user request. Only the allow-listed profile fields exist here;
/// anything else in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,

    #[validate(length(max = 100, message = "Major must be at most 100 characters"))]
    pub major: Option<String>,

    pub profile_picture_url: Option<String>,

    pub push_token: Option<String>,
}

/// User list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQueryParams {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// ============================================================================
// Events
// ============================================================================

/// Create event request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 3, max = 200, message = "Title must be 3-200 characters")
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Description is required"),
        length(min = 1, max = 2000, message = "Description must be 1-2000 characters")
    )]
    pub description: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    pub coordinates: Option<GeoPoint>,

    #[validate(required(message = "startTime is required"))]
    pub start_time: Option<String>,

    #[validate(required(message = "endTime is required"))]
    pub end_time: Option<String>,

    #[validate(required(message = "hostId is required"))]
    pub host_id: Option<String>,
}

/// Update event request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    pub coordinates: Option<GeoPoint>,

    pub start_time: Option<String>,

    pub end_time: Option<String>,
}

/// Event list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventQueryParams {
    /// ISO 8601 lower bound on startTime
    pub from: Option<String>,
    /// ISO 8601 upper bound on startTime
    pub to: Option<String>,
    pub host: Option<String>,
    pub attendee: Option<String>,
    pub upcoming: Option<bool>,
    /// `asc` (default) or `desc`
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// ============================================================================
// Clubs
// ============================================================================

/// Create club request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClubRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 3, max = 100, message = "Name must be 3-100 characters")
    )]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub members: Vec<String>,

    #[serde(default)]
    pub officers: Vec<String>,
}

/// Update club request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClubRequest {
    #[validate(length(min = 3, max = 100, message = "Name must be 3-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
}

/// Club list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClubQueryParams {
    pub search: Option<String>,
    pub member: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// ============================================================================
// Listings
// ============================================================================

/// Create listing request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 3, max = 200, message = "Title must be 3-200 characters")
    )]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[validate(required(message = "Price is required"))]
    pub price: Option<f64>,

    #[validate(required(message = "sellerId is required"))]
    pub seller_id: Option<String>,

    #[serde(default)]
    pub image_urls: Vec<String>,

    /// Defaults to `other`
    pub category: Option<String>,
}

/// Update listing request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub price: Option<f64>,

    pub image_urls: Option<Vec<String>>,

    pub category: Option<String>,

    pub is_available: Option<bool>,
}

/// Listing list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQueryParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Defaults to `true`
    pub available: Option<bool>,
    pub seller: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// ============================================================================
// Posts
// ============================================================================

/// Create post request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[validate(
        required(message = "Content is required"),
        length(min = 1, max = 2000, message = "Content must be 1-2000 characters")
    )]
    pub content: Option<String>,

    #[validate(required(message = "authorId is required"))]
    pub author_id: Option<String>,

    pub image_url: Option<String>,
}

/// Update post request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 2000, message = "Content must be 1-2000 characters"))]
    pub content: Option<String>,

    pub image_url: Option<String>,
}

/// Add comment request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(required(message = "userId is required"))]
    pub user_id: Option<String>,

    #[validate(required(message = "Content is required"))]
    pub content: Option<String>,
}

/// Post list query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQueryParams {
    pub search: Option<String>,
    pub author: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// ============================================================================
// Relationships and uploads
// ============================================================================

/// Body of every relationship endpoint: the acting user.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserActionRequest {
    #[validate(required(message = "userId is required"))]
    pub user_id: Option<String>,
}

/// Signed upload request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignatureRequest {
    /// Overrides the configured default folder
    #[validate(length(min = 1, max = 100, message = "Folder must be 1-100 characters"))]
    pub folder: Option<String>,
}
