//! Response DTOs
//!
//! Data structures for API response bodies. Every body is wrapped in the
//! `{success, message?, data?}` envelope; IDs are rendered as strings.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::{GeoPoint, PageMeta};
use crate::domain::{Club, Comment, Event, Listing, ListingCategory, Post, User};

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a message (deletes, leave operations)
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// One page of items plus pagination metadata
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

// ============================================================================
// Users
// ============================================================================

/// Public projection of a user, used wherever a reference is expanded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub major: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            major: user.major.clone(),
            profile_picture_url: user.profile_picture_url.clone(),
        }
    }
}

/// Full user response. The push token is never returned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub major: Option<String>,
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
            bio: user.bio,
            major: user.major,
            profile_picture_url: user.profile_picture_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Derived profile statistics. Nothing here is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub club_count: u64,
    pub officer_count: u64,
    pub events_hosted: u64,
    pub events_attending: u64,
    pub active_listings: u64,
    pub post_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub stats: ProfileStats,
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub coordinates: Option<GeoPoint>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// `null` when the host account no longer exists
    pub host: Option<UserSummary>,
    pub attendees: Vec<UserSummary>,
    /// Explicit attendees only; the host is not counted
    pub attendee_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventResponse {
    pub fn new(event: Event, host: Option<UserSummary>, attendees: Vec<UserSummary>) -> Self {
        Self {
            id: event.id.to_string(),
            attendee_count: event.attendee_count(),
            title: event.title,
            description: event.description,
            location: event.location,
            coordinates: event.coordinates,
            start_time: event.start_time,
            end_time: event.end_time,
            host,
            attendees,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

// ============================================================================
// Clubs
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<UserSummary>,
    pub officers: Vec<UserSummary>,
    pub member_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClubResponse {
    pub fn new(club: Club, members: Vec<UserSummary>, officers: Vec<UserSummary>) -> Self {
        Self {
            id: club.id.to_string(),
            member_count: club.member_count(),
            name: club.name,
            description: club.description,
            members,
            officers,
            created_at: club.created_at,
            updated_at: club.updated_at,
        }
    }
}

// ============================================================================
// Listings
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub price: f64,
    pub seller: Option<UserSummary>,
    pub image_urls: Vec<String>,
    pub category: ListingCategory,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingResponse {
    pub fn new(listing: Listing, seller: Option<UserSummary>) -> Self {
        Self {
            id: listing.id.to_string(),
            title: listing.title,
            description: listing.description,
            price: listing.price,
            seller,
            image_urls: listing.image_urls,
            category: listing.category,
            is_available: listing.is_available,
            created_at: listing.created_at,
            updated_at: listing.updated_at,
        }
    }
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub author: Option<UserSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    pub fn new(comment: Comment, author: Option<UserSummary>) -> Self {
        Self {
            id: comment.id.to_string(),
            author,
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub content: String,
    pub author: Option<UserSummary>,
    pub image_url: Option<String>,
    /// IDs of users who liked the post
    pub likes: Vec<String>,
    pub like_count: usize,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: Post, author: Option<UserSummary>, comments: Vec<CommentResponse>) -> Self {
        Self {
            id: post.id.to_string(),
            like_count: post.like_count(),
            likes: post.likes.iter().map(|id| id.to_string()).collect(),
            content: post.content,
            author,
            image_url: post.image_url,
            comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Result of a like toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: usize,
}

// ============================================================================
// Uploads
// ============================================================================

/// Short-lived authorization for a direct upload to the media host
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignatureResponse {
    pub signature: String,
    /// Unix seconds the signature was issued at
    pub timestamp: i64,
    pub api_key: String,
    pub cloud_name: String,
    pub folder: String,
    pub expires_at: DateTime<Utc>,
}
