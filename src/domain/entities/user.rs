//! User entity and repository trait.
//!
//! Maps to the `users` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Page, PageRequest, SearchTerm};
use crate::shared::error::AppError;

pub const USER_NAME_MAX: u64 = 100;
pub const USER_BIO_MAX: u64 = 500;

/// Represents a student account.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(100) NOT NULL
/// - email: VARCHAR(255) NOT NULL, unique on lower(email)
/// - bio: VARCHAR(500) NULL
/// - major: VARCHAR(100) NULL
/// - profile_picture_url: TEXT NULL
/// - push_token: TEXT NULL
/// - created_at / updated_at: TIMESTAMPTZ NOT NULL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Snowflake ID (primary key)
    pub id: i64,

    /// Display name (1-100 characters)
    pub name: String,

    /// Lowercased email address (unique)
    pub email: String,

    /// About me text (up to 500 characters)
    pub bio: Option<String>,

    pub major: Option<String>,

    /// URL to the user's profile image
    pub profile_picture_url: Option<String>,

    /// Push notification token of the user's device
    #[serde(skip_serializing)]
    pub push_token: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Apply an allow-listed profile update. Fields left `None` are unchanged.
    pub fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(bio) = patch.bio {
            self.bio = Some(bio);
        }
        if let Some(major) = patch.major {
            self.major = Some(major);
        }
        if let Some(url) = patch.profile_picture_url {
            self.profile_picture_url = Some(url);
        }
        if let Some(token) = patch.push_token {
            self.push_token = Some(token);
        }
    }
}

impl Default for User {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: String::new(),
            email: String::new(),
            bio: None,
            major: None,
            profile_picture_url: None,
            push_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Trim and lowercase an email address before validation and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The profile fields a user may change after signup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub major: Option<String>,
    pub profile_picture_url: Option<String>,
    pub push_token: Option<String>,
}

/// Filter for user listings.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Matches name or major
    pub search: Option<SearchTerm>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.search
            .as_ref()
            .map_or(true, |s| s.matches_any([Some(user.name.as_str()), user.major.as_deref()]))
    }
}

/// Repository trait for User data access operations.
///
/// Implementations of this trait handle the actual storage interactions.
/// The trait is defined in the domain layer to maintain dependency inversion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find every existing user among `ids`. Missing IDs are skipped.
    async fn find_many(&self, ids: &[i64]) -> Result<Vec<User>, AppError>;

    /// Find a user by their (normalized) email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Page through users matching `filter`, newest first.
    async fn search(&self, filter: &UserFilter, page: PageRequest) -> Result<Page<User>, AppError>;

    /// Create a new user. A taken email is a `Conflict`.
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Update an existing user's profile fields.
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Hard delete. References held by other documents are left in place.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> User {
        User {
            id: 12345678901234567,
            name: "Ada Lovelace".to_string(),
            email: "ada@campus.edu".to_string(),
            major: Some("Mathematics".to_string()),
            push_token: Some("ExponentPushToken[abc]".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Campus.EDU "), "ada@campus.edu");
    }

    #[test]
    fn test_apply_patch_only_touches_supplied_fields() {
        let mut user = create_test_user();
        user.apply_patch(UserPatch {
            bio: Some("Analyst".into()),
            ..Default::default()
        });

        assert_eq!(user.bio.as_deref(), Some("Analyst"));
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.major.as_deref(), Some("Mathematics"));
    }

    #[test]
    fn test_push_token_not_serialized() {
        let serialized = serde_json::to_string(&create_test_user()).unwrap();
        assert!(!serialized.contains("push_token"));
        assert!(!serialized.contains("ExponentPushToken"));
    }

    #[test]
    fn test_filter_searches_name_and_major() {
        let user = create_test_user();
        let mut errors = crate::shared::validation::FieldErrors::new();

        let by_major = UserFilter {
            search: SearchTerm::parse(Some("math"), &mut errors),
        };
        let miss = UserFilter {
            search: SearchTerm::parse(Some("biology"), &mut errors),
        };

        assert!(UserFilter::default().matches(&user));
        assert!(by_major.matches(&user));
        assert!(!miss.matches(&user));
    }
}
