//! User Service
//!
//! Handles user accounts, profile updates and the aggregate profile view.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use crate::application::dto::{
    CreateUserRequest, Paginated, ProfileResponse, ProfileStats, UpdateUserRequest,
    UserQueryParams, UserResponse,
};
use crate::domain::value_objects::{check_image_url, PageMeta, PageRequest, SearchTerm};
use crate::domain::{
    normalize_email, ClubRepository, EventRepository, ListingRepository, PostRepository, User,
    UserFilter, UserPatch, UserRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{trim_field, FieldErrors};

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// List users, optionally filtered by a search term
    async fn list_users(&self, query: UserQueryParams) -> Result<Paginated<UserResponse>, UserError>;

    /// Create a new user
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserResponse, UserError>;

    /// Get user by ID
    async fn get_user(&self, user_id: i64) -> Result<UserResponse, UserError>;

    /// Get user with derived activity counts
    async fn get_profile(&self, user_id: i64) -> Result<ProfileResponse, UserError>;

    /// Update allow-listed profile fields
    async fn update_user(
        &self,
        user_id: i64,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, UserError>;

    /// Delete user account. References in other documents are left in place.
    async fn delete_user(&self, user_id: i64) -> Result<(), UserError>;
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("A user with this email already exists")]
    EmailTaken,

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::NotFound => AppError::NotFound(e.to_string()),
            UserError::EmailTaken => AppError::Conflict(e.to_string()),
            UserError::App(inner) => inner,
        }
    }
}

/// UserService implementation
pub struct UserServiceImpl {
    user_repo: Arc<dyn UserRepository>,
    event_repo: Arc<dyn EventRepository>,
    club_repo: Arc<dyn ClubRepository>,
    listing_repo: Arc<dyn ListingRepository>,
    post_repo: Arc<dyn PostRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl UserServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        event_repo: Arc<dyn EventRepository>,
        club_repo: Arc<dyn ClubRepository>,
        listing_repo: Arc<dyn ListingRepository>,
        post_repo: Arc<dyn PostRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            user_repo,
            event_repo,
            club_repo,
            listing_repo,
            post_repo,
            id_generator,
        }
    }

    async fn find_user(&self, user_id: i64) -> Result<User, UserError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound)
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn list_users(&self, query: UserQueryParams) -> Result<Paginated<UserResponse>, UserError> {
        let mut errors = FieldErrors::new();
        let page = PageRequest::parse(query.page, query.limit, &mut errors);
        let filter = UserFilter {
            search: SearchTerm::parse(query.search.as_deref(), &mut errors),
        };
        errors.into_result()?;

        let result = self.user_repo.search(&filter, page).await?;

        Ok(Paginated {
            pagination: PageMeta::new(page, result.total),
            items: result.items.into_iter().map(UserResponse::from).collect(),
        })
    }

    async fn create_user(&self, mut request: CreateUserRequest) -> Result<UserResponse, UserError> {
        request.email = request.email.as_deref().map(normalize_email);
        trim_field(&mut request.name);

        let mut errors = FieldErrors::from_validator(request.validate());
        if let Some(url) = &request.profile_picture_url {
            check_image_url("profilePictureUrl", url, &mut errors);
        }
        errors.into_result()?;

        let (Some(name), Some(email)) = (request.name, request.email) else {
            return Err(AppError::Internal("validated user request is incomplete".into()).into());
        };

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let now = Utc::now();
        let user = User {
            id: self.id_generator.generate(),
            name,
            email,
            bio: request.bio,
            major: request.major,
            profile_picture_url: request.profile_picture_url,
            push_token: request.push_token,
            created_at: now,
            updated_at: now,
        };

        let created = self.user_repo.create(&user).await?;
        tracing::info!(user_id = created.id, "User created");

        Ok(UserResponse::from(created))
    }

    async fn get_user(&self, user_id: i64) -> Result<UserResponse, UserError> {
        Ok(UserResponse::from(self.find_user(user_id).await?))
    }

    async fn get_profile(&self, user_id: i64) -> Result<ProfileResponse, UserError> {
        let user = self.find_user(user_id).await?;

        let (club_count, officer_count, events_hosted, events_attending, active_listings, post_count) =
            futures::try_join!(
                self.club_repo.count_memberships(user_id),
                self.club_repo.count_officer_positions(user_id),
                self.event_repo.count_hosted(user_id),
                self.event_repo.count_attending(user_id),
                self.listing_repo.count_active(user_id),
                self.post_repo.count_by_author(user_id),
            )?;

        Ok(ProfileResponse {
            user: UserResponse::from(user),
            stats: ProfileStats {
                club_count,
                officer_count,
                events_hosted,
                events_attending,
                active_listings,
                post_count,
            },
        })
    }

    async fn update_user(
        &self,
        user_id: i64,
        mut request: UpdateUserRequest,
    ) -> Result<UserResponse, UserError> {
        trim_field(&mut request.name);
        let mut errors = FieldErrors::from_validator(request.validate());
        if let Some(url) = &request.profile_picture_url {
            check_image_url("profilePictureUrl", url, &mut errors);
        }
        errors.into_result()?;

        let mut user = self.find_user(user_id).await?;
        user.apply_patch(UserPatch {
            name: request.name,
            bio: request.bio,
            major: request.major,
            profile_picture_url: request.profile_picture_url,
            push_token: request.push_token,
        });
        user.updated_at = Utc::now();

        let updated = self.user_repo.update(&user).await?;
        Ok(UserResponse::from(updated))
    }

    async fn delete_user(&self, user_id: i64) -> Result<(), UserError> {
        self.find_user(user_id).await?;
        self.user_repo.delete(user_id).await?;
        tracing::info!(user_id, "User deleted");
        Ok(())
    }
}
