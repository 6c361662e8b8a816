//! Post Service
//!
//! Handles the post feed, likes and embedded comments.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use super::population::{post_refs, UserDirectory};
use crate::application::dto::{
    CreateCommentRequest, CreatePostRequest, LikeResponse, Paginated, PostQueryParams,
    PostResponse, UpdatePostRequest, UserActionRequest,
};
use crate::domain::services::{add_comment, remove_comment, toggle_like, MutationError};
use crate::domain::value_objects::{check_image_url, PageMeta, PageRequest, SearchTerm};
use crate::domain::{Post, PostFilter, PostPatch, PostRepository, UserRepository};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{trim_field, FieldErrors};

/// Post service trait
#[async_trait]
pub trait PostService: Send + Sync {
    async fn list_posts(&self, query: PostQueryParams) -> Result<Paginated<PostResponse>, PostError>;

    async fn create_post(&self, request: CreatePostRequest) -> Result<PostResponse, PostError>;

    async fn get_post(&self, post_id: i64) -> Result<PostResponse, PostError>;

    async fn update_post(&self, post_id: i64, request: UpdatePostRequest) -> Result<PostResponse, PostError>;

    async fn delete_post(&self, post_id: i64) -> Result<(), PostError>;

    /// Like when absent, unlike when present
    async fn toggle_like(&self, post_id: i64, request: UserActionRequest) -> Result<LikeResponse, PostError>;

    async fn add_comment(
        &self,
        post_id: i64,
        request: CreateCommentRequest,
    ) -> Result<PostResponse, PostError>;

    /// Remove one comment; an unknown comment id changes nothing
    async fn remove_comment(&self, post_id: i64, comment_id: i64) -> Result<PostResponse, PostError>;
}

/// Post service errors
#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Author not found")]
    AuthorNotFound,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<PostError> for AppError {
    fn from(e: PostError) -> Self {
        match e {
            PostError::NotFound | PostError::AuthorNotFound | PostError::UserNotFound => {
                AppError::NotFound(e.to_string())
            }
            PostError::Mutation(m) => m.into(),
            PostError::App(inner) => inner,
        }
    }
}

/// PostService implementation
pub struct PostServiceImpl {
    post_repo: Arc<dyn PostRepository>,
    user_repo: Arc<dyn UserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl PostServiceImpl {
    pub fn new(
        post_repo: Arc<dyn PostRepository>,
        user_repo: Arc<dyn UserRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            id_generator,
        }
    }

    async fn find_post(&self, post_id: i64) -> Result<Post, PostError> {
        self.post_repo
            .find_by_id(post_id)
            .await?
            .ok_or(PostError::NotFound)
    }

    async fn expand(&self, post: Post) -> Result<PostResponse, PostError> {
        let directory = UserDirectory::load(&self.user_repo, post_refs(&post)).await?;
        Ok(directory.post(post))
    }

    async fn ensure_user(&self, user_id: i64) -> Result<(), PostError> {
        match self.user_repo.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(PostError::UserNotFound),
        }
    }
}

#[async_trait]
impl PostService for PostServiceImpl {
    async fn list_posts(&self, query: PostQueryParams) -> Result<Paginated<PostResponse>, PostError> {
        let mut errors = FieldErrors::new();
        let page = PageRequest::parse(query.page, query.limit, &mut errors);
        let search = SearchTerm::parse(query.search.as_deref(), &mut errors);
        let author_id = query
            .author
            .as_deref()
            .and_then(|raw| errors.identifier("author", raw));
        errors.into_result()?;

        let filter = PostFilter { search, author_id };
        let result = self.post_repo.search(&filter, page).await?;
        let directory = UserDirectory::load(
            &self.user_repo,
            result.items.iter().flat_map(|p| post_refs(p)).collect::<Vec<_>>(),
        )
        .await?;

        Ok(Paginated {
            pagination: PageMeta::new(page, result.total),
            items: result.items.into_iter().map(|p| directory.post(p)).collect(),
        })
    }

    async fn create_post(&self, mut request: CreatePostRequest) -> Result<PostResponse, PostError> {
        trim_field(&mut request.content);
        let mut errors = FieldErrors::from_validator(request.validate());
        if let Some(url) = request.image_url.as_deref() {
            check_image_url("imageUrl", url, &mut errors);
        }
        let author_id = request
            .author_id
            .as_deref()
            .and_then(|raw| errors.identifier("authorId", raw));
        errors.into_result()?;

        let (Some(content), Some(author_id)) = (request.content, author_id) else {
            return Err(AppError::Internal("validated post request is incomplete".into()).into());
        };

        if self.user_repo.find_by_id(author_id).await?.is_none() {
            return Err(PostError::AuthorNotFound);
        }

        let now = Utc::now();
        let post = Post {
            id: self.id_generator.generate(),
            content,
            author_id,
            image_url: request.image_url,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let created = self.post_repo.create(&post).await?;
        tracing::info!(post_id = created.id, author_id, "Post created");

        self.expand(created).await
    }

    async fn get_post(&self, post_id: i64) -> Result<PostResponse, PostError> {
        let post = self.find_post(post_id).await?;
        self.expand(post).await
    }

    async fn update_post(&self, post_id: i64, mut request: UpdatePostRequest) -> Result<PostResponse, PostError> {
        trim_field(&mut request.content);
        let mut errors = FieldErrors::from_validator(request.validate());
        if let Some(url) = request.image_url.as_deref() {
            check_image_url("imageUrl", url, &mut errors);
        }
        errors.into_result()?;

        let mut post = self.find_post(post_id).await?;
        post.apply_patch(PostPatch {
            content: request.content,
            image_url: request.image_url,
        });
        post.updated_at = Utc::now();

        let updated = self.post_repo.update(&post).await?;
        self.expand(updated).await
    }

    async fn delete_post(&self, post_id: i64) -> Result<(), PostError> {
        self.find_post(post_id).await?;
        self.post_repo.delete(post_id).await?;
        tracing::info!(post_id, "Post deleted");
        Ok(())
    }

    async fn toggle_like(&self, post_id: i64, request: UserActionRequest) -> Result<LikeResponse, PostError> {
        let mut errors = FieldErrors::from_validator(request.validate());
        let user_id = request
            .user_id
            .as_deref()
            .and_then(|raw| errors.identifier("userId", raw));
        errors.into_result()?;
        let user_id = user_id.ok_or(PostError::UserNotFound)?;

        let post = self.find_post(post_id).await?;
        self.ensure_user(user_id).await?;

        let updated = self
            .post_repo
            .apply(post_id, &toggle_like(&post, user_id))
            .await?;
        let liked = updated.is_liked_by(user_id);
        let operation = if liked { "like" } else { "unlike" };
        metrics::record_mutation("post", operation, "applied");

        Ok(LikeResponse {
            liked,
            like_count: updated.like_count(),
        })
    }

    async fn add_comment(
        &self,
        post_id: i64,
        request: CreateCommentRequest,
    ) -> Result<PostResponse, PostError> {
        let mut errors = FieldErrors::from_validator(request.validate());
        let user_id = request
            .user_id
            .as_deref()
            .and_then(|raw| errors.identifier("userId", raw));
        errors.into_result()?;

        let (Some(user_id), Some(content)) = (user_id, request.content) else {
            return Err(AppError::Internal("validated comment request is incomplete".into()).into());
        };

        let post = self.find_post(post_id).await?;
        let effects = add_comment(&post, user_id, &content, self.id_generator.generate(), Utc::now())
            .map_err(|e| {
                metrics::record_mutation("post", "comment", "rejected");
                e
            })?;
        self.ensure_user(user_id).await?;

        let updated = self.post_repo.apply(post_id, &effects).await?;
        metrics::record_mutation("post", "comment", "applied");
        tracing::info!(post_id, user_id, "Comment added");

        self.expand(updated).await
    }

    async fn remove_comment(&self, post_id: i64, comment_id: i64) -> Result<PostResponse, PostError> {
        let post = self.find_post(post_id).await?;
        let outcome = if post.find_comment(comment_id).is_some() { "applied" } else { "noop" };

        let updated = self
            .post_repo
            .apply(post_id, &remove_comment(&post, comment_id))
            .await?;
        metrics::record_mutation("post", "uncomment", outcome);

        self.expand(updated).await
    }
}
