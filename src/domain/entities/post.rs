//! Post entity, embedded comments and repository trait.
//!
//! Maps to the `posts` table in the database schema. Comments live inside
//! the post document as a JSONB array.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::services::effects::{Document, Effect, SetField};
use crate::domain::value_objects::{Page, PageRequest, SearchTerm};
use crate::shared::error::AppError;

pub const POST_CONTENT_MAX: u64 = 2000;
pub const COMMENT_CONTENT_MAX: usize = 500;

/// A comment embedded in a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Snowflake ID, unique across all comments
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A feed post.
///
/// Maps to the `posts` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - content: VARCHAR(2000) NOT NULL
/// - author_id: BIGINT NOT NULL (weak reference to users)
/// - image_url: TEXT NULL
/// - likes: BIGINT[] NOT NULL DEFAULT '{}'
/// - comments: JSONB NOT NULL DEFAULT '[]'
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    pub image_url: Option<String>,

    /// Users who liked the post, without duplicates
    pub likes: Vec<i64>,

    /// Comments in the order they were added
    pub comments: Vec<Comment>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn is_liked_by(&self, user_id: i64) -> bool {
        self.likes.contains(&user_id)
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    pub fn find_comment(&self, comment_id: i64) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn apply_patch(&mut self, patch: PostPatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }
    }
}

impl Document for Post {
    const KIND: &'static str = "post";

    fn set_mut(&mut self, field: SetField) -> Option<&mut Vec<i64>> {
        match field {
            SetField::Likes => Some(&mut self.likes),
            _ => None,
        }
    }

    fn comments_mut(&mut self) -> Option<&mut Vec<Comment>> {
        Some(&mut self.comments)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPatch {
    pub content: Option<String>,
    pub image_url: Option<String>,
}

/// Filter for the post feed.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Matches post content
    pub search: Option<SearchTerm>,
    pub author_id: Option<i64>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        self.search
            .as_ref()
            .map_or(true, |s| s.matches_any([Some(post.content.as_str())]))
            && self.author_id.map_or(true, |a| post.author_id == a)
    }
}

/// Repository trait for Post data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError>;

    /// Page through posts matching `filter`, newest first.
    async fn search(&self, filter: &PostFilter, page: PageRequest) -> Result<Page<Post>, AppError>;

    async fn create(&self, post: &Post) -> Result<Post, AppError>;

    async fn update(&self, post: &Post) -> Result<Post, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Atomically apply like/comment effects to one post.
    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Post, AppError>;

    async fn count_by_author(&self, author_id: i64) -> Result<u64, AppError>;
}
