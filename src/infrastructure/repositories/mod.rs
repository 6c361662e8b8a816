//! Repository Implementations
//!
//! PostgreSQL implementations of the domain repository traits, plus the
//! [`Repositories`] bundle that hands one implementation of each trait to
//! the application services.
//!
//! ## Available Repositories
//!
//! - **UserRepository** - Accounts, email lookup, batch lookup for expansion
//! - **EventRepository** - Events and the attendee set
//! - **ClubRepository** - Clubs with member and officer sets
//! - **ListingRepository** - Marketplace listings
//! - **PostRepository** - Posts with likes and embedded comments
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use campus_hub::infrastructure::repositories::Repositories;
//!
//! let repos = Repositories::postgres(pool);
//! let user = repos.users.find_by_id(id).await?;
//! ```

pub mod club_repository;
pub mod event_repository;
pub mod listing_repository;
pub mod post_repository;
pub mod user_repository;

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::{
    ClubRepository, EventRepository, ListingRepository, PostRepository, UserRepository,
};
use crate::infrastructure::memory::{
    MemoryClubRepository, MemoryEventRepository, MemoryListingRepository, MemoryPostRepository,
    MemoryUserRepository,
};

pub use club_repository::PgClubRepository;
pub use event_repository::PgEventRepository;
pub use listing_repository::PgListingRepository;
pub use post_repository::PgPostRepository;
pub use user_repository::PgUserRepository;

/// One implementation of every repository trait, shared by all handlers.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub clubs: Arc<dyn ClubRepository>,
    pub listings: Arc<dyn ListingRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Repositories {
    /// Repositories backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            events: Arc::new(PgEventRepository::new(pool.clone())),
            clubs: Arc::new(PgClubRepository::new(pool.clone())),
            listings: Arc::new(PgListingRepository::new(pool.clone())),
            posts: Arc::new(PgPostRepository::new(pool)),
        }
    }

    /// Fresh, empty process-local repositories
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::default()),
            events: Arc::new(MemoryEventRepository::default()),
            clubs: Arc::new(MemoryClubRepository::default()),
            listings: Arc::new(MemoryListingRepository::default()),
            posts: Arc::new(MemoryPostRepository::default()),
        }
    }
}
