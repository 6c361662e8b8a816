//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **UserService**: Accounts, search and the aggregate profile view
//! - **EventService**: Events and attendance
//! - **ClubService**: Clubs, membership and officers
//! - **ListingService**: Marketplace listings and availability
//! - **PostService**: Feed posts, likes and comments
//! - **UploadService**: Signed media upload authorizations
//!
//! Every service validates its whole request before touching the store and
//! expands user references through [`population::UserDirectory`].

pub mod population;

pub mod club_service;
pub mod event_service;
pub mod listing_service;
pub mod post_service;
pub mod upload_service;
pub mod user_service;

pub use club_service::{ClubError, ClubService, ClubServiceImpl};
pub use event_service::{EventError, EventService, EventServiceImpl};
pub use listing_service::{ListingError, ListingService, ListingServiceImpl};
pub use post_service::{PostError, PostService, PostServiceImpl};
pub use upload_service::{UploadError, UploadService, UploadServiceImpl};
pub use user_service::{UserError, UserService, UserServiceImpl};
