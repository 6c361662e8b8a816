//! # Domain Entities
//!
//! Core domain entities of the campus app. Every entity is one stored
//! document; references between documents are plain IDs with no ownership.
//!
//! ## Entities
//!
//! - **User**: Student account and public profile
//! - **Event**: Hosted event with an attendee set
//! - **Club**: Club with member and officer sets (officers ⊆ members)
//! - **Listing**: Marketplace item with price, category and availability
//! - **Post**: Feed post with a like set and embedded comments
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle.

mod club;
mod event;
mod listing;
mod post;
mod user;

pub use user::{normalize_email, User, UserFilter, UserPatch, UserRepository, USER_BIO_MAX, USER_NAME_MAX};

pub use event::{
    check_schedule, check_starts_in_future, Event, EventFilter, EventPatch, EventRepository,
    SortOrder, EVENT_DESCRIPTION_MAX, EVENT_TITLE_MAX, EVENT_TITLE_MIN,
};

pub use club::{
    check_roster, dedup_ids, officers_are_members, Club, ClubFilter, ClubPatch, ClubRepository,
    CLUB_DESCRIPTION_MAX, CLUB_NAME_MAX, CLUB_NAME_MIN,
};

pub use listing::{
    check_images, check_price, Listing, ListingCategory, ListingFilter, ListingPatch,
    ListingRepository, LISTING_DESCRIPTION_MAX, LISTING_TITLE_MAX, LISTING_TITLE_MIN,
    MAX_LISTING_IMAGES,
};

pub use post::{
    Comment, Post, PostFilter, PostPatch, PostRepository, COMMENT_CONTENT_MAX, POST_CONTENT_MAX,
};

#[cfg(test)]
pub use club::MockClubRepository;
#[cfg(test)]
pub use event::MockEventRepository;
#[cfg(test)]
pub use listing::MockListingRepository;
#[cfg(test)]
pub use post::MockPostRepository;
#[cfg(test)]
pub use user::MockUserRepository;
