//! Reference expansion.
//!
//! Replaces user IDs with the public user projection. Users are loaded in one
//! batch per response. A reference to a deleted user is tolerated: a single
//! reference becomes `None`, and missing set members are left out.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::dto::{
    ClubResponse, CommentResponse, EventResponse, ListingResponse, PostResponse, UserSummary,
};
use crate::domain::{Club, Event, Listing, Post, UserRepository};
use crate::shared::error::AppError;

/// Users referenced by a batch of documents, keyed by ID.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: HashMap<i64, UserSummary>,
}

impl UserDirectory {
    /// Load every user among `ids` with a single repository call.
    pub async fn load(
        repo: &Arc<dyn UserRepository>,
        ids: impl IntoIterator<Item = i64>,
    ) -> Result<Self, AppError> {
        let mut wanted: Vec<i64> = ids.into_iter().collect();
        wanted.sort_unstable();
        wanted.dedup();

        if wanted.is_empty() {
            return Ok(Self::default());
        }

        let users = repo.find_many(&wanted).await?;
        if users.len() < wanted.len() {
            tracing::debug!(
                requested = wanted.len(),
                found = users.len(),
                "Expanding references to deleted users"
            );
        }

        Ok(Self {
            users: users.iter().map(|u| (u.id, UserSummary::from(u))).collect(),
        })
    }

    pub fn one(&self, id: i64) -> Option<UserSummary> {
        self.users.get(&id).cloned()
    }

    /// Expand a reference set, keeping order and dropping unknown users.
    pub fn many(&self, ids: &[i64]) -> Vec<UserSummary> {
        ids.iter().filter_map(|id| self.one(*id)).collect()
    }

    pub fn event(&self, event: Event) -> EventResponse {
        let host = self.one(event.host_id);
        let attendees = self.many(&event.attendees);
        EventResponse::new(event, host, attendees)
    }

    pub fn club(&self, club: Club) -> ClubResponse {
        let members = self.many(&club.members);
        let officers = self.many(&club.officers);
        ClubResponse::new(club, members, officers)
    }

    pub fn listing(&self, listing: Listing) -> ListingResponse {
        let seller = self.one(listing.seller_id);
        ListingResponse::new(listing, seller)
    }

    pub fn post(&self, mut post: Post) -> PostResponse {
        let author = self.one(post.author_id);
        let comments = std::mem::take(&mut post.comments)
            .into_iter()
            .map(|c| {
                let author = self.one(c.author_id);
                CommentResponse::new(c, author)
            })
            .collect();
        PostResponse::new(post, author, comments)
    }
}

/// User IDs referenced by an event.
pub fn event_refs(event: &Event) -> impl Iterator<Item = i64> + '_ {
    std::iter::once(event.host_id).chain(event.attendees.iter().copied())
}

pub fn club_refs(club: &Club) -> impl Iterator<Item = i64> + '_ {
    club.members.iter().chain(club.officers.iter()).copied()
}

pub fn post_refs(post: &Post) -> impl Iterator<Item = i64> + '_ {
    std::iter::once(post.author_id).chain(post.comments.iter().map(|c| c.author_id))
}
