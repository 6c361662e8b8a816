//! Relationship mutators.
//!
//! Each mutator inspects the current document, checks its preconditions and
//! returns the effects to apply. Nothing here touches storage; repositories
//! apply the effects atomically and re-check set guards under the lock.

use chrono::{DateTime, Utc};

use super::effects::{Effect, EffectError, SetField};
use crate::domain::entities::{Club, Comment, Event, Listing, Post, COMMENT_CONTENT_MAX};
use crate::shared::error::AppError;

/// Why a relationship change was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("Event has already started")]
    EventStarted,

    #[error("The host is already attending their own event")]
    HostCannotAttend,

    #[error("User is already attending this event")]
    AlreadyAttending,

    #[error("User is already a member of this club")]
    AlreadyMember,

    #[error("User is not a member of this club")]
    NotMember,

    #[error("Comment content cannot be empty")]
    EmptyComment,

    #[error("Comment cannot exceed 500 characters")]
    CommentTooLong,

    #[error("Listing is already sold")]
    AlreadySold,

    #[error("Listing is already available")]
    AlreadyAvailable,
}

impl From<MutationError> for AppError {
    fn from(e: MutationError) -> Self {
        match e {
            MutationError::NotMember => AppError::NotFound(e.to_string()),
            MutationError::EmptyComment | MutationError::CommentTooLong => {
                AppError::invalid_field("content", e.to_string())
            }
            _ => AppError::Conflict(e.to_string()),
        }
    }
}

impl From<EffectError> for AppError {
    fn from(e: EffectError) -> Self {
        match e {
            EffectError::Duplicate { field, .. } => AppError::Conflict(match field {
                SetField::Attendees => MutationError::AlreadyAttending.to_string(),
                SetField::Members => MutationError::AlreadyMember.to_string(),
                _ => e.to_string(),
            }),
            EffectError::Absent { field, .. } => AppError::NotFound(match field {
                SetField::Members => MutationError::NotMember.to_string(),
                _ => e.to_string(),
            }),
            EffectError::AvailabilityUnchanged { available } => AppError::Conflict(
                if available {
                    MutationError::AlreadyAvailable
                } else {
                    MutationError::AlreadySold
                }
                .to_string(),
            ),
            EffectError::Unsupported { .. } => AppError::Internal(e.to_string()),
        }
    }
}

// ============================================================================
// Events
// ============================================================================

pub fn attend_event(
    event: &Event,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Effect>, MutationError> {
    if event.has_started(now) {
        return Err(MutationError::EventStarted);
    }
    if event.is_host(user_id) {
        return Err(MutationError::HostCannotAttend);
    }
    if event.is_attendee(user_id) {
        return Err(MutationError::AlreadyAttending);
    }
    Ok(vec![Effect::add(SetField::Attendees, user_id)])
}

pub fn leave_event(_event: &Event, user_id: i64) -> Vec<Effect> {
    vec![Effect::remove(SetField::Attendees, user_id)]
}

// ============================================================================
// Clubs
// ============================================================================

pub fn join_club(club: &Club, user_id: i64) -> Result<Vec<Effect>, MutationError> {
    if club.is_member(user_id) {
        return Err(MutationError::AlreadyMember);
    }
    Ok(vec![Effect::add(SetField::Members, user_id)])
}

/// Leaving (or being removed) drops officer status too.
pub fn leave_club(club: &Club, user_id: i64) -> Result<Vec<Effect>, MutationError> {
    if !club.is_member(user_id) {
        return Err(MutationError::NotMember);
    }
    Ok(vec![
        Effect::remove(SetField::Officers, user_id),
        Effect::pull(SetField::Members, user_id),
    ])
}

/// Promote a user, enrolling them as a member first if needed.
pub fn add_officer(_club: &Club, user_id: i64) -> Vec<Effect> {
    vec![
        Effect::ensure(SetField::Members, user_id),
        Effect::ensure(SetField::Officers, user_id),
    ]
}

pub fn remove_officer(_club: &Club, user_id: i64) -> Vec<Effect> {
    vec![Effect::remove(SetField::Officers, user_id)]
}

// ============================================================================
// Posts
// ============================================================================

/// Like when absent, unlike when present. The direction is settled against
/// the locked document, so read `is_liked_by` on the stored result.
pub fn toggle_like(_post: &Post, user_id: i64) -> Vec<Effect> {
    vec![Effect::toggle(SetField::Likes, user_id)]
}

pub fn add_comment(
    _post: &Post,
    author_id: i64,
    content: &str,
    comment_id: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Effect>, MutationError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(MutationError::EmptyComment);
    }
    if content.chars().count() > COMMENT_CONTENT_MAX {
        return Err(MutationError::CommentTooLong);
    }
    Ok(vec![Effect::PushComment(Comment {
        id: comment_id,
        author_id,
        content: content.to_string(),
        created_at: now,
    })])
}

pub fn remove_comment(_post: &Post, comment_id: i64) -> Vec<Effect> {
    vec![Effect::PullComment(comment_id)]
}

// ============================================================================
// Listings
// ============================================================================

pub fn set_availability(listing: &Listing, available: bool) -> Result<Vec<Effect>, MutationError> {
    match (listing.is_available, available) {
        (false, false) => return Err(MutationError::AlreadySold),
        (true, true) => return Err(MutationError::AlreadyAvailable),
        _ => {}
    }
    Ok(vec![Effect::SetAvailability(available)])
}
