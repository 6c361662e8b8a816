//! Document effects.
//!
//! Relationship mutators never write to the store themselves. They return a
//! list of [`Effect`]s, and a repository applies the whole list to one
//! document under that document's lock (row lock in Postgres, entry lock in
//! memory) using [`apply_effects`]. Set guards are re-checked there, so two
//! racing "attend" requests for the same user cannot both append.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::entities::Comment;

/// A reference-set field on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetField {
    Attendees,
    Members,
    Officers,
    Likes,
}

impl SetField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attendees => "attendees",
            Self::Members => "members",
            Self::Officers => "officers",
            Self::Likes => "likes",
        }
    }
}

impl fmt::Display for SetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to do when adding a user that is already in the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDuplicate {
    /// Fail the whole effect list with [`EffectError::Duplicate`].
    Reject,
    /// Leave the set unchanged.
    Ignore,
}

/// What to do when removing a user that is not in the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnAbsent {
    /// Fail the whole effect list with [`EffectError::Absent`].
    Reject,
    /// Leave the set unchanged.
    Ignore,
}

/// A single change to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AddToSet {
        field: SetField,
        user_id: i64,
        on_duplicate: OnDuplicate,
    },
    RemoveFromSet {
        field: SetField,
        user_id: i64,
        on_absent: OnAbsent,
    },
    /// Add when absent, remove when present, decided against the locked copy
    ToggleInSet {
        field: SetField,
        user_id: i64,
    },
    PushComment(Comment),
    PullComment(i64),
    /// Flip availability; already in the target state is an error
    SetAvailability(bool),
}

impl Effect {
    pub fn add(field: SetField, user_id: i64) -> Self {
        Self::AddToSet {
            field,
            user_id,
            on_duplicate: OnDuplicate::Reject,
        }
    }

    pub fn ensure(field: SetField, user_id: i64) -> Self {
        Self::AddToSet {
            field,
            user_id,
            on_duplicate: OnDuplicate::Ignore,
        }
    }

    pub fn remove(field: SetField, user_id: i64) -> Self {
        Self::RemoveFromSet {
            field,
            user_id,
            on_absent: OnAbsent::Ignore,
        }
    }

    /// Remove a user that must currently be in the set.
    pub fn pull(field: SetField, user_id: i64) -> Self {
        Self::RemoveFromSet {
            field,
            user_id,
            on_absent: OnAbsent::Reject,
        }
    }

    pub fn toggle(field: SetField, user_id: i64) -> Self {
        Self::ToggleInSet { field, user_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("User {user_id} is already in {field}")]
    Duplicate { field: SetField, user_id: i64 },

    #[error("User {user_id} is not in {field}")]
    Absent { field: SetField, user_id: i64 },

    #[error("Availability is already {available}")]
    AvailabilityUnchanged { available: bool },

    #[error("{kind} documents do not support {effect}")]
    Unsupported {
        kind: &'static str,
        effect: &'static str,
    },
}

/// A stored document that relationship effects can be applied to.
pub trait Document {
    const KIND: &'static str;

    fn set_mut(&mut self, field: SetField) -> Option<&mut Vec<i64>>;

    fn comments_mut(&mut self) -> Option<&mut Vec<Comment>> {
        None
    }

    fn availability_mut(&mut self) -> Option<&mut bool> {
        None
    }

    fn touch(&mut self, now: DateTime<Utc>);
}

/// Apply `effects` in order. Returns whether anything changed.
///
/// On error the document may be partially modified; callers apply to a
/// scratch copy (or inside a transaction) and discard it on failure.
pub fn apply_effects<D: Document>(
    doc: &mut D,
    effects: &[Effect],
    now: DateTime<Utc>,
) -> Result<bool, EffectError> {
    let mut changed = false;

    for effect in effects {
        changed |= match effect {
            Effect::AddToSet {
                field,
                user_id,
                on_duplicate,
            } => {
                let set = doc.set_mut(*field).ok_or(EffectError::Unsupported {
                    kind: D::KIND,
                    effect: field.as_str(),
                })?;
                if set.contains(user_id) {
                    match on_duplicate {
                        OnDuplicate::Reject => {
                            return Err(EffectError::Duplicate {
                                field: *field,
                                user_id: *user_id,
                            })
                        }
                        OnDuplicate::Ignore => false,
                    }
                } else {
                    set.push(*user_id);
                    true
                }
            }
            Effect::RemoveFromSet {
                field,
                user_id,
                on_absent,
            } => {
                let set = doc.set_mut(*field).ok_or(EffectError::Unsupported {
                    kind: D::KIND,
                    effect: field.as_str(),
                })?;
                let before = set.len();
                set.retain(|id| id != user_id);
                if set.len() == before && *on_absent == OnAbsent::Reject {
                    return Err(EffectError::Absent {
                        field: *field,
                        user_id: *user_id,
                    });
                }
                set.len() != before
            }
            Effect::ToggleInSet { field, user_id } => {
                let set = doc.set_mut(*field).ok_or(EffectError::Unsupported {
                    kind: D::KIND,
                    effect: field.as_str(),
                })?;
                if set.contains(user_id) {
                    set.retain(|id| id != user_id);
                } else {
                    set.push(*user_id);
                }
                true
            }
            Effect::PushComment(comment) => {
                let comments = doc.comments_mut().ok_or(EffectError::Unsupported {
                    kind: D::KIND,
                    effect: "comments",
                })?;
                comments.push(comment.clone());
                true
            }
            Effect::PullComment(comment_id) => {
                let comments = doc.comments_mut().ok_or(EffectError::Unsupported {
                    kind: D::KIND,
                    effect: "comments",
                })?;
                let before = comments.len();
                comments.retain(|c| c.id != *comment_id);
                comments.len() != before
            }
            Effect::SetAvailability(available) => {
                let flag = doc.availability_mut().ok_or(EffectError::Unsupported {
                    kind: D::KIND,
                    effect: "availability",
                })?;
                if *flag == *available {
                    return Err(EffectError::AvailabilityUnchanged {
                        available: *available,
                    });
                }
                *flag = *available;
                true
            }
        };
    }

    if changed {
        doc.touch(now);
    }
    Ok(changed)
}
