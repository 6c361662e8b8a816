//! Club entity and repository trait.
//!
//! Maps to the `clubs` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::services::effects::{Document, Effect, SetField};
use crate::domain::value_objects::{Page, PageRequest, SearchTerm};
use crate::shared::error::AppError;
use crate::shared::validation::FieldErrors;

pub const CLUB_NAME_MIN: u64 = 3;
pub const CLUB_NAME_MAX: u64 = 100;
pub const CLUB_DESCRIPTION_MAX: u64 = 1000;

/// A student club.
///
/// Maps to the `clubs` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - name: VARCHAR(100) NOT NULL, unique on lower(name)
/// - description: TEXT NULL
/// - members: BIGINT[] NOT NULL DEFAULT '{}'
/// - officers: BIGINT[] NOT NULL DEFAULT '{}', CHECK (officers <@ members)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<i64>,

    /// Always a subset of `members`
    pub officers: Vec<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Club {
    pub fn is_member(&self, user_id: i64) -> bool {
        self.members.contains(&user_id)
    }

    pub fn is_officer(&self, user_id: i64) -> bool {
        self.officers.contains(&user_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether every officer is also a member.
    pub fn roster_is_consistent(&self) -> bool {
        officers_are_members(&self.members, &self.officers)
    }
}

impl Document for Club {
    const KIND: &'static str = "club";

    fn set_mut(&mut self, field: SetField) -> Option<&mut Vec<i64>> {
        match field {
            SetField::Members => Some(&mut self.members),
            SetField::Officers => Some(&mut self.officers),
            _ => None,
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

pub fn officers_are_members(members: &[i64], officers: &[i64]) -> bool {
    officers.iter().all(|officer| members.contains(officer))
}

/// Drop repeated IDs, keeping first occurrence order.
pub fn dedup_ids(ids: Vec<i64>) -> Vec<i64> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Initial roster check for club creation: officers must be members.
pub fn check_roster(members: &[i64], officers: &[i64], errors: &mut FieldErrors) {
    let strays: Vec<String> = officers
        .iter()
        .filter(|o| !members.contains(o))
        .map(|o| o.to_string())
        .collect();
    if !strays.is_empty() {
        errors.add("officers", "Every officer must also be a member", strays);
    }
}

/// The club fields that may be changed after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClubPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Filter for club listings.
#[derive(Debug, Clone, Default)]
pub struct ClubFilter {
    /// Matches name or description
    pub search: Option<SearchTerm>,
    pub member_id: Option<i64>,
}

impl ClubFilter {
    pub fn matches(&self, club: &Club) -> bool {
        self.search.as_ref().map_or(true, |s| {
            s.matches_any([Some(club.name.as_str()), club.description.as_deref()])
        }) && self.member_id.map_or(true, |user| club.is_member(user))
    }
}

/// Repository trait for Club data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClubRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Club>, AppError>;

    /// Case-insensitive name lookup, used for the uniqueness check.
    async fn find_by_name(&self, name: &str) -> Result<Option<Club>, AppError>;

    /// Page through clubs matching `filter`, ordered by name.
    async fn search(&self, filter: &ClubFilter, page: PageRequest) -> Result<Page<Club>, AppError>;

    /// Create a club. A taken name is a `Conflict`.
    async fn create(&self, club: &Club) -> Result<Club, AppError>;

    /// Persist name and description of an existing club.
    async fn update(&self, club: &Club) -> Result<Club, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Atomically apply roster effects to one club.
    async fn apply(&self, id: i64, effects: &[Effect]) -> Result<Club, AppError>;

    async fn count_memberships(&self, user_id: i64) -> Result<u64, AppError>;

    async fn count_officer_positions(&self, user_id: i64) -> Result<u64, AppError>;
}
