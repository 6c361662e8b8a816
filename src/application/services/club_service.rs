//! Club Service
//!
//! Handles clubs, membership and officer roster management.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use super::population::{club_refs, UserDirectory};
use crate::application::dto::{
    ClubQueryParams, ClubResponse, CreateClubRequest, Paginated, UpdateClubRequest,
    UserActionRequest,
};
use crate::domain::services::{add_officer, join_club, leave_club, remove_officer, MutationError};
use crate::domain::value_objects::{PageMeta, PageRequest, SearchTerm};
use crate::domain::{
    check_roster, dedup_ids, Club, ClubFilter, ClubPatch, ClubRepository, UserRepository,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;
use crate::shared::validation::{trim_field, FieldErrors};

/// Club service trait
#[async_trait]
pub trait ClubService: Send + Sync {
    async fn list_clubs(&self, query: ClubQueryParams) -> Result<Paginated<ClubResponse>, ClubError>;

    /// Create a club, optionally with an initial roster
    async fn create_club(&self, request: CreateClubRequest) -> Result<ClubResponse, ClubError>;

    async fn get_club(&self, club_id: i64) -> Result<ClubResponse, ClubError>;

    async fn update_club(
        &self,
        club_id: i64,
        request: UpdateClubRequest,
    ) -> Result<ClubResponse, ClubError>;

    async fn delete_club(&self, club_id: i64) -> Result<(), ClubError>;

    async fn join_club(&self, club_id: i64, request: UserActionRequest) -> Result<ClubResponse, ClubError>;

    /// Leave the club; also drops officer status
    async fn leave_club(&self, club_id: i64, request: UserActionRequest) -> Result<ClubResponse, ClubError>;

    /// Remove a member by ID; same rules as leaving
    async fn remove_member(&self, club_id: i64, user_id: i64) -> Result<ClubResponse, ClubError>;

    /// Make a user an officer, enrolling them as a member if needed
    async fn add_officer(&self, club_id: i64, request: UserActionRequest) -> Result<ClubResponse, ClubError>;

    async fn remove_officer(&self, club_id: i64, user_id: i64) -> Result<ClubResponse, ClubError>;
}

/// Club service errors
#[derive(Debug, thiserror::Error)]
pub enum ClubError {
    #[error("Club not found")]
    NotFound,

    #[error("A club with this name already exists")]
    NameTaken,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<ClubError> for AppError {
    fn from(e: ClubError) -> Self {
        match e {
            ClubError::NotFound | ClubError::UserNotFound => AppError::NotFound(e.to_string()),
            ClubError::NameTaken => AppError::Conflict(e.to_string()),
            ClubError::Mutation(m) => m.into(),
            ClubError::App(inner) => inner,
        }
    }
}

/// ClubService implementation
pub struct ClubServiceImpl {
    club_repo: Arc<dyn ClubRepository>,
    user_repo: Arc<dyn UserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl ClubServiceImpl {
    pub fn new(
        club_repo: Arc<dyn ClubRepository>,
        user_repo: Arc<dyn UserRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            club_repo,
            user_repo,
            id_generator,
        }
    }

    async fn find_club(&self, club_id: i64) -> Result<Club, ClubError> {
        self.club_repo
            .find_by_id(club_id)
            .await?
            .ok_or(ClubError::NotFound)
    }

    async fn expand(&self, club: Club) -> Result<ClubResponse, ClubError> {
        let directory = UserDirectory::load(&self.user_repo, club_refs(&club)).await?;
        Ok(directory.club(club))
    }

    async fn ensure_name_free(&self, name: &str, except: Option<i64>) -> Result<(), ClubError> {
        match self.club_repo.find_by_name(name).await? {
            Some(existing) if Some(existing.id) != except => Err(ClubError::NameTaken),
            _ => Ok(()),
        }
    }

    async fn ensure_user(&self, user_id: i64) -> Result<(), ClubError> {
        match self.user_repo.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ClubError::UserNotFound),
        }
    }

    async fn actor(&self, request: &UserActionRequest) -> Result<i64, ClubError> {
        let mut errors = FieldErrors::from_validator(request.validate());
        let user_id = request
            .user_id
            .as_deref()
            .and_then(|raw| errors.identifier("userId", raw));
        errors.into_result()?;

        let user_id = user_id.ok_or(ClubError::UserNotFound)?;
        self.ensure_user(user_id).await?;
        Ok(user_id)
    }

    async fn remove_from_club(&self, club_id: i64, user_id: i64, operation: &str) -> Result<ClubResponse, ClubError> {
        let club = self.find_club(club_id).await?;
        let effects = leave_club(&club, user_id).map_err(|e| {
            metrics::record_mutation("club", operation, "rejected");
            e
        })?;

        let updated = self.club_repo.apply(club_id, &effects).await.map_err(|e| {
            metrics::record_mutation("club", operation, "rejected");
            e
        })?;
        metrics::record_mutation("club", operation, "applied");
        tracing::info!(club_id, user_id, operation, "Member removed from club");

        self.expand(updated).await
    }
}

fn parse_roster(errors: &mut FieldErrors, field: &str, raw: &[String]) -> Vec<i64> {
    let ids = raw
        .iter()
        .enumerate()
        .filter_map(|(i, id)| errors.identifier(&format!("{}[{}]", field, i), id))
        .collect();
    dedup_ids(ids)
}

#[async_trait]
impl ClubService for ClubServiceImpl {
    async fn list_clubs(&self, query: ClubQueryParams) -> Result<Paginated<ClubResponse>, ClubError> {
        let mut errors = FieldErrors::new();
        let page = PageRequest::parse(query.page, query.limit, &mut errors);
        let filter = ClubFilter {
            search: SearchTerm::parse(query.search.as_deref(), &mut errors),
            member_id: query
                .member
                .as_deref()
                .and_then(|raw| errors.identifier("member", raw)),
        };
        errors.into_result()?;

        let result = self.club_repo.search(&filter, page).await?;
        let directory = UserDirectory::load(
            &self.user_repo,
            result.items.iter().flat_map(|c| club_refs(c)).collect::<Vec<_>>(),
        )
        .await?;

        Ok(Paginated {
            pagination: PageMeta::new(page, result.total),
            items: result.items.into_iter().map(|c| directory.club(c)).collect(),
        })
    }

    async fn create_club(&self, mut request: CreateClubRequest) -> Result<ClubResponse, ClubError> {
        trim_field(&mut request.name);
        let mut errors = FieldErrors::from_validator(request.validate());
        let members = parse_roster(&mut errors, "members", &request.members);
        let officers = parse_roster(&mut errors, "officers", &request.officers);
        check_roster(&members, &officers, &mut errors);
        errors.into_result()?;

        let Some(name) = request.name else {
            return Err(AppError::Internal("validated club request is incomplete".into()).into());
        };

        self.ensure_name_free(&name, None).await?;

        if !members.is_empty() {
            let found = self.user_repo.find_many(&members).await?;
            if found.len() != members.len() {
                return Err(ClubError::UserNotFound);
            }
        }

        let now = Utc::now();
        let club = Club {
            id: self.id_generator.generate(),
            name,
            description: request.description,
            members,
            officers,
            created_at: now,
            updated_at: now,
        };

        let created = self.club_repo.create(&club).await?;
        tracing::info!(club_id = created.id, name = %created.name, "Club created");

        self.expand(created).await
    }

    async fn get_club(&self, club_id: i64) -> Result<ClubResponse, ClubError> {
        let club = self.find_club(club_id).await?;
        self.expand(club).await
    }

    async fn update_club(
        &self,
        club_id: i64,
        mut request: UpdateClubRequest,
    ) -> Result<ClubResponse, ClubError> {
        trim_field(&mut request.name);
        FieldErrors::from_validator(request.validate()).into_result()?;

        let mut club = self.find_club(club_id).await?;
        let patch = ClubPatch {
            name: request.name,
            description: request.description,
        };

        if let Some(name) = &patch.name {
            self.ensure_name_free(name, Some(club_id)).await?;
            club.name = name.clone();
        }
        if let Some(description) = patch.description {
            club.description = Some(description);
        }
        club.updated_at = Utc::now();

        let updated = self.club_repo.update(&club).await?;
        self.expand(updated).await
    }

    async fn delete_club(&self, club_id: i64) -> Result<(), ClubError> {
        self.find_club(club_id).await?;
        self.club_repo.delete(club_id).await?;
        tracing::info!(club_id, "Club deleted");
        Ok(())
    }

    async fn join_club(&self, club_id: i64, request: UserActionRequest) -> Result<ClubResponse, ClubError> {
        let club = self.find_club(club_id).await?;
        let user_id = self.actor(&request).await?;

        let effects = join_club(&club, user_id).map_err(|e| {
            metrics::record_mutation("club", "join", "rejected");
            e
        })?;
        let updated = self.club_repo.apply(club_id, &effects).await.map_err(|e| {
            metrics::record_mutation("club", "join", "rejected");
            e
        })?;
        metrics::record_mutation("club", "join", "applied");
        tracing::info!(club_id, user_id, "User joined club");

        self.expand(updated).await
    }

    async fn leave_club(&self, club_id: i64, request: UserActionRequest) -> Result<ClubResponse, ClubError> {
        let user_id = self.actor(&request).await?;
        self.remove_from_club(club_id, user_id, "leave").await
    }

    async fn remove_member(&self, club_id: i64, user_id: i64) -> Result<ClubResponse, ClubError> {
        self.remove_from_club(club_id, user_id, "remove_member").await
    }

    async fn add_officer(&self, club_id: i64, request: UserActionRequest) -> Result<ClubResponse, ClubError> {
        let club = self.find_club(club_id).await?;
        let user_id = self.actor(&request).await?;

        let outcome = if club.is_officer(user_id) { "noop" } else { "applied" };
        let updated = self
            .club_repo
            .apply(club_id, &add_officer(&club, user_id))
            .await?;
        metrics::record_mutation("club", "add_officer", outcome);
        tracing::info!(club_id, user_id, "Officer added");

        self.expand(updated).await
    }

    async fn remove_officer(&self, club_id: i64, user_id: i64) -> Result<ClubResponse, ClubError> {
        let club = self.find_club(club_id).await?;

        let outcome = if club.is_officer(user_id) { "applied" } else { "noop" };
        let updated = self
            .club_repo
            .apply(club_id, &remove_officer(&club, user_id))
            .await?;
        metrics::record_mutation("club", "remove_officer", outcome);

        self.expand(updated).await
    }
}
