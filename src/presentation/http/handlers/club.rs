//! Club Handlers
//!
//! Membership changes take the acting user from the body; removals of a
//! specific member or officer take it from the path.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    ClubQueryParams, CreateClubRequest, UpdateClubRequest, UserActionRequest,
};
use crate::application::dto::response::{ApiResponse, ClubResponse, Paginated};
use crate::application::services::ClubService;
use crate::presentation::http::extractors::{parse_id, ApiJson, ApiQuery};
use crate::shared::error::AppError;
use crate::startup::AppState;

pub async fn list_clubs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ClubQueryParams>,
) -> Result<Json<ApiResponse<Paginated<ClubResponse>>>, AppError> {
    let page = state.club_service().list_clubs(query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn create_club(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateClubRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClubResponse>>), AppError> {
    let club = state.club_service().create_club(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(club, "Club created")),
    ))
}

pub async fn get_club(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
) -> Result<Json<ApiResponse<ClubResponse>>, AppError> {
    let club_id = parse_id(&club_id, "Club")?;
    let club = state.club_service().get_club(club_id).await?;
    Ok(Json(ApiResponse::ok(club)))
}

pub async fn update_club(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
    ApiJson(body): ApiJson<UpdateClubRequest>,
) -> Result<Json<ApiResponse<ClubResponse>>, AppError> {
    let club_id = parse_id(&club_id, "Club")?;
    let club = state.club_service().update_club(club_id, body).await?;
    Ok(Json(ApiResponse::with_message(club, "Club updated")))
}

pub async fn delete_club(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let club_id = parse_id(&club_id, "Club")?;
    state.club_service().delete_club(club_id).await?;
    Ok(Json(ApiResponse::message("Club deleted")))
}

pub async fn join_club(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
    ApiJson(body): ApiJson<UserActionRequest>,
) -> Result<Json<ApiResponse<ClubResponse>>, AppError> {
    let club_id = parse_id(&club_id, "Club")?;
    let club = state.club_service().join_club(club_id, body).await?;
    Ok(Json(ApiResponse::with_message(club, "Joined club")))
}

pub async fn leave_club(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
    ApiJson(body): ApiJson<UserActionRequest>,
) -> Result<Json<ApiResponse<ClubResponse>>, AppError> {
    let club_id = parse_id(&club_id, "Club")?;
    let club = state.club_service().leave_club(club_id, body).await?;
    Ok(Json(ApiResponse::with_message(club, "Left club")))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Path((club_id, user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ClubResponse>>, AppError> {
    let club_id = parse_id(&club_id, "Club")?;
    let user_id = parse_id(&user_id, "User")?;
    let club = state.club_service().remove_member(club_id, user_id).await?;
    Ok(Json(ApiResponse::with_message(club, "Member removed")))
}

/// Promote a user to officer, enrolling them first if needed
pub async fn add_officer(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
    ApiJson(body): ApiJson<UserActionRequest>,
) -> Result<Json<ApiResponse<ClubResponse>>, AppError> {
    let club_id = parse_id(&club_id, "Club")?;
    let club = state.club_service().add_officer(club_id, body).await?;
    Ok(Json(ApiResponse::with_message(club, "Officer added")))
}

pub async fn remove_officer(
    State(state): State<AppState>,
    Path((club_id, user_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ClubResponse>>, AppError> {
    let club_id = parse_id(&club_id, "Club")?;
    let user_id = parse_id(&user_id, "User")?;
    let club = state.club_service().remove_officer(club_id, user_id).await?;
    Ok(Json(ApiResponse::with_message(club, "Officer removed")))
}
