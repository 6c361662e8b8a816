//! User Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{CreateUserRequest, UpdateUserRequest, UserQueryParams};
use crate::application::dto::response::{ApiResponse, Paginated, ProfileResponse, UserResponse};
use crate::application::services::UserService;
use crate::presentation::http::extractors::{parse_id, ApiJson, ApiQuery};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// List users
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UserQueryParams>,
) -> Result<Json<ApiResponse<Paginated<UserResponse>>>, AppError> {
    let page = state.user_service().list_users(query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// Create a user
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    let user = state.user_service().create_user(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "User created")),
    ))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user_id = parse_id(&user_id, "User")?;
    let user = state.user_service().get_user(user_id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// User with derived activity counts
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<ProfileResponse>>, AppError> {
    let user_id = parse_id(&user_id, "User")?;
    let profile = state.user_service().get_profile(user_id).await?;
    Ok(Json(ApiResponse::ok(profile)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user_id = parse_id(&user_id, "User")?;
    let user = state.user_service().update_user(user_id, body).await?;
    Ok(Json(ApiResponse::with_message(user, "User updated")))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user_id = parse_id(&user_id, "User")?;
    state.user_service().delete_user(user_id).await?;
    Ok(Json(ApiResponse::message("User deleted")))
}
