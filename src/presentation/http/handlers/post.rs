//! Post and Comment Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    CreateCommentRequest, CreatePostRequest, PostQueryParams, UpdatePostRequest, UserActionRequest,
};
use crate::application::dto::response::{ApiResponse, LikeResponse, Paginated, PostResponse};
use crate::application::services::PostService;
use crate::presentation::http::extractors::{parse_id, ApiJson, ApiQuery};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Feed, newest first
pub async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PostQueryParams>,
) -> Result<Json<ApiResponse<Paginated<PostResponse>>>, AppError> {
    let page = state.post_service().list_posts(query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn create_post(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponse>>), AppError> {
    let post = state.post_service().create_post(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(post, "Post created")),
    ))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<PostResponse>>, AppError> {
    let post_id = parse_id(&post_id, "Post")?;
    let post = state.post_service().get_post(post_id).await?;
    Ok(Json(ApiResponse::ok(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(body): ApiJson<UpdatePostRequest>,
) -> Result<Json<ApiResponse<PostResponse>>, AppError> {
    let post_id = parse_id(&post_id, "Post")?;
    let post = state.post_service().update_post(post_id, body).await?;
    Ok(Json(ApiResponse::with_message(post, "Post updated")))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let post_id = parse_id(&post_id, "Post")?;
    state.post_service().delete_post(post_id).await?;
    Ok(Json(ApiResponse::message("Post deleted")))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(body): ApiJson<UserActionRequest>,
) -> Result<Json<ApiResponse<LikeResponse>>, AppError> {
    let post_id = parse_id(&post_id, "Post")?;
    let like = state.post_service().toggle_like(post_id, body).await?;
    Ok(Json(ApiResponse::ok(like)))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ApiJson(body): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PostResponse>>), AppError> {
    let post_id = parse_id(&post_id, "Post")?;
    let post = state.post_service().add_comment(post_id, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(post, "Comment added")),
    ))
}

pub async fn remove_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<PostResponse>>, AppError> {
    let post_id = parse_id(&post_id, "Post")?;
    let comment_id = parse_id(&comment_id, "Comment")?;
    let post = state
        .post_service()
        .remove_comment(post_id, comment_id)
        .await?;
    Ok(Json(ApiResponse::with_message(post, "Comment removed")))
}
