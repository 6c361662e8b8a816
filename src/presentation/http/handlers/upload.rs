//! Signed Upload Handler

use axum::{extract::State, Json};

use crate::application::dto::request::UploadSignatureRequest;
use crate::application::dto::response::{ApiResponse, UploadSignatureResponse};
use crate::application::services::UploadService;
use crate::presentation::http::extractors::ApiJson;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Issue a short-lived signature the client uses to upload media directly
/// to the storage provider.
pub async fn create_signature(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UploadSignatureRequest>,
) -> Result<Json<ApiResponse<UploadSignatureResponse>>, AppError> {
    let signed = state.upload_service().sign_upload(body).await?;
    Ok(Json(ApiResponse::ok(signed)))
}
