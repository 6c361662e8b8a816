//! Marketplace Listing Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    CreateListingRequest, ListingQueryParams, UpdateListingRequest,
};
use crate::application::dto::response::{ApiResponse, ListingResponse, Paginated};
use crate::application::services::ListingService;
use crate::presentation::http::extractors::{parse_id, ApiJson, ApiQuery};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Browse listings; sold items are hidden unless `available=false`
pub async fn list_listings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListingQueryParams>,
) -> Result<Json<ApiResponse<Paginated<ListingResponse>>>, AppError> {
    let page = state.listing_service().list_listings(query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn create_listing(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateListingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ListingResponse>>), AppError> {
    let listing = state.listing_service().create_listing(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(listing, "Listing created")),
    ))
}

pub async fn get_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<ApiResponse<ListingResponse>>, AppError> {
    let listing_id = parse_id(&listing_id, "Listing")?;
    let listing = state.listing_service().get_listing(listing_id).await?;
    Ok(Json(ApiResponse::ok(listing)))
}

pub async fn update_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
    ApiJson(body): ApiJson<UpdateListingRequest>,
) -> Result<Json<ApiResponse<ListingResponse>>, AppError> {
    let listing_id = parse_id(&listing_id, "Listing")?;
    let listing = state
        .listing_service()
        .update_listing(listing_id, body)
        .await?;
    Ok(Json(ApiResponse::with_message(listing, "Listing updated")))
}

pub async fn delete_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let listing_id = parse_id(&listing_id, "Listing")?;
    state.listing_service().delete_listing(listing_id).await?;
    Ok(Json(ApiResponse::message("Listing deleted")))
}

pub async fn mark_sold(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<ApiResponse<ListingResponse>>, AppError> {
    let listing_id = parse_id(&listing_id, "Listing")?;
    let listing = state
        .listing_service()
        .set_availability(listing_id, false)
        .await?;
    Ok(Json(ApiResponse::with_message(listing, "Listing marked as sold")))
}

pub async fn mark_available(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<ApiResponse<ListingResponse>>, AppError> {
    let listing_id = parse_id(&listing_id, "Listing")?;
    let listing = state
        .listing_service()
        .set_availability(listing_id, true)
        .await?;
    Ok(Json(ApiResponse::with_message(
        listing,
        "Listing marked as available",
    )))
}
