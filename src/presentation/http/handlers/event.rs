//! Event Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::{
    CreateEventRequest, EventQueryParams, UpdateEventRequest, UserActionRequest,
};
use crate::application::dto::response::{ApiResponse, EventResponse, Paginated};
use crate::application::services::EventService;
use crate::presentation::http::extractors::{parse_id, ApiJson, ApiQuery};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// List events, soonest first unless `sort=desc`
pub async fn list_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<EventQueryParams>,
) -> Result<Json<ApiResponse<Paginated<EventResponse>>>, AppError> {
    let page = state.event_service().list_events(query).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EventResponse>>), AppError> {
    let event = state.event_service().create_event(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(event, "Event created")),
    ))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<ApiResponse<EventResponse>>, AppError> {
    let event_id = parse_id(&event_id, "Event")?;
    let event = state.event_service().get_event(event_id).await?;
    Ok(Json(ApiResponse::ok(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    ApiJson(body): ApiJson<UpdateEventRequest>,
) -> Result<Json<ApiResponse<EventResponse>>, AppError> {
    let event_id = parse_id(&event_id, "Event")?;
    let event = state.event_service().update_event(event_id, body).await?;
    Ok(Json(ApiResponse::with_message(event, "Event updated")))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let event_id = parse_id(&event_id, "Event")?;
    state.event_service().delete_event(event_id).await?;
    Ok(Json(ApiResponse::message("Event deleted")))
}

/// Register the acting user as an attendee
pub async fn attend_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    ApiJson(body): ApiJson<UserActionRequest>,
) -> Result<Json<ApiResponse<EventResponse>>, AppError> {
    let event_id = parse_id(&event_id, "Event")?;
    let event = state.event_service().attend_event(event_id, body).await?;
    Ok(Json(ApiResponse::with_message(
        event,
        "Successfully registered for event",
    )))
}

pub async fn leave_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    ApiJson(body): ApiJson<UserActionRequest>,
) -> Result<Json<ApiResponse<EventResponse>>, AppError> {
    let event_id = parse_id(&event_id, "Event")?;
    let event = state.event_service().leave_event(event_id, body).await?;
    Ok(Json(ApiResponse::with_message(event, "Left event")))
}
