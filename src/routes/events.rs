use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::event_dto::{CreateEventPayload, EventResponse},
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/{sender_email}/events/",
    params(
        ("sender_email" = String, Path, description = "Email of the sending user")
    ),
    request_body = CreateEventPayload,
    responses(
        (status = 201, description = "Event created", body = Json<EventResponse>),
        (status = 400, description = "Malformed or inverted time range"),
        (status = 404, description = "Missing fields, or sender/receiver not found")
    )
)]
#[axum::debug_handler]
pub async fn create_event(
    State(state): State<AppState>,
    Path(sender_email): Path<String>,
    payload: std::result::Result<Json<CreateEventPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let new_event = payload.into_new_event()?;
    let event = state.event_service.create(&sender_email, new_event).await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/",
    params(
        ("id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = Json<EventResponse>),
        (status = 404, description = "Event not found")
    )
)]
#[axum::debug_handler]
pub async fn get_event(
    State(state): State<AppState>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let Path(id) = id.map_err(|_| Error::NotFound("Event not found".to_string()))?;
    let event = state.event_service.get_by_id(id).await?;
    Ok(Json(EventResponse::from(event)))
}
