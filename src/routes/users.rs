use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::user_dto::{CreateUserPayload, UserListResponse, UserResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users/",
    responses(
        (status = 200, description = "All users with their sent and received events", body = Json<UserListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let users = state.user_service.list().await?;
    Ok(Json(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/users/",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created", body = Json<UserResponse>),
        (status = 400, description = "User already exists or email is invalid"),
        (status = 404, description = "Missing email field")
    )
)]
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUserPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let email = payload.into_email()?;
    let user = state.user_service.create(&email).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/api/users/{email}/",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "User found", body = Json<UserResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get_by_email(&email).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{email}/",
    params(
        ("email" = String, Path, description = "User email")
    ),
    responses(
        (status = 200, description = "User deleted along with the events it sent", body = Json<UserResponse>),
        (status = 404, description = "User not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.delete(&email).await?;
    Ok(Json(UserResponse::from(user)))
}
