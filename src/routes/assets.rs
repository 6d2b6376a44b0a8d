use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use crate::{
    dto::asset_dto::{AssetResponse, UploadAssetPayload},
    error::{Error, Result},
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/upload/",
    request_body = UploadAssetPayload,
    responses(
        (status = 201, description = "Image uploaded", body = Json<AssetResponse>),
        (status = 400, description = "Invalid image data or extension"),
        (status = 404, description = "Missing image_data field"),
        (status = 502, description = "Object storage rejected the upload"),
        (status = 503, description = "Object storage is not configured")
    )
)]
#[axum::debug_handler]
pub async fn upload_asset(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UploadAssetPayload>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(payload) = payload?;
    let image_data = payload
        .image_data
        .ok_or_else(|| Error::MissingField("Missing image_data field.".to_string()))?;
    let asset = state.asset_service.upload(&image_data).await?;
    Ok((StatusCode::CREATED, Json(AssetResponse::from(asset))))
}
