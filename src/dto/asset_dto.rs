use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::asset::Asset;
use crate::utils::time::serialize_timestamp;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadAssetPayload {
    /// `data:image/<ext>;base64,<payload>`
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetResponse {
    pub id: i64,
    pub url: String,
    pub width: i64,
    pub height: i64,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: NaiveDateTime,
}

impl From<Asset> for AssetResponse {
    fn from(value: Asset) -> Self {
        Self {
            id: value.id,
            url: value.url(),
            width: value.width,
            height: value.height,
            created_at: value.created_at,
        }
    }
}
