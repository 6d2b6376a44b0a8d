use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "gif", "jpg", "jpeg"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub id: i64,
    pub base_url: String,
    pub salt: String,
    pub extension: String,
    pub width: i64,
    pub height: i64,
    pub created_at: NaiveDateTime,
}

impl Asset {
    pub fn object_key(&self) -> String {
        format!("{}.{}", self.salt, self.extension)
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.object_key())
    }
}
