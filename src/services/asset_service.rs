use crate::database::pool::WriteLock;
use crate::error::{Error, Result};
use crate::models::asset::{Asset, ALLOWED_EXTENSIONS};
use crate::services::storage_service::StorageService;
use crate::utils::image::{parse_data_url, sniff, ImageFormat};
use crate::utils::token::{generate_salt, SALT_LENGTH};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sqlx::SqlitePool;
use tracing::{error, info};

#[derive(Clone)]
pub struct AssetService {
    pool: SqlitePool,
    write_lock: WriteLock,
    storage: Option<StorageService>,
}

impl AssetService {
    pub fn new(pool: SqlitePool, write_lock: WriteLock, storage: Option<StorageService>) -> Self {
        Self {
            pool,
            write_lock,
            storage,
        }
    }

    /// Decodes a base64 data URL, uploads the image and records it. Nothing
    /// is persisted when the upload fails.
    pub async fn upload(&self, image_data: &str) -> Result<Asset> {
        let (extension, payload) = parse_data_url(image_data).ok_or_else(|| {
            Error::BadRequest("image_data must be a base64 image data URL.".to_string())
        })?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::UnsupportedExtension(extension));
        }

        let bytes = BASE64.decode(payload.trim())?;
        let declared = ImageFormat::from_extension(&extension);
        let image = sniff(&bytes)
            .filter(|info| Some(info.format) == declared)
            .ok_or_else(|| {
                Error::BadRequest(format!("image_data is not a valid {} image.", extension))
            })?;

        let storage = self.storage.as_ref().ok_or(Error::StorageUnavailable)?;
        let salt = generate_salt(SALT_LENGTH);
        let key = format!("{}.{}", salt, extension);

        if let Err(e) = storage
            .put_public_object(&key, bytes, image.format.content_type())
            .await
        {
            error!(key = %key, error = ?e, "Asset upload failed");
            return Err(match e {
                Error::Reqwest(err) => Error::Storage(format!("Asset upload failed: {}", err)),
                other => other,
            });
        }

        let guard = self.write_lock.acquire().await;
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (base_url, salt, extension, width, height)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, base_url, salt, extension, width, height, created_at
            "#,
        )
        .bind(storage.public_base_url())
        .bind(&salt)
        .bind(&extension)
        .bind(i64::from(image.width))
        .bind(i64::from(image.height))
        .fetch_one(&self.pool)
        .await?;
        drop(guard);

        info!(
            asset_id = asset.id,
            key = %asset.object_key(),
            width = asset.width,
            height = asset.height,
            "Asset uploaded"
        );
        Ok(asset)
    }
}
