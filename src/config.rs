use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;

const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_DATABASE_URL: &str = "sqlite://cal.db";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub storage: Option<StorageConfig>,
}

/// Connection details for the S3-compatible bucket that holds image assets.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub public_base_url: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            server_address: get_env_or(&lookup, "SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            database_url: get_env_or(&lookup, "DATABASE_URL", DEFAULT_DATABASE_URL),
            storage: StorageConfig::from_lookup(&lookup)?,
        })
    }
}

impl StorageConfig {
    /// Storage is optional: without `ASSET_STORAGE_ENDPOINT` uploads are refused.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<Self>> {
        let Some(endpoint) = lookup("ASSET_STORAGE_ENDPOINT")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
        else {
            return Ok(None);
        };

        let bucket = get_env(&lookup, "ASSET_BUCKET")?;
        let public_base_url = lookup("ASSET_PUBLIC_BASE_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format!("{}/{}", endpoint, bucket));
        let timeout_secs = match lookup("STORAGE_TIMEOUT_SECS") {
            Some(_) => get_env_parse(&lookup, "STORAGE_TIMEOUT_SECS")?,
            None => DEFAULT_STORAGE_TIMEOUT_SECS,
        };

        Ok(Some(Self {
            endpoint,
            bucket,
            region: get_env_or(&lookup, "ASSET_REGION", DEFAULT_REGION),
            access_key_id: get_env(&lookup, "ASSET_ACCESS_KEY_ID")?,
            secret_access_key: get_env(&lookup, "ASSET_SECRET_ACCESS_KEY")?,
            public_base_url,
            timeout_secs,
        }))
    }
}

fn get_env(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    lookup(name).ok_or_else(|| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    lookup(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse<T>(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(lookup, name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}
