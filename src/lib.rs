pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::config::Config;
use crate::database::pool::WriteLock;
use crate::error::Result;
use crate::services::{
    asset_service::AssetService, event_service::EventService, storage_service::StorageService,
    user_service::UserService,
};
use reqwest::Client;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub user_service: UserService,
    pub event_service: EventService,
    pub asset_service: AssetService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Result<Self> {
        let storage = match &config.storage {
            Some(storage_config) => {
                let http_client = Client::builder()
                    .timeout(std::time::Duration::from_secs(storage_config.timeout_secs))
                    .build()?;
                Some(StorageService::new(storage_config.clone(), http_client))
            }
            None => None,
        };

        let write_lock = WriteLock::new();
        let user_service = UserService::new(pool.clone(), write_lock.clone());
        let event_service = EventService::new(pool.clone(), write_lock.clone());
        let asset_service = AssetService::new(pool.clone(), write_lock, storage);

        Ok(Self {
            pool,
            user_service,
            event_service,
            asset_service,
        })
    }
}
