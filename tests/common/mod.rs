#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use calendar_backend::{
    config::{Config, StorageConfig},
    database::pool::{create_pool, run_migrations},
    routes, AppState,
};
use serde_json::Value as JsonValue;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

pub async fn setup_app_with_storage(storage: Option<StorageConfig>) -> (Router, SqlitePool) {
    setup_app_at("sqlite::memory:", storage).await
}

async fn setup_app_at(database_url: &str, storage: Option<StorageConfig>) -> (Router, SqlitePool) {
    let config = Config {
        server_address: "127.0.0.1:0".to_string(),
        database_url: database_url.to_string(),
        storage,
    };
    let pool = create_pool(&config.database_url).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");

    let state = AppState::new(pool.clone(), &config).expect("state");
    (routes::router(state), pool)
}

pub async fn setup_app() -> (Router, SqlitePool) {
    setup_app_with_storage(None).await
}

/// A database file in the system temp dir, removed with its WAL files on drop.
pub struct TempDb {
    pub path: PathBuf,
}

impl TempDb {
    pub fn new(tag: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let name = format!("calendar-{}-{}-{}.db", tag, std::process::id(), nanos);
        Self {
            path: std::env::temp_dir().join(name),
        }
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

pub async fn setup_file_app(db: &TempDb) -> (Router, SqlitePool) {
    setup_app_at(&db.url(), None).await
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn create_user(app: &Router, email: &str) {
    let (status, _) = send(
        app,
        "POST",
        "/api/users/",
        Some(serde_json::json!({ "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

pub async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
