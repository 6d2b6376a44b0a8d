pub mod asset_service;
pub mod event_service;
pub mod storage_service;
pub mod user_service;
