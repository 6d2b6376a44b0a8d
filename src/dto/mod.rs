pub mod asset_dto;
pub mod event_dto;
pub mod user_dto;
