use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::event_dto::EventResponse;
use crate::error::{Error, Result};
use crate::models::user::UserWithEvents;
use crate::utils::time::serialize_timestamp;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserPayload {
    #[validate(email)]
    pub email: Option<String>,
}

impl CreateUserPayload {
    pub fn into_email(self) -> Result<String> {
        self.validate()?;
        self.email
            .ok_or_else(|| Error::MissingField("Missing email field.".to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub email: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: NaiveDateTime,
    pub events_sent: Vec<EventResponse>,
    pub events_received: Vec<EventResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}

impl From<UserWithEvents> for UserResponse {
    fn from(value: UserWithEvents) -> Self {
        Self {
            email: value.user.email,
            created_at: value.user.created_at,
            events_sent: value.events_sent.into_iter().map(Into::into).collect(),
            events_received: value.events_received.into_iter().map(Into::into).collect(),
        }
    }
}
