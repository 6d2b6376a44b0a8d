use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::event::EventWithReceivers;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub email: String,
    pub created_at: NaiveDateTime,
}

/// A user together with the events it sent and the events it was invited to.
#[derive(Debug, Clone)]
pub struct UserWithEvents {
    pub user: User,
    pub events_sent: Vec<EventWithReceivers>,
    pub events_received: Vec<EventWithReceivers>,
}
