use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub sender_email: String,
}

/// Receivers are ordered by when they were linked to the event.
#[derive(Debug, Clone)]
pub struct EventWithReceivers {
    pub event: Event,
    pub receiver_emails: Vec<String>,
}

/// A validated event that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub color: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub receiver_emails: Vec<String>,
}
