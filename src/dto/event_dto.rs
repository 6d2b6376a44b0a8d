use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::event::{EventWithReceivers, NewEvent};
use crate::utils::time::{from_parts, parse_timestamp, serialize_timestamp};

/// Body of `POST /api/{sender_email}/events/`.
///
/// Each end of the range may be given as one timestamp string
/// (`start_time`) or as decomposed fields (`start_time_year`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CreateEventPayload {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub color: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub start_time_year: Option<i32>,
    pub start_time_month: Option<u32>,
    pub start_time_day: Option<u32>,
    pub start_time_hour: Option<u32>,
    pub start_time_minute: Option<u32>,
    pub end_time_year: Option<i32>,
    pub end_time_month: Option<u32>,
    pub end_time_day: Option<u32>,
    pub end_time_hour: Option<u32>,
    pub end_time_minute: Option<u32>,
    pub receiver_emails: Option<Vec<String>>,
}

struct TimeParts {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
}

impl TimeParts {
    fn is_complete(&self) -> bool {
        self.year.is_some()
            && self.month.is_some()
            && self.day.is_some()
            && self.hour.is_some()
            && self.minute.is_some()
    }

    fn compose(&self) -> Option<NaiveDateTime> {
        from_parts(self.year?, self.month?, self.day?, self.hour?, self.minute?)
    }
}

fn resolve_time(label: &str, timestamp: Option<&str>, parts: &TimeParts) -> Result<NaiveDateTime> {
    let resolved = match timestamp {
        Some(raw) => parse_timestamp(raw),
        None => parts.compose(),
    };
    resolved.ok_or_else(|| Error::InvalidTime(format!("Invalid {}.", label)))
}

impl CreateEventPayload {
    fn start_parts(&self) -> TimeParts {
        TimeParts {
            year: self.start_time_year,
            month: self.start_time_month,
            day: self.start_time_day,
            hour: self.start_time_hour,
            minute: self.start_time_minute,
        }
    }

    fn end_parts(&self) -> TimeParts {
        TimeParts {
            year: self.end_time_year,
            month: self.end_time_month,
            day: self.end_time_day,
            hour: self.end_time_hour,
            minute: self.end_time_minute,
        }
    }

    /// Checks presence, then validates the time range.
    pub fn into_new_event(self) -> Result<NewEvent> {
        let start_parts = self.start_parts();
        let end_parts = self.end_parts();
        let has_start = self.start_time.is_some() || start_parts.is_complete();
        let has_end = self.end_time.is_some() || end_parts.is_complete();

        if self.name.is_none()
            || self.color.is_none()
            || self.receiver_emails.is_none()
            || !has_start
            || !has_end
        {
            return Err(Error::MissingField("Missing fields.".to_string()));
        }
        self.validate()?;

        let start_time = resolve_time("start_time", self.start_time.as_deref(), &start_parts)?;
        let end_time = resolve_time("end_time", self.end_time.as_deref(), &end_parts)?;
        if end_time <= start_time {
            return Err(Error::InvalidTime(
                "End time must be after start time.".to_string(),
            ));
        }

        let mut receiver_emails: Vec<String> = Vec::new();
        for email in self.receiver_emails.unwrap_or_default() {
            if !receiver_emails.contains(&email) {
                receiver_emails.push(email);
            }
        }

        Ok(NewEvent {
            name: self.name.unwrap_or_default(),
            color: self.color.unwrap_or_default(),
            start_time,
            end_time,
            receiver_emails,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_time: NaiveDateTime,
    #[serde(serialize_with = "serialize_timestamp")]
    pub end_time: NaiveDateTime,
    pub sender_email: String,
    pub receiver_emails: Vec<String>,
}

impl From<EventWithReceivers> for EventResponse {
    fn from(value: EventWithReceivers) -> Self {
        Self {
            id: value.event.id,
            name: value.event.name,
            color: value.event.color,
            start_time: value.event.start_time,
            end_time: value.event.end_time,
            sender_email: value.event.sender_email,
            receiver_emails: value.receiver_emails,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sync_payload() -> CreateEventPayload {
        CreateEventPayload {
            name: Some("Sync".into()),
            color: Some("Red".into()),
            start_time: Some("2024-01-01T10:00".into()),
            end_time: Some("2024-01-01T11:00".into()),
            receiver_emails: Some(vec!["b@x.com".into()]),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_single_timestamps() {
        let event = sync_payload().into_new_event().unwrap();
        assert_eq!(event.start_time, from_parts(2024, 1, 1, 10, 0).unwrap());
        assert_eq!(event.end_time, from_parts(2024, 1, 1, 11, 0).unwrap());
        assert_eq!(event.receiver_emails, vec!["b@x.com".to_string()]);
    }

    #[test]
    fn accepts_decomposed_fields() {
        let payload = CreateEventPayload {
            start_time: None,
            end_time: None,
            start_time_year: Some(2024),
            start_time_month: Some(3),
            start_time_day: Some(5),
            start_time_hour: Some(9),
            start_time_minute: Some(30),
            end_time_year: Some(2024),
            end_time_month: Some(3),
            end_time_day: Some(5),
            end_time_hour: Some(10),
            end_time_minute: Some(0),
            ..sync_payload()
        };
        let event = payload.into_new_event().unwrap();
        assert_eq!(event.start_time, from_parts(2024, 3, 5, 9, 30).unwrap());
    }

    #[test]
    fn partial_decomposed_fields_are_missing() {
        let payload = CreateEventPayload {
            start_time: None,
            start_time_year: Some(2024),
            start_time_month: Some(3),
            ..sync_payload()
        };
        assert!(matches!(
            payload.into_new_event(),
            Err(Error::MissingField(_))
        ));
    }

    #[test]
    fn missing_receivers_is_a_missing_field() {
        let payload = CreateEventPayload {
            receiver_emails: None,
            ..sync_payload()
        };
        assert!(matches!(
            payload.into_new_event(),
            Err(Error::MissingField(_))
        ));
    }

    #[test]
    fn rejects_inverted_and_empty_ranges() {
        let inverted = CreateEventPayload {
            start_time: Some("2024-01-01T12:00".into()),
            ..sync_payload()
        };
        assert!(matches!(inverted.into_new_event(), Err(Error::InvalidTime(_))));

        let empty = CreateEventPayload {
            end_time: Some("2024-01-01T10:00".into()),
            ..sync_payload()
        };
        assert!(matches!(empty.into_new_event(), Err(Error::InvalidTime(_))));
    }

    #[test]
    fn rejects_impossible_dates() {
        let payload = CreateEventPayload {
            start_time: Some("2024-02-30T10:00".into()),
            ..sync_payload()
        };
        assert!(matches!(payload.into_new_event(), Err(Error::InvalidTime(_))));
    }

    #[test]
    fn collapses_duplicate_receivers() {
        let payload = CreateEventPayload {
            receiver_emails: Some(vec![
                "b@x.com".into(),
                "c@x.com".into(),
                "b@x.com".into(),
            ]),
            ..sync_payload()
        };
        let event = payload.into_new_event().unwrap();
        assert_eq!(
            event.receiver_emails,
            vec!["b@x.com".to_string(), "c@x.com".to_string()]
        );
    }
}
