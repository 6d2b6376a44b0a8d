use crate::database::pool::WriteLock;
use crate::error::{Error, Result};
use crate::models::event::{Event, EventWithReceivers, NewEvent};
use crate::services::user_service::find_user;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

#[derive(Clone)]
pub struct EventService {
    pool: SqlitePool,
    write_lock: WriteLock,
}

impl EventService {
    pub fn new(pool: SqlitePool, write_lock: WriteLock) -> Self {
        Self { pool, write_lock }
    }

    /// Inserts the event and its receiver links in one transaction. Any
    /// unknown sender or receiver rolls the whole thing back.
    pub async fn create(&self, sender_email: &str, new_event: NewEvent) -> Result<EventWithReceivers> {
        let mut write = self.write_lock.begin(&self.pool).await?;
        let tx = &mut *write.tx;

        if find_user(tx, sender_email).await?.is_none() {
            return Err(Error::InvalidReference("Sender does not exist.".to_string()));
        }
        for email in &new_event.receiver_emails {
            if find_user(tx, email).await?.is_none() {
                return Err(Error::InvalidReference(
                    "One or more receivers do not exist.".to_string(),
                ));
            }
        }

        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, color, start_time, end_time, sender_email)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, color, start_time, end_time, sender_email
            "#,
        )
        .bind(&new_event.name)
        .bind(&new_event.color)
        .bind(new_event.start_time)
        .bind(new_event.end_time)
        .bind(sender_email)
        .fetch_one(&mut *tx)
        .await?;

        for email in &new_event.receiver_emails {
            sqlx::query("INSERT INTO receiver_association (event_id, receiver_email) VALUES (?, ?)")
                .bind(event.id)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }

        write.commit().await?;

        info!(
            event_id = event.id,
            sender = %sender_email,
            receivers = new_event.receiver_emails.len(),
            "Event created"
        );

        Ok(EventWithReceivers {
            event,
            receiver_emails: new_event.receiver_emails,
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<EventWithReceivers> {
        let mut conn = self.pool.acquire().await?;
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, name, color, start_time, end_time, sender_email
            FROM events
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;

        let receiver_emails = receivers_of(&mut conn, event.id).await?;
        Ok(EventWithReceivers {
            event,
            receiver_emails,
        })
    }
}

pub(crate) async fn receivers_of(conn: &mut SqliteConnection, event_id: i64) -> Result<Vec<String>> {
    let emails = sqlx::query_scalar::<_, String>(
        r#"
        SELECT receiver_email
        FROM receiver_association
        WHERE event_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(event_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(emails)
}

pub(crate) async fn events_sent_by(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Vec<EventWithReceivers>> {
    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT id, name, color, start_time, end_time, sender_email
        FROM events
        WHERE sender_email = ?
        ORDER BY id
        "#,
    )
    .bind(email)
    .fetch_all(&mut *conn)
    .await?;
    attach_receivers(conn, events).await
}

pub(crate) async fn events_received_by(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Vec<EventWithReceivers>> {
    let events = sqlx::query_as::<_, Event>(
        r#"
        SELECT e.id, e.name, e.color, e.start_time, e.end_time, e.sender_email
        FROM events e
        JOIN receiver_association r ON r.event_id = e.id
        WHERE r.receiver_email = ?
        ORDER BY e.id
        "#,
    )
    .bind(email)
    .fetch_all(&mut *conn)
    .await?;
    attach_receivers(conn, events).await
}

async fn attach_receivers(
    conn: &mut SqliteConnection,
    events: Vec<Event>,
) -> Result<Vec<EventWithReceivers>> {
    let mut out = Vec::with_capacity(events.len());
    for event in events {
        let receiver_emails = receivers_of(conn, event.id).await?;
        out.push(EventWithReceivers {
            event,
            receiver_emails,
        });
    }
    Ok(out)
}
