use crate::database::pool::WriteLock;
use crate::error::{Error, Result};
use crate::models::user::{User, UserWithEvents};
use crate::services::event_service::{events_received_by, events_sent_by};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
    write_lock: WriteLock,
}

impl UserService {
    pub fn new(pool: SqlitePool, write_lock: WriteLock) -> Self {
        Self { pool, write_lock }
    }

    /// Reads every user inside one transaction so the listing is a single
    /// snapshot even while writers commit.
    pub async fn list(&self) -> Result<Vec<UserWithEvents>> {
        let mut tx = self.pool.begin().await?;
        let users = sqlx::query_as::<_, User>("SELECT email, created_at FROM users ORDER BY rowid")
            .fetch_all(&mut *tx)
            .await?;

        let mut out = Vec::with_capacity(users.len());
        for user in users {
            out.push(with_history(&mut *tx, user).await?);
        }
        tx.commit().await?;
        Ok(out)
    }

    pub async fn create(&self, email: &str) -> Result<UserWithEvents> {
        let mut write = self.write_lock.begin(&self.pool).await?;
        let tx = &mut *write.tx;
        if find_user(tx, email).await?.is_some() {
            return Err(Error::Duplicate("User already exists".to_string()));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email)
            VALUES (?)
            RETURNING email, created_at
            "#,
        )
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Duplicate(_) => Error::Duplicate("User already exists".to_string()),
            other => other,
        })?;
        write.commit().await?;

        info!(email = %user.email, "User created");
        Ok(UserWithEvents {
            user,
            events_sent: Vec::new(),
            events_received: Vec::new(),
        })
    }

    pub async fn get_by_email(&self, email: &str) -> Result<UserWithEvents> {
        let mut conn = self.pool.acquire().await?;
        let user = find_user(&mut conn, email)
            .await?
            .ok_or_else(user_not_found)?;
        with_history(&mut conn, user).await
    }

    /// Deletes the user and every event it sent. Events it only received
    /// survive without it. Returns the user as it was before deletion.
    pub async fn delete(&self, email: &str) -> Result<UserWithEvents> {
        let mut write = self.write_lock.begin(&self.pool).await?;
        let tx = &mut *write.tx;
        let user = find_user(tx, email).await?.ok_or_else(user_not_found)?;
        let snapshot = with_history(tx, user).await?;

        sqlx::query("DELETE FROM receiver_association WHERE receiver_email = ?")
            .bind(email)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            DELETE FROM receiver_association
            WHERE event_id IN (SELECT id FROM events WHERE sender_email = ?)
            "#,
        )
        .bind(email)
        .execute(&mut *tx)
        .await?;
        let removed = sqlx::query("DELETE FROM events WHERE sender_email = ?")
            .bind(email)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE email = ?")
            .bind(email)
            .execute(&mut *tx)
            .await?;
        write.commit().await?;

        info!(
            email = %email,
            events_removed = removed.rows_affected(),
            "User deleted"
        );
        Ok(snapshot)
    }
}

fn user_not_found() -> Error {
    Error::NotFound("User not found".to_string())
}

pub(crate) async fn find_user(conn: &mut SqliteConnection, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT email, created_at FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

async fn with_history(conn: &mut SqliteConnection, user: User) -> Result<UserWithEvents> {
    let events_sent = events_sent_by(conn, &user.email).await?;
    let events_received = events_received_by(conn, &user.email).await?;
    Ok(UserWithEvents {
        user,
        events_sent,
        events_received,
    })
}
