use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::model::{Group, Message, User};

/// Persistence gateway. Append-only for messages: inserts are single-row
/// atomic and nothing here updates or deletes a message.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // -- users --------------------------------------------------------------

    pub async fn create_user(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO chat_user (id,username,password_hash,birthdate,email,phone,avatar_url) \
             VALUES (?,?,?,?,?,?,?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.birthdate)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.avatar_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn user_by_id(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM chat_user WHERE id=?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM chat_user WHERE username=?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM chat_user WHERE email=?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn all_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM chat_user").fetch_all(&self.pool).await
    }

    pub async fn count_users(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_user")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // -- groups -------------------------------------------------------------

    pub async fn create_group(&self, group: &Group) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO chat_group (id,name) VALUES (?,?)")
            .bind(&group.id)
            .bind(&group.name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn group_by_id(&self, id: &str) -> Result<Option<Group>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM chat_group WHERE id=?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn group_by_name(&self, name: &str) -> Result<Option<Group>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM chat_group WHERE name=?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn all_groups(&self) -> Result<Vec<Group>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM chat_group").fetch_all(&self.pool).await
    }

    pub async fn add_member(&self, user_id: &str, group_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO chat_user_groups (user_id,group_id) VALUES (?,?)")
            .bind(user_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // -- messages -----------------------------------------------------------

    pub async fn save_message(&self, message: &Message) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO chat_message (id,content,sender_id,recipient_id,group_id,chat_type,timestamp) \
             VALUES (?,?,?,?,?,?,?)",
        )
        .bind(&message.id)
        .bind(&message.content)
        .bind(&message.sender_id)
        .bind(&message.recipient_id)
        .bind(&message.group_id)
        .bind(message.chat_type)
        .bind(message.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn message_by_id(&self, id: &str) -> Result<Option<Message>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM chat_message WHERE id=?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// PRIVATE messages exchanged between the two users, ascending by
    /// timestamp. `since` bounds strictly from below; `None` means the full
    /// history.
    pub async fn conversation(
        &self,
        user_id: &str,
        other_user_id: &str,
        since: Option<NaiveDateTime>,
    ) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM chat_message \
             WHERE chat_type='PRIVATE' \
               AND ((sender_id=?1 AND recipient_id=?2) OR (sender_id=?2 AND recipient_id=?1)) \
               AND (?3 IS NULL OR timestamp > ?3) \
             ORDER BY timestamp ASC",
        )
        .bind(user_id)
        .bind(other_user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
    }

    /// All GROUP messages of a group, ascending by timestamp. An unknown
    /// group id simply matches nothing.
    pub async fn group_feed(&self, group_id: &str) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM chat_message \
             WHERE chat_type='GROUP' AND group_id=? \
             ORDER BY timestamp ASC",
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Messages visible to `user_id`: sent by them, addressed to them, or
    /// posted in a group they belong to. Optional keyword (case-sensitive
    /// substring, via instr) and inclusive time bounds, all AND-composed.
    pub async fn search(
        &self,
        user_id: &str,
        keyword: Option<&str>,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<Message>, sqlx::Error> {
        sqlx::query_as(
            "SELECT * FROM chat_message \
             WHERE (sender_id=?1 OR recipient_id=?1 \
                    OR group_id IN (SELECT group_id FROM chat_user_groups WHERE user_id=?1)) \
               AND (?2 IS NULL OR instr(content, ?2) > 0) \
               AND (?3 IS NULL OR timestamp >= ?3) \
               AND (?4 IS NULL OR timestamp <= ?4) \
             ORDER BY timestamp ASC",
        )
        .bind(user_id)
        .bind(keyword)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
    }
}
