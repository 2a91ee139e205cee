use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Discriminator between two-party and group-addressed messages. Stored as
/// `PRIVATE` / `GROUP` text, same spelling on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum ChatType {
    Private,
    Group,
}

/// A registered account. `password_hash` never leaves the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub birthdate: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Group {
    pub id: String,
    pub name: String,
}

/// A canonical, server-trusted message. Exactly one of `recipient_id` /
/// `group_id` is set, decided by `chat_type`; the other side serializes as
/// null. Immutable once assembled.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender_id: String,
    pub recipient_id: Option<String>,
    pub group_id: Option<String>,
    pub chat_type: ChatType,
    pub timestamp: NaiveDateTime,
}

/// Client-submitted message body. Everything is optional at the parse stage;
/// the assembler decides which fields a given chat type requires and rejects
/// with the missing field named. No timestamp field exists here on purpose:
/// clients do not get a say in message time.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub content: Option<String>,
    pub sender_id: Option<String>,
    pub recipient_id: Option<String>,
    pub group_id: Option<String>,
}
