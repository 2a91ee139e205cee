#![allow(dead_code)]

use parley::AppState;
use parley::model::{ChatType, Group, Message, MessageDraft, User};
use chrono::NaiveDateTime;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

pub const JWT_SECRET: &[u8] = b"test-secret";

/// Fresh state over a private in-memory database. One connection, kept
/// alive for the lifetime of the pool, or the database vanishes.
pub async fn test_state() -> AppState {
    test_state_with_pool().await.0
}

/// Same, but also hands back the pool for tests that mangle the schema
/// underneath the running app.
pub async fn test_state_with_pool() -> (AppState, sqlx::SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    parley::db::init(&pool).await.unwrap();
    (AppState::new(pool.clone(), JWT_SECRET), pool)
}

pub async fn seed_user(state: &AppState, id: &str, username: &str) {
    state
        .store
        .create_user(&User {
            id: id.to_owned(),
            username: username.to_owned(),
            password_hash: "unused".to_owned(),
            birthdate: None,
            email: None,
            phone: None,
            avatar_url: None,
        })
        .await
        .unwrap();
}

pub async fn seed_group(state: &AppState, id: &str, name: &str) {
    state
        .store
        .create_group(&Group {
            id: id.to_owned(),
            name: name.to_owned(),
        })
        .await
        .unwrap();
}

pub fn private_draft(content: &str, sender_id: &str, recipient_id: &str) -> MessageDraft {
    MessageDraft {
        content: Some(content.to_owned()),
        sender_id: Some(sender_id.to_owned()),
        recipient_id: Some(recipient_id.to_owned()),
        group_id: None,
    }
}

pub fn group_draft(content: &str, sender_id: &str, group_id: &str) -> MessageDraft {
    MessageDraft {
        content: Some(content.to_owned()),
        sender_id: Some(sender_id.to_owned()),
        recipient_id: None,
        group_id: Some(group_id.to_owned()),
    }
}

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

/// Inserts a pre-built PRIVATE message with a chosen timestamp, bypassing
/// assembly, for read-path fixtures.
pub async fn stored_private(
    state: &AppState,
    sender_id: &str,
    recipient_id: &str,
    content: &str,
    timestamp: NaiveDateTime,
) -> Message {
    let message = Message {
        id: Uuid::new_v4().to_string(),
        content: content.to_owned(),
        sender_id: sender_id.to_owned(),
        recipient_id: Some(recipient_id.to_owned()),
        group_id: None,
        chat_type: ChatType::Private,
        timestamp,
    };
    state.store.save_message(&message).await.unwrap();
    message
}

pub async fn stored_group(
    state: &AppState,
    sender_id: &str,
    group_id: &str,
    content: &str,
    timestamp: NaiveDateTime,
) -> Message {
    let message = Message {
        id: Uuid::new_v4().to_string(),
        content: content.to_owned(),
        sender_id: sender_id.to_owned(),
        recipient_id: None,
        group_id: Some(group_id.to_owned()),
        chat_type: ChatType::Group,
        timestamp,
    };
    state.store.save_message(&message).await.unwrap();
    message
}

pub fn assert_ascending(messages: &[Message]) {
    for pair in messages.windows(2) {
        assert!(
            pair[0].timestamp <= pair[1].timestamp,
            "results not ascending by timestamp: {} then {}",
            pair[0].timestamp,
            pair[1].timestamp
        );
    }
}
