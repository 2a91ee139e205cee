use sqlx::SqlitePool;

/// Creates the schema on startup. Messages keep both target columns and let
/// `chat_type` decide which one is meaningful.
pub async fn init(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // raw_sql: the schema is several statements and prepared queries only
    // take one.
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS chat_user (
            id            TEXT PRIMARY KEY,
            username      TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            birthdate     TEXT,
            email         TEXT,
            phone         TEXT,
            avatar_url    TEXT
        );

        CREATE TABLE IF NOT EXISTS chat_group (
            id   TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS chat_user_groups (
            id       INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id  TEXT NOT NULL REFERENCES chat_user(id),
            group_id TEXT NOT NULL REFERENCES chat_group(id),
            UNIQUE (user_id, group_id)
        );

        CREATE TABLE IF NOT EXISTS chat_message (
            id           TEXT PRIMARY KEY,
            content      TEXT NOT NULL,
            sender_id    TEXT NOT NULL REFERENCES chat_user(id),
            recipient_id TEXT,
            group_id     TEXT,
            chat_type    TEXT NOT NULL,
            timestamp    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_message_private
            ON chat_message (chat_type, sender_id, recipient_id);
        CREATE INDEX IF NOT EXISTS idx_message_group
            ON chat_message (group_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
