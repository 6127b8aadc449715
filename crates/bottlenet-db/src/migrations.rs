use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (users, messages, threads)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                email       TEXT NOT NULL
            );

            -- No reference to messages: keeping a message never checks it exists.
            CREATE TABLE kept_messages (
                user_id     TEXT NOT NULL REFERENCES users(id),
                message_id  TEXT NOT NULL,
                PRIMARY KEY (user_id, message_id)
            );

            CREATE TABLE threads (
                id              TEXT PRIMARY KEY,
                participant_a   TEXT NOT NULL REFERENCES users(id),
                participant_b   TEXT NOT NULL REFERENCES users(id)
            );

            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                sender_id       TEXT NOT NULL REFERENCES users(id),
                recipient_id    TEXT NOT NULL REFERENCES users(id),
                content         TEXT NOT NULL,
                timestamp       INTEGER NOT NULL,
                thread_id       TEXT REFERENCES threads(id)
            );

            -- rowid order is conversation order
            CREATE TABLE thread_messages (
                thread_id   TEXT NOT NULL REFERENCES threads(id),
                message_id  TEXT NOT NULL REFERENCES messages(id)
            );

            CREATE INDEX idx_thread_messages_thread
                ON thread_messages(thread_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
