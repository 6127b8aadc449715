use std::collections::HashMap;

use crate::models::{MessageRow, ThreadRow, UserRow};
use crate::{Database, new_id};
use anyhow::Result;
use rusqlite::{Connection, Row, params};

impl Database {
    // -- Users --

    pub fn create_user(&self, name: &str, email: &str) -> Result<UserRow> {
        let id = new_id();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email) VALUES (?1, ?2, ?3)",
                (&id, name, email),
            )?;
            Ok(())
        })?;

        Ok(UserRow {
            id,
            name: name.to_string(),
            email: email.to_string(),
            kept_messages: vec![],
        })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let user = conn
                .query_row("SELECT id, name, email FROM users WHERE id = ?1", [id], user_from_row)
                .optional()?;

            match user {
                Some(mut user) => {
                    user.kept_messages = query_kept_messages(conn, &user.id)?;
                    Ok(Some(user))
                }
                None => Ok(None),
            }
        })
    }

    /// Every user in store order (rowid), kept messages included.
    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, name, email FROM users ORDER BY rowid")?;
            let mut users = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            // One pass over kept_messages instead of a query per user
            let mut kept: HashMap<String, Vec<String>> = HashMap::new();
            let mut stmt =
                conn.prepare("SELECT user_id, message_id FROM kept_messages ORDER BY rowid")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (user_id, message_id) = row?;
                kept.entry(user_id).or_default().push(message_id);
            }

            for user in &mut users {
                user.kept_messages = kept.remove(&user.id).unwrap_or_default();
            }
            Ok(users)
        })
    }

    /// Number of users, optionally leaving one out.
    pub fn count_users(&self, exclude: Option<&str>) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE (?1 IS NULL OR id != ?1)",
                [exclude],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    /// Skip `offset` users of the filtered set (rowid order) and take one.
    pub fn user_at_offset(&self, exclude: Option<&str>, offset: u64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let user = conn
                .query_row(
                    "SELECT id, name, email FROM users
                     WHERE (?1 IS NULL OR id != ?1)
                     ORDER BY rowid
                     LIMIT 1 OFFSET ?2",
                    params![exclude, offset as i64],
                    user_from_row,
                )
                .optional()?;

            match user {
                Some(mut user) => {
                    user.kept_messages = query_kept_messages(conn, &user.id)?;
                    Ok(Some(user))
                }
                None => Ok(None),
            }
        })
    }

    /// Set-add a message id to a user's kept messages.
    ///
    /// Returns the number of rows written: 0 when the id was already kept or
    /// the user does not exist. Neither case is an error.
    pub fn add_kept_message(&self, user_id: &str, message_id: &str) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let written = conn.execute(
                "INSERT OR IGNORE INTO kept_messages (user_id, message_id)
                 SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM users WHERE id = ?1)",
                (user_id, message_id),
            )?;
            Ok(written)
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        sender_id: &str,
        recipient_id: &str,
        content: &str,
        timestamp: i64,
    ) -> Result<MessageRow> {
        let id = new_id();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (id, sender_id, recipient_id, content, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![&id, sender_id, recipient_id, content, timestamp],
            )?;
            Ok(())
        })?;

        Ok(MessageRow {
            id,
            sender_id: sender_id.to_string(),
            recipient_id: recipient_id.to_string(),
            content: content.to_string(),
            timestamp,
            thread_id: None,
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, sender_id, recipient_id, content, timestamp, thread_id
                     FROM messages WHERE id = ?1",
                    [id],
                    message_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Returns false when no message matched.
    pub fn set_message_recipient(&self, id: &str, recipient_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE messages SET recipient_id = ?2 WHERE id = ?1",
                (id, recipient_id),
            )?;
            Ok(updated > 0)
        })
    }

    /// Returns false when no message matched.
    pub fn set_message_thread(&self, id: &str, thread_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let updated =
                conn.execute("UPDATE messages SET thread_id = ?2 WHERE id = ?1", (id, thread_id))?;
            Ok(updated > 0)
        })
    }

    // -- Threads --

    /// Insert a thread together with its first message id.
    pub fn create_thread(
        &self,
        participant_a: &str,
        participant_b: &str,
        first_message_id: &str,
    ) -> Result<ThreadRow> {
        let id = new_id();
        self.with_conn_mut(|conn| {
            // A thread document and its initial message list land together
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO threads (id, participant_a, participant_b) VALUES (?1, ?2, ?3)",
                (&id, participant_a, participant_b),
            )?;
            tx.execute(
                "INSERT INTO thread_messages (thread_id, message_id) VALUES (?1, ?2)",
                (&id, first_message_id),
            )?;
            tx.commit()?;
            Ok(())
        })?;

        Ok(ThreadRow {
            id,
            participant_a: participant_a.to_string(),
            participant_b: participant_b.to_string(),
            messages: vec![first_message_id.to_string()],
        })
    }

    pub fn get_thread(&self, id: &str) -> Result<Option<ThreadRow>> {
        self.with_conn(|conn| {
            let thread = conn
                .query_row(
                    "SELECT id, participant_a, participant_b FROM threads WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(ThreadRow {
                            id: row.get(0)?,
                            participant_a: row.get(1)?,
                            participant_b: row.get(2)?,
                            messages: vec![],
                        })
                    },
                )
                .optional()?;

            match thread {
                Some(mut thread) => {
                    let mut stmt = conn.prepare(
                        "SELECT message_id FROM thread_messages
                         WHERE thread_id = ?1 ORDER BY rowid",
                    )?;
                    thread.messages = stmt
                        .query_map([&thread.id], |row| row.get(0))?
                        .collect::<std::result::Result<Vec<_>, _>>()?;
                    Ok(Some(thread))
                }
                None => Ok(None),
            }
        })
    }

    /// Append a message id to the end of a thread. Returns false when the
    /// thread does not exist.
    pub fn append_thread_message(&self, thread_id: &str, message_id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let written = conn.execute(
                "INSERT INTO thread_messages (thread_id, message_id)
                 SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM threads WHERE id = ?1)",
                (thread_id, message_id),
            )?;
            Ok(written > 0)
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        kept_messages: vec![],
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        recipient_id: row.get(2)?,
        content: row.get(3)?,
        timestamp: row.get(4)?,
        thread_id: row.get(5)?,
    })
}

fn query_kept_messages(conn: &Connection, user_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT message_id FROM kept_messages WHERE user_id = ?1 ORDER BY rowid")?;
    let ids = stmt
        .query_map([user_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
