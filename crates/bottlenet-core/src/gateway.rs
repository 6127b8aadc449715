use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bottlenet_db::Database;
use bottlenet_db::models::{MessageRow, ThreadRow, UserRow};
use bottlenet_types::Id;
use bottlenet_types::models::{Message, NewMessage, NewUser, Thread, User};
use tracing::warn;

use crate::error::BottleError;

/// Persistence port for the three collections: users, messages, threads.
///
/// Calls are blocking; the engine drives them through [`Bounded`], which
/// moves them off the async runtime and enforces the per-operation timeout.
pub trait Gateway: Send + Sync + 'static {
    // -- Users --
    fn insert_user(&self, user: NewUser) -> Result<User>;
    fn find_user(&self, id: &Id) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn count_users(&self, exclude: Option<&Id>) -> Result<u64>;
    /// Skip `offset` users of the filtered set in store order and take one.
    fn user_at(&self, exclude: Option<&Id>, offset: u64) -> Result<Option<User>>;
    /// Set-add. Matching no user is not an error.
    fn add_kept_message(&self, user_id: &Id, message_id: &Id) -> Result<()>;

    // -- Messages --
    fn insert_message(&self, message: NewMessage) -> Result<Message>;
    fn find_message(&self, id: &Id) -> Result<Option<Message>>;
    fn set_recipient(&self, message_id: &Id, recipient_id: &Id) -> Result<()>;
    fn set_thread(&self, message_id: &Id, thread_id: &Id) -> Result<()>;

    // -- Threads --
    fn insert_thread(&self, participants: [Id; 2], first_message: &Id) -> Result<Thread>;
    fn find_thread(&self, id: &Id) -> Result<Option<Thread>>;
    fn append_to_thread(&self, thread_id: &Id, message_id: &Id) -> Result<()>;
}

impl Gateway for Database {
    fn insert_user(&self, user: NewUser) -> Result<User> {
        user_from_row(self.create_user(&user.name, &user.email)?)
    }

    fn find_user(&self, id: &Id) -> Result<Option<User>> {
        self.get_user(&id.to_hex())?.map(user_from_row).transpose()
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Database::list_users(self)?.into_iter().map(user_from_row).collect()
    }

    fn count_users(&self, exclude: Option<&Id>) -> Result<u64> {
        let exclude = exclude.map(Id::to_hex);
        Database::count_users(self, exclude.as_deref())
    }

    fn user_at(&self, exclude: Option<&Id>, offset: u64) -> Result<Option<User>> {
        let exclude = exclude.map(Id::to_hex);
        self.user_at_offset(exclude.as_deref(), offset)?.map(user_from_row).transpose()
    }

    fn add_kept_message(&self, user_id: &Id, message_id: &Id) -> Result<()> {
        let written = Database::add_kept_message(self, &user_id.to_hex(), &message_id.to_hex())?;
        if written == 0 {
            tracing::debug!("keep {} for {}: nothing written", message_id, user_id);
        }
        Ok(())
    }

    fn insert_message(&self, message: NewMessage) -> Result<Message> {
        let row = Database::insert_message(
            self,
            &message.sender_id.to_hex(),
            &message.recipient_id.to_hex(),
            &message.content,
            message.timestamp,
        )?;
        message_from_row(row)
    }

    fn find_message(&self, id: &Id) -> Result<Option<Message>> {
        self.get_message(&id.to_hex())?.map(message_from_row).transpose()
    }

    fn set_recipient(&self, message_id: &Id, recipient_id: &Id) -> Result<()> {
        if !self.set_message_recipient(&message_id.to_hex(), &recipient_id.to_hex())? {
            anyhow::bail!("no message {} to update", message_id);
        }
        Ok(())
    }

    fn set_thread(&self, message_id: &Id, thread_id: &Id) -> Result<()> {
        if !self.set_message_thread(&message_id.to_hex(), &thread_id.to_hex())? {
            anyhow::bail!("no message {} to link to thread {}", message_id, thread_id);
        }
        Ok(())
    }

    fn insert_thread(&self, participants: [Id; 2], first_message: &Id) -> Result<Thread> {
        let row = self.create_thread(
            &participants[0].to_hex(),
            &participants[1].to_hex(),
            &first_message.to_hex(),
        )?;
        thread_from_row(row)
    }

    fn find_thread(&self, id: &Id) -> Result<Option<Thread>> {
        self.get_thread(&id.to_hex())?.map(thread_from_row).transpose()
    }

    fn append_to_thread(&self, thread_id: &Id, message_id: &Id) -> Result<()> {
        if !self.append_thread_message(&thread_id.to_hex(), &message_id.to_hex())? {
            anyhow::bail!("no thread {} to append to", thread_id);
        }
        Ok(())
    }
}

fn parse_stored(raw: &str, column: &str) -> Result<Id> {
    Id::parse(raw).with_context(|| format!("corrupt {} '{}'", column, raw))
}

fn user_from_row(row: UserRow) -> Result<User> {
    Ok(User {
        id: parse_stored(&row.id, "user id")?,
        kept_messages: row
            .kept_messages
            .iter()
            .map(|raw| parse_stored(raw, "kept message id"))
            .collect::<Result<_>>()?,
        name: row.name,
        email: row.email,
    })
}

fn message_from_row(row: MessageRow) -> Result<Message> {
    Ok(Message {
        id: parse_stored(&row.id, "message id")?,
        sender_id: parse_stored(&row.sender_id, "sender_id")?,
        recipient_id: parse_stored(&row.recipient_id, "recipient_id")?,
        thread_id: row
            .thread_id
            .as_deref()
            .map(|raw| parse_stored(raw, "thread_id"))
            .transpose()?,
        content: row.content,
        timestamp: row.timestamp,
    })
}

fn thread_from_row(row: ThreadRow) -> Result<Thread> {
    Ok(Thread {
        id: parse_stored(&row.id, "thread id")?,
        participants: [
            parse_stored(&row.participant_a, "participant_a")?,
            parse_stored(&row.participant_b, "participant_b")?,
        ],
        messages: row
            .messages
            .iter()
            .map(|raw| parse_stored(raw, "thread message id"))
            .collect::<Result<_>>()?,
    })
}

/// Shared gateway handle whose every call runs on the blocking pool and is
/// cut off after a fixed timeout.
pub struct Bounded<G> {
    gateway: Arc<G>,
    timeout: Duration,
}

impl<G> Clone for Bounded<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            timeout: self.timeout,
        }
    }
}

impl<G: Gateway> Bounded<G> {
    pub fn new(gateway: Arc<G>, timeout: Duration) -> Self {
        Self { gateway, timeout }
    }

    /// Run one store operation. An elapsed timeout abandons the result; the
    /// blocking call itself is left to finish in the background.
    pub async fn call<T, F>(&self, op: &'static str, f: F) -> crate::Result<T>
    where
        F: FnOnce(&G) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let gateway = self.gateway.clone();
        let task = tokio::task::spawn_blocking(move || f(&*gateway));

        match tokio::time::timeout(self.timeout, task).await {
            Err(_) => {
                warn!("Store operation '{}' timed out after {:?}", op, self.timeout);
                Err(BottleError::Timeout {
                    op,
                    after: self.timeout,
                })
            }
            Ok(Err(join)) => Err(BottleError::Persistence {
                op,
                source: anyhow::anyhow!("blocking task failed: {}", join),
            }),
            Ok(Ok(result)) => result.map_err(|source| BottleError::Persistence { op, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(timeout: Duration) -> Bounded<Database> {
        Bounded::new(Arc::new(Database::open_in_memory().unwrap()), timeout)
    }

    #[tokio::test]
    async fn slow_operations_time_out() {
        let store = bounded(Duration::from_millis(20));
        let err = store
            .call("stall", |_| {
                std::thread::sleep(Duration::from_millis(300));
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BottleError::Timeout { op: "stall", .. }));
    }

    #[tokio::test]
    async fn store_errors_carry_the_operation_name() {
        let store = bounded(Duration::from_secs(5));
        let err = store
            .call("set_recipient", |g| g.set_recipient(&Id::generate(), &Id::generate()))
            .await
            .unwrap_err();

        match err {
            BottleError::Persistence { op, source } => {
                assert_eq!(op, "set_recipient");
                assert!(source.to_string().contains("no message"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn rows_convert_to_domain_models() {
        let store = bounded(Duration::from_secs(5));
        let user = store
            .call("insert_user", |g| {
                g.insert_user(NewUser {
                    name: "TestUser1".into(),
                    email: "test1@example.com".into(),
                })
            })
            .await
            .unwrap();

        let id = user.id;
        let found = store.call("find_user", move |g| g.find_user(&id)).await.unwrap();
        assert_eq!(found, Some(user));
    }
}
