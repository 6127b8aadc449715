use std::sync::Arc;
use std::time::Duration;

use bottlenet_types::Id;
use bottlenet_types::models::{Message, NewMessage, NewUser, Thread, User};
use bottlenet_types::validate::require_present;
use tracing::{debug, error, info};

use crate::error::{BottleError, Result};
use crate::gateway::{Bounded, Gateway};
use crate::selector::RecipientSelector;

/// Message lifecycle: create, respond, drop, keep.
///
/// Holds the only handle to storage; construct once at startup and share.
/// Nothing here spans more than one store write atomically.
pub struct Engine<G> {
    store: Bounded<G>,
    selector: RecipientSelector<G>,
}

impl<G> Clone for Engine<G> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            selector: self.selector.clone(),
        }
    }
}

impl<G: Gateway> Engine<G> {
    pub fn new(gateway: Arc<G>, op_timeout: Duration) -> Self {
        let store = Bounded::new(gateway, op_timeout);
        Self {
            selector: RecipientSelector::new(store.clone()),
            store,
        }
    }

    // -- Users --

    pub async fn create_user(&self, name: String, email: String) -> Result<User> {
        require_present("name", &name)?;
        require_present("email", &email)?;

        let user = self
            .store
            .call("insert_user", move |g| g.insert_user(NewUser { name, email }))
            .await?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.store.call("list_users", |g| g.list_users()).await
    }

    // -- Messages --

    /// Send a new bottle message from `sender_id` to a random other user.
    pub async fn create_message(&self, sender_id: Id, content: String) -> Result<Message> {
        require_present("content", &content)?;

        let sender = self
            .store
            .call("find_user", move |g| g.find_user(&sender_id))
            .await?
            .ok_or(BottleError::SenderNotFound(sender_id))?;

        let recipient = self.selector.pick(Some(sender.id)).await?;

        let draft = NewMessage {
            sender_id: sender.id,
            recipient_id: recipient.id,
            content,
            timestamp: now(),
        };
        let message = self
            .store
            .call("insert_message", move |g| g.insert_message(draft))
            .await?;

        info!("Message {} cast from {} to {}", message.id, message.sender_id, message.recipient_id);
        Ok(message)
    }

    /// Reply to a message. The respondent (original recipient) becomes the
    /// sender; the thread is created on the first response.
    ///
    /// Known gaps, kept as observed: the reply's own `thread_id` is never
    /// set, only its id is appended to the thread; two concurrent first
    /// responses may each create a thread; a failure after the thread is
    /// created is logged and left in place.
    pub async fn respond(&self, original_id: Id, content: String) -> Result<Message> {
        require_present("content", &content)?;

        let original = self.find_message(original_id).await?;

        let draft = NewMessage {
            sender_id: original.recipient_id,
            recipient_id: original.sender_id,
            content,
            timestamp: now(),
        };

        self.thread_response(&original, draft).await.map_err(|e| {
            error!("Failed to thread response to {}: {}", original.id, e);
            e.thread_update()
        })
    }

    async fn thread_response(&self, original: &Message, draft: NewMessage) -> Result<Message> {
        let thread = match original.thread_id {
            Some(thread_id) => self.find_thread(thread_id).await?,
            None => {
                // check-then-act without a lock
                let participants = [original.sender_id, original.recipient_id];
                let first = original.id;
                let thread = self
                    .store
                    .call("insert_thread", move |g| g.insert_thread(participants, &first))
                    .await?;

                let thread_id = thread.id;
                self.store
                    .call("set_thread", move |g| g.set_thread(&first, &thread_id))
                    .await?;

                debug!("Opened thread {} for message {}", thread.id, original.id);
                thread
            }
        };

        let response = self
            .store
            .call("insert_message", move |g| g.insert_message(draft))
            .await?;

        let (thread_id, response_id) = (thread.id, response.id);
        self.store
            .call("append_to_thread", move |g| g.append_to_thread(&thread_id, &response_id))
            .await?;

        info!("Message {} answered by {} in thread {}", original.id, response.id, thread.id);
        Ok(response)
    }

    /// Reroute a message to a new random recipient, excluding its sender.
    /// Identity, content, timestamp and thread stay as they are.
    pub async fn drop_message(&self, message_id: Id) -> Result<Message> {
        let mut message = self.find_message(message_id).await?;

        let recipient = self.selector.pick(Some(message.sender_id)).await?;

        let new_recipient = recipient.id;
        self.store
            .call("set_recipient", move |g| g.set_recipient(&message_id, &new_recipient))
            .await
            .map_err(BottleError::update("message recipient"))?;

        info!("Message {} dropped: {} -> {}", message.id, message.recipient_id, new_recipient);
        message.recipient_id = new_recipient;
        Ok(message)
    }

    /// Bookmark a message for a user. Idempotent.
    ///
    /// Neither id is checked for existence; keeping for an unknown user is a
    /// silent no-op.
    pub async fn keep_message(&self, message_id: Id, user_id: Id) -> Result<()> {
        self.store
            .call("add_kept_message", move |g| g.add_kept_message(&user_id, &message_id))
            .await
            .map_err(BottleError::update("kept messages"))?;

        debug!("User {} kept message {}", user_id, message_id);
        Ok(())
    }

    // -- Lookups --

    pub async fn find_message(&self, id: Id) -> Result<Message> {
        self.store
            .call("find_message", move |g| g.find_message(&id))
            .await?
            .ok_or(BottleError::MessageNotFound(id))
    }

    pub async fn find_thread(&self, id: Id) -> Result<Thread> {
        self.store
            .call("find_thread", move |g| g.find_thread(&id))
            .await?
            .ok_or(BottleError::ThreadNotFound(id))
    }

    pub async fn find_user(&self, id: Id) -> Result<Option<User>> {
        self.store.call("find_user", move |g| g.find_user(&id)).await
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
