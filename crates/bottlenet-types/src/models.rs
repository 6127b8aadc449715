use serde::{Deserialize, Serialize};

use crate::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub name: String,
    pub email: String,
    /// Set of bookmarked message ids. Never holds duplicates.
    #[serde(default)]
    pub kept_messages: Vec<Id>,
}

/// A "bottle message". The recipient is picked at random, never by the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Id,
    pub sender_id: Id,
    pub recipient_id: Id,
    pub content: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    /// Unset until the message is first responded to.
    pub thread_id: Option<Id>,
}

/// Conversation spawned by the first response to a bottle message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: Id,
    /// Original sender and original recipient, in no particular order.
    pub participants: [Id; 2],
    /// Message ids in conversation order.
    pub messages: Vec<Id>,
}

/// User fields supplied by the caller; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Message fields ready to persist; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Id,
    pub recipient_id: Id,
    pub content: String,
    pub timestamp: i64,
}
