/// Database row types — these map directly to SQLite rows.
/// Distinct from bottlenet-types models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub kept_messages: Vec<String>,
}

pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    pub timestamp: i64,
    pub thread_id: Option<String>,
}

pub struct ThreadRow {
    pub id: String,
    pub participant_a: String,
    pub participant_b: String,
    pub messages: Vec<String>,
}
