use serde::{Deserialize, Serialize};

use crate::Id;
use crate::validate::{ValidationError, require_present};

// -- Hello --

#[derive(Debug, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_present("name", &self.name)?;
        require_present("email", &self.email)?;
        Ok(())
    }
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMessageRequest {
    pub sender_id: Id,
    pub content: String,
}

impl CreateMessageRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_present("content", &self.content)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RespondRequest {
    pub content: String,
}

impl RespondRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_present("content", &self.content)
    }
}

/// Query string of `GET /api/messages/{id}/keep`. The id stays raw so the
/// handler can report a malformed value as bad input.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeepQuery {
    #[serde(default)]
    pub user_id: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
