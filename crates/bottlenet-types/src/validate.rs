//! Presence checks on caller-supplied fields. Anything stricter than
//! "present and not blank" is out of scope.

use thiserror::Error;

use crate::id::{Id, InvalidId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid {field}: {source}")]
    MalformedId {
        field: &'static str,
        #[source]
        source: InvalidId,
    },
}

pub fn require_present(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Ok(())
}

/// Parse an id supplied in a path segment or query parameter.
pub fn parse_id(field: &'static str, raw: &str) -> Result<Id, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::Missing(field));
    }
    Id::parse(raw).map_err(|source| ValidationError::MalformedId { field, source })
}
