use std::time::Duration;

use bottlenet_types::Id;
use bottlenet_types::validate::ValidationError;
use thiserror::Error;

/// Errors returned by the lifecycle engine and the recipient selector.
#[derive(Error, Debug)]
pub enum BottleError {
    #[error("sender {0} not found")]
    SenderNotFound(Id),

    #[error("message {0} not found")]
    MessageNotFound(Id),

    #[error("thread {0} not found")]
    ThreadNotFound(Id),

    /// The selector found zero eligible recipients.
    #[error("no users available")]
    NoUsersAvailable,

    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Any failure while creating, loading or extending the thread of a response.
    #[error("failed to add message to thread: {0}")]
    ThreadUpdateFailed(#[source] Box<BottleError>),

    #[error("failed to update {what}: {source}")]
    UpdateFailed {
        what: &'static str,
        #[source]
        source: Box<BottleError>,
    },

    #[error("store operation '{op}' timed out after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    #[error("store operation '{op}' failed: {source}")]
    Persistence {
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

/// Coarse classification the transport layer maps to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NoUsersAvailable,
    InvalidInput,
    PersistenceFailure,
}

impl BottleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SenderNotFound(_) | Self::MessageNotFound(_) | Self::ThreadNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::NoUsersAvailable => ErrorKind::NoUsersAvailable,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::ThreadUpdateFailed(_)
            | Self::UpdateFailed { .. }
            | Self::Timeout { .. }
            | Self::Persistence { .. } => ErrorKind::PersistenceFailure,
        }
    }

    pub(crate) fn thread_update(self) -> Self {
        match self {
            already @ Self::ThreadUpdateFailed(_) => already,
            other => Self::ThreadUpdateFailed(Box::new(other)),
        }
    }

    pub(crate) fn update(what: &'static str) -> impl FnOnce(Self) -> Self {
        move |source| Self::UpdateFailed {
            what,
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, BottleError>;
