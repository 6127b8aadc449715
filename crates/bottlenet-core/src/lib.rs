//! Routing and threading rules for bottle messages.
//!
//! [`Engine`] owns the message lifecycle (create, respond, drop, keep) and
//! reaches storage only through a [`Gateway`], with every store call bounded
//! by a timeout.

pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod selector;

pub use error::{BottleError, ErrorKind, Result};
pub use gateway::{Bounded, Gateway};
pub use lifecycle::Engine;
pub use selector::RecipientSelector;
