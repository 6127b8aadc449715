//! Shared types for the Bottlenet backend: domain models, wire DTOs and the
//! opaque identifier used across every collection.

pub mod api;
pub mod id;
pub mod models;
pub mod validate;

pub use id::Id;
