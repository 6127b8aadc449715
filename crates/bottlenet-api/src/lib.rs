//! HTTP transport for Bottlenet: maps routes onto the lifecycle engine and
//! serializes results as JSON.

pub mod error;
pub mod hello;
pub mod messages;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use bottlenet_core::Engine;
use bottlenet_db::Database;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub engine: Engine<Database>,
}

impl AppStateInner {
    pub fn new(engine: Engine<Database>) -> AppState {
        Arc::new(Self { engine })
    }
}

/// All routes, without transport layers (CORS, tracing) applied.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/hello", get(hello::hello))
        .route("/users", post(users::create_user).get(users::list_users))
        .route("/messages/new", post(messages::create_message))
        .route("/messages/{id}", get(messages::get_message))
        .route("/messages/{id}/respond", post(messages::respond_to_message))
        .route("/messages/{id}/drop", post(messages::drop_message))
        .route("/messages/{id}/keep", get(messages::keep_message))
        .route("/threads/{id}", get(messages::get_thread));

    Router::new()
        .nest("/api", api)
        .route("/health", get(hello::health))
        .with_state(state)
}
