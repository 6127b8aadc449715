use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use bottlenet_types::api::{CreateMessageRequest, KeepQuery, RespondRequest};
use bottlenet_types::validate::parse_id;

use crate::AppState;
use crate::error::ApiError;

/// POST /api/messages/new — cast a bottle message to a random user.
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    req.validate()?;

    let message = state.engine.create_message(req.sender_id, req.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/messages/{id}/respond — reply to the sender of a message.
pub async fn respond_to_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RespondRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let message_id = parse_id("message id", &id)?;
    let Json(req) = payload?;
    req.validate()?;

    let response = state.engine.respond(message_id, req.content).await?;
    Ok(Json(response))
}

/// POST /api/messages/{id}/drop — throw the message back to sea.
pub async fn drop_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let message_id = parse_id("message id", &id)?;

    let message = state.engine.drop_message(message_id).await?;
    Ok(Json(message))
}

/// GET /api/messages/{id}/keep?userId=... — bookmark a message for a user.
pub async fn keep_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<KeepQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let message_id = parse_id("message id", &id)?;
    let Query(query) = query?;
    let user_id = parse_id("user id", &query.user_id)?;

    state.engine.keep_message(message_id, user_id).await?;
    Ok((StatusCode::OK, "Message successfully kept"))
}

/// GET /api/messages/{id}
pub async fn get_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let message_id = parse_id("message id", &id)?;

    let message = state.engine.find_message(message_id).await?;
    Ok(Json(message))
}

/// GET /api/threads/{id}
pub async fn get_thread(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let thread_id = parse_id("thread id", &id)?;

    let thread = state.engine.find_thread(thread_id).await?;
    Ok(Json(thread))
}
