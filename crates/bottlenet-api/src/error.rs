use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use bottlenet_core::{BottleError, ErrorKind};
use bottlenet_types::api::ErrorResponse;
use bottlenet_types::validate::ValidationError;

/// Handler error: an engine failure or a request that never reached the engine.
#[derive(Debug)]
pub enum ApiError {
    Engine(BottleError),
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Engine(e) => match e.kind() {
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::NoUsersAvailable | ErrorKind::PersistenceFailure => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl From<BottleError> for ApiError {
    fn from(e: BottleError) -> Self {
        Self::Engine(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Engine(BottleError::InvalidInput(e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("invalid request payload: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(format!("invalid query: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Engine(e) => e.to_string(),
        };

        if status.is_server_error() {
            error!("{} -> {}", message, status);
        } else {
            warn!("{} -> {}", message, status);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
