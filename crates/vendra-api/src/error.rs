use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use vendra_db::DbError;
use vendra_types::api::ErrorResponse;

/// Ways a signup can fail, each with its own response.
#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    #[error("Too many requests. Please try again in a minute.")]
    RateLimited,

    #[error("{0}")]
    ValidationFailed(String),

    #[error("This email is already on the waitlist")]
    DuplicateEmail,

    #[error("backend failure: {0:#}")]
    Backend(#[from] anyhow::Error),
}

impl SignupError {
    pub fn status(&self) -> StatusCode {
        match self {
            SignupError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            SignupError::ValidationFailed(_) | SignupError::DuplicateEmail => StatusCode::BAD_REQUEST,
            SignupError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbError> for SignupError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateEmail => SignupError::DuplicateEmail,
            DbError::Backend(e) => SignupError::Backend(e),
        }
    }
}

impl IntoResponse for SignupError {
    fn into_response(self) -> Response {
        let message = match &self {
            SignupError::Backend(e) => {
                error!("Waitlist error: {:#}", e);
                "Failed to join waitlist. Please try again.".to_string()
            }
            other => other.to_string(),
        };

        (self.status(), Json(ErrorResponse::new(message))).into_response()
    }
}
