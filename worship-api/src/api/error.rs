//! HTTP error mapping
//!
//! Every failure leaves the service as `{"error": ..., "message": ...}`.
//! Auth failures keep "who are you" (401) apart from "not allowed" (403).

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use worship_common::api::types::ErrorResponse;
use worship_common::api::CredentialError;
use worship_common::db::{EntityKind, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    /// No `Authorization: Bearer` header
    #[error("Token not provided")]
    MissingToken,

    /// Token failed signature or expiry checks
    #[error("Invalid token: {0}")]
    InvalidToken(CredentialError),

    /// Valid principal, but not an administrator
    #[error("Access denied")]
    Forbidden,

    /// Login with unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Required body fields absent or empty
    #[error("{0}")]
    MissingFields(String),

    #[error("Invalid access level: {0}")]
    InvalidAccessLevel(String),

    /// Malformed body, path id or field value
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(EntityKind),

    #[error("Route not found")]
    RouteNotFound,

    /// Write rejected by the store
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Too many requests")]
    RateLimited { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn entity_title(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Member => "Member",
        EntityKind::Song => "Song",
        EntityKind::Scale => "Scale",
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingToken | ApiError::InvalidToken(_) | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::MissingFields(_)
            | ApiError::InvalidAccessLevel(_)
            | ApiError::BadRequest(_)
            | ApiError::Store(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::MissingToken => {
                ErrorResponse::new("Token not provided", "Authentication token is required")
            }
            ApiError::InvalidToken(_) => ErrorResponse::new(
                "Invalid token",
                "Authentication token is invalid or expired",
            ),
            ApiError::Forbidden => ErrorResponse::new(
                "Access denied",
                "Only administrators can perform this operation",
            ),
            ApiError::InvalidCredentials => {
                ErrorResponse::new("Invalid credentials", "Incorrect email or password")
            }
            ApiError::MissingFields(msg) => ErrorResponse::new("Required fields", msg.as_str()),
            ApiError::InvalidAccessLevel(_) => ErrorResponse::new(
                "Invalid access level",
                "Access level must be \"admin\" or \"common\"",
            ),
            ApiError::BadRequest(msg) => ErrorResponse::new("Invalid data", msg.as_str()),
            ApiError::NotFound(kind) => {
                let title = entity_title(*kind);
                ErrorResponse::new(
                    format!("{} not found", title),
                    format!("{} with the specified ID was not found", title),
                )
            }
            ApiError::RouteNotFound => {
                ErrorResponse::new("Route not found", "The requested route does not exist")
            }
            ApiError::Store(err) => match err {
                StoreError::ReferenceNotFound { field, .. } => {
                    ErrorResponse::new(format!("{} not found", field), err.to_string())
                }
                StoreError::DuplicateEmail(_) => {
                    ErrorResponse::new("Email already registered", err.to_string())
                }
                StoreError::Validation(msg) => ErrorResponse::new("Invalid data", msg.as_str()),
            },
            ApiError::RateLimited { retry_after_secs } => ErrorResponse::new(
                "Too many requests",
                format!("Rate limit exceeded, retry in {} seconds", retry_after_secs),
            ),
            ApiError::Internal(_) => {
                ErrorResponse::new("Internal server error", "The request could not be processed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(msg) = &self {
            error!("Internal error: {}", msg);
        }

        let status = self.status();
        let mut response = (status, Json(self.body())).into_response();

        if let ApiError::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}
