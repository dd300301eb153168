//! Shared API request/response types

use serde::{Deserialize, Serialize};

use crate::db::PublicMember;

// ========================================
// Login
// ========================================

/// Body of `POST /auth/login`
///
/// Both fields are optional at the parse level so that a missing field
/// gets the same 400 as an empty one.
///
/// # Examples
///
/// ```
/// use worship_common::api::types::LoginRequest;
///
/// let req: LoginRequest =
///     serde_json::from_str(r#"{"email":"joao@banda.com","password":"123456"}"#).unwrap();
/// assert_eq!(req.email.as_deref(), Some("joao@banda.com"));
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Successful login: bearer token plus the member it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicMember,
}

// ========================================
// Generic Responses
// ========================================

/// Error body returned by every failing endpoint
///
/// # Examples
///
/// ```
/// use worship_common::api::types::ErrorResponse;
///
/// let error = ErrorResponse::new("Access denied", "Only administrators can perform this operation");
/// let json = serde_json::to_value(&error).unwrap();
/// assert_eq!(json["error"], "Access denied");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error title
    pub error: String,

    /// Human-readable detail
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Body carrying only a confirmation message (e.g. after delete)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
