//! Credential issuance
//!
//! POST /auth/login exchanges email + password for a bearer token.
//! Unknown email and wrong password are reported the same way.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, warn};
use worship_common::api::auth::{authenticate, issue_token};
use worship_common::api::types::{LoginRequest, LoginResponse};

use super::params::non_empty;
use super::ApiError;
use crate::AppState;

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = body?;

    let (Some(email), Some(password)) = (non_empty(req.email), non_empty(req.password)) else {
        return Err(ApiError::MissingFields(
            "Email and password are required".to_string(),
        ));
    };

    let Some(member) = authenticate(&state.store, &email, &password).await else {
        warn!("Failed login for {}", email);
        return Err(ApiError::InvalidCredentials);
    };

    let user = member.public();
    let token = issue_token(&user, &state.auth.secret, state.auth.token_ttl)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(member_id = user.id, "Login succeeded");

    Ok(Json(LoginResponse { token, user }))
}
