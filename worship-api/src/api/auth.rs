//! Authentication middleware for worship-api
//!
//! The access control gate. Every protected request needs a valid
//! `Authorization: Bearer <token>`; POST/PUT/PATCH/DELETE additionally need
//! an admin principal.
//!
//! Outcomes:
//! - no token, or a token that fails verification: 401
//! - valid token, insufficient privilege: 403
//!
//! On success the verified [`Principal`] is placed in request extensions for
//! handlers to pick up with `Extension<Principal>`.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use tracing::warn;
use worship_common::api::auth::{verify_token, Principal};

use super::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// **Note:** Applied to protected routes only. `/`, `/health` and
/// `/auth/login` do NOT use this middleware.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).ok_or(ApiError::MissingToken)?;

    let principal = verify_token(token, &state.auth.secret).map_err(|e| {
        warn!("Token rejected on {}: {}", request.uri().path(), e);
        ApiError::InvalidToken(e)
    })?;

    if is_write(request.method()) && !principal.is_admin() {
        warn!(
            member_id = principal.id,
            "Non-admin {} {} refused",
            request.method(),
            request.uri().path()
        );
        return Err(ApiError::Forbidden);
    }

    request.extensions_mut().insert::<Principal>(principal);

    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>` (scheme case-insensitive)
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Methods gated behind the admin role
fn is_write(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers_with("bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer_token(&headers_with("Basic dXNlcg==")), None);
        assert_eq!(bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(bearer_token(&headers_with("abc.def")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_write_methods() {
        assert!(!is_write(&Method::GET));
        assert!(!is_write(&Method::HEAD));
        assert!(is_write(&Method::POST));
        assert!(is_write(&Method::PUT));
        assert!(is_write(&Method::PATCH));
        assert!(is_write(&Method::DELETE));
    }
}
