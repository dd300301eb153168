//! Member endpoints
//!
//! Members never leave the service with their password hash; every
//! response goes through `member_view`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use worship_common::api::types::MessageResponse;
use worship_common::api::auth::{hash_password, Principal};
use worship_common::db::{member_view, EntityKind, MemberPatch, NewMember, PublicMember};

use super::params::{non_empty, parse_access_level, parse_id};
use super::ApiError;
use crate::AppState;

/// Body of POST and PUT /members
///
/// All fields optional at parse level; POST requires every one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub voice_type: Option<String>,
    pub access_level: Option<String>,
}

/// bcrypt is CPU-bound; keep it off the async workers
async fn hash_off_thread(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// GET /members
pub async fn list_members(State(state): State<AppState>) -> Json<Value> {
    let tables = state.store.read().await;
    let members: Vec<PublicMember> = tables.members().iter().map(member_view).collect();
    Json(json!({ "members": members }))
}

/// GET /members/:id
pub async fn get_member(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicMember>, ApiError> {
    let id = parse_id(&id)?;
    let member = state
        .store
        .get_member(id)
        .await
        .ok_or(ApiError::NotFound(EntityKind::Member))?;
    Ok(Json(member_view(&member)))
}

/// POST /members
pub async fn create_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<MemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body?;

    let (Some(name), Some(email), Some(password), Some(voice_type), Some(access_level)) = (
        non_empty(req.name),
        non_empty(req.email),
        non_empty(req.password),
        non_empty(req.voice_type),
        non_empty(req.access_level),
    ) else {
        return Err(ApiError::MissingFields(
            "All fields are required".to_string(),
        ));
    };

    let access_level = parse_access_level(&access_level)?;

    let member = state
        .store
        .create_member(NewMember {
            name,
            voice_type,
            email,
            password_hash: hash_off_thread(password).await?,
            access_level,
        })
        .await?;

    info!(member_id = member.id, by = principal.id, "Member created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Member created successfully",
            "member": member_view(&member),
        })),
    ))
}

/// PUT /members/:id
///
/// Empty strings count as "not provided". A new password is re-hashed.
pub async fn update_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<MemberRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = body?;

    if state.store.get_member(id).await.is_none() {
        return Err(ApiError::NotFound(EntityKind::Member));
    }

    let access_level = non_empty(req.access_level)
        .map(|raw| parse_access_level(&raw))
        .transpose()?;

    let patch = MemberPatch {
        name: non_empty(req.name),
        voice_type: non_empty(req.voice_type),
        email: non_empty(req.email),
        password_hash: match non_empty(req.password) {
            Some(password) => Some(hash_off_thread(password).await?),
            None => None,
        },
        access_level,
    };

    let member = state
        .store
        .update_member(id, patch)
        .await?
        .ok_or(ApiError::NotFound(EntityKind::Member))?;

    info!(member_id = member.id, by = principal.id, "Member updated");

    Ok(Json(json!({
        "message": "Member updated successfully",
        "member": member_view(&member),
    })))
}

/// DELETE /members/:id
///
/// Songs and scales that reference this member keep the reference.
pub async fn delete_member(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;

    if !state.store.delete_member(id).await {
        return Err(ApiError::NotFound(EntityKind::Member));
    }

    info!(member_id = id, by = principal.id, "Member deleted");

    Ok(Json(MessageResponse::new("Member deleted successfully")))
}
