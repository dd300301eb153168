//! Scale (rotation schedule) endpoints
//!
//! Scales go out with song and soloist snapshots for every assignment.
//! On update, a `songs` array replaces the whole assignment list.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use worship_common::api::types::MessageResponse;
use worship_common::api::auth::Principal;
use worship_common::db::{
    scale_view, EntityKind, NewScale, RecordId, Scale, ScalePatch, ScaleView, SongAssignment,
};

use super::params::{non_empty, parse_date, parse_id};
use super::ApiError;
use crate::AppState;

/// One assignment as received; both ids required
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    #[serde(alias = "musicId")]
    pub song_id: Option<RecordId>,
    pub soloist_id: Option<RecordId>,
}

/// Body of POST and PUT /scales
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub songs: Option<Vec<AssignmentRequest>>,
}

fn to_assignments(songs: Vec<AssignmentRequest>) -> Result<Vec<SongAssignment>, ApiError> {
    songs
        .into_iter()
        .map(|a| match (a.song_id, a.soloist_id) {
            (Some(song_id), Some(soloist_id)) => Ok(SongAssignment {
                song_id,
                soloist_id,
            }),
            _ => Err(ApiError::BadRequest(
                "Each song must have songId and soloistId".to_string(),
            )),
        })
        .collect()
}

async fn view(state: &AppState, scale: &Scale) -> ScaleView {
    let tables = state.store.read().await;
    scale_view(&tables, scale)
}

/// GET /scales
pub async fn list_scales(State(state): State<AppState>) -> Json<Value> {
    let tables = state.store.read().await;
    let scales: Vec<ScaleView> = tables
        .scales()
        .iter()
        .map(|s| scale_view(&tables, s))
        .collect();
    Json(json!({ "scales": scales }))
}

/// GET /scales/:id
pub async fn get_scale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScaleView>, ApiError> {
    let id = parse_id(&id)?;
    let tables = state.store.read().await;
    let scale = tables
        .scales()
        .get(id)
        .ok_or(ApiError::NotFound(EntityKind::Scale))?;
    Ok(Json(scale_view(&tables, scale)))
}

/// POST /scales
pub async fn create_scale(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<ScaleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body?;

    let (Some(name), Some(date), Some(songs)) = (
        non_empty(req.name),
        non_empty(req.date),
        req.songs.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::MissingFields(
            "Name, date and at least one song are required".to_string(),
        ));
    };

    let date = parse_date(&date)?;
    let songs = to_assignments(songs)?;

    let scale = state
        .store
        .create_scale(NewScale { name, date, songs })
        .await?;

    info!(scale_id = scale.id, by = principal.id, "Scale created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Scale created successfully",
            "scale": view(&state, &scale).await,
        })),
    ))
}

/// PUT /scales/:id
///
/// An empty `songs` array is passed through and rejected by the store.
pub async fn update_scale(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<ScaleRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = body?;

    if state.store.get_scale(id).await.is_none() {
        return Err(ApiError::NotFound(EntityKind::Scale));
    }

    let patch = ScalePatch {
        name: non_empty(req.name),
        date: non_empty(req.date).map(|d| parse_date(&d)).transpose()?,
        songs: req.songs.map(to_assignments).transpose()?,
    };

    let scale = state
        .store
        .update_scale(id, patch)
        .await?
        .ok_or(ApiError::NotFound(EntityKind::Scale))?;

    info!(scale_id = scale.id, by = principal.id, "Scale updated");

    Ok(Json(json!({
        "message": "Scale updated successfully",
        "scale": view(&state, &scale).await,
    })))
}

/// DELETE /scales/:id
pub async fn delete_scale(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;

    if !state.store.delete_scale(id).await {
        return Err(ApiError::NotFound(EntityKind::Scale));
    }

    info!(scale_id = id, by = principal.id, "Scale deleted");

    Ok(Json(MessageResponse::new("Scale deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_assignments_requires_both_ids() {
        let ok = to_assignments(vec![AssignmentRequest {
            song_id: Some(1),
            soloist_id: Some(2),
        }])
        .unwrap();
        assert_eq!(ok, vec![SongAssignment { song_id: 1, soloist_id: 2 }]);

        let missing = to_assignments(vec![AssignmentRequest {
            song_id: Some(1),
            soloist_id: None,
        }]);
        assert!(matches!(missing, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_scale_request_accepts_music_id() {
        let req: ScaleRequest = serde_json::from_str(
            r#"{"name":"Sunday","date":"2024-01-07","songs":[{"musicId":1,"soloistId":2}]}"#,
        )
        .unwrap();
        let songs = to_assignments(req.songs.unwrap()).unwrap();
        assert_eq!(songs[0].song_id, 1);
    }
}
