//! Repertoire endpoints (`/music`)
//!
//! Songs go out with a snapshot of their soloist attached.

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
use worship_common::db::{song_view, EntityKind, NewSong, RecordId, Song, SongPatch, SongView};

use super::params::{non_empty, parse_id};
use super::ApiError;
use crate::AppState;

/// Body of POST and PUT /music
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongRequest {
    pub name: Option<String>,
    pub key: Option<String>,
    pub version_link: Option<String>,
    pub lyrics: Option<String>,
    pub soloist_id: Option<RecordId>,
}

async fn view(state: &AppState, song: &Song) -> SongView {
    let tables = state.store.read().await;
    song_view(&tables, song)
}

/// GET /music
pub async fn list_songs(State(state): State<AppState>) -> Json<Value> {
    let tables = state.store.read().await;
    let music: Vec<SongView> = tables
        .songs()
        .iter()
        .map(|s| song_view(&tables, s))
        .collect();
    Json(json!({ "music": music }))
}

/// GET /music/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SongView>, ApiError> {
    let id = parse_id(&id)?;
    let tables = state.store.read().await;
    let song = tables
        .songs()
        .get(id)
        .ok_or(ApiError::NotFound(EntityKind::Song))?;
    Ok(Json(song_view(&tables, song)))
}

/// POST /music
pub async fn create_song(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Result<Json<SongRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = body?;

    let (Some(name), Some(key), Some(version_link), Some(lyrics), Some(soloist_id)) = (
        non_empty(req.name),
        non_empty(req.key),
        non_empty(req.version_link),
        non_empty(req.lyrics),
        req.soloist_id,
    ) else {
        return Err(ApiError::MissingFields(
            "All fields are required".to_string(),
        ));
    };

    let song = state
        .store
        .create_song(NewSong {
            name,
            key,
            version_link,
            lyrics,
            soloist_id,
        })
        .await?;

    info!(song_id = song.id, by = principal.id, "Song created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Song created successfully",
            "music": view(&state, &song).await,
        })),
    ))
}

/// PUT /music/:id
pub async fn update_song(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<SongRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = body?;

    let patch = SongPatch {
        name: non_empty(req.name),
        key: non_empty(req.key),
        version_link: non_empty(req.version_link),
        lyrics: non_empty(req.lyrics),
        soloist_id: req.soloist_id,
    };

    let song = state
        .store
        .update_song(id, patch)
        .await?
        .ok_or(ApiError::NotFound(EntityKind::Song))?;

    info!(song_id = song.id, by = principal.id, "Song updated");

    Ok(Json(json!({
        "message": "Song updated successfully",
        "music": view(&state, &song).await,
    })))
}

/// DELETE /music/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;

    if !state.store.delete_song(id).await {
        return Err(ApiError::NotFound(EntityKind::Song));
    }

    info!(song_id = id, by = principal.id, "Song deleted");

    Ok(Json(MessageResponse::new("Song deleted successfully")))
}
