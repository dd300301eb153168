//! Output shaping
//!
//! Turns stored records into what leaves the service: members lose their
//! credential, songs and scales gain snapshots of the records they point at.
//! A reference that no longer resolves renders as `null`.

use chrono::NaiveDate;
use serde::Serialize;

use super::models::{Member, PublicMember, RecordId, Scale, Song, SongAssignment};
use super::store::Tables;

/// Who sings: id, name and voice of a referenced member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub id: RecordId,
    pub name: String,
    pub voice_type: String,
}

impl From<&Member> for MemberSummary {
    fn from(m: &Member) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            voice_type: m.voice_type.clone(),
        }
    }
}

/// What is sung: the parts of a song a scale needs to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongSummary {
    pub id: RecordId,
    pub name: String,
    pub key: String,
    pub version_link: String,
}

impl From<&Song> for SongSummary {
    fn from(s: &Song) -> Self {
        Self {
            id: s.id,
            name: s.name.clone(),
            key: s.key.clone(),
            version_link: s.version_link.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongView {
    #[serde(flatten)]
    pub song: Song,
    pub soloist: Option<MemberSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentView {
    pub song_id: RecordId,
    pub soloist_id: RecordId,
    pub song: Option<SongSummary>,
    pub soloist: Option<MemberSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleView {
    pub id: RecordId,
    pub name: String,
    pub date: NaiveDate,
    pub songs: Vec<AssignmentView>,
}

pub fn member_view(member: &Member) -> PublicMember {
    member.public()
}

pub fn song_view(tables: &Tables, song: &Song) -> SongView {
    SongView {
        song: song.clone(),
        soloist: tables.members().get(song.soloist_id).map(MemberSummary::from),
    }
}

fn assignment_view(tables: &Tables, assignment: &SongAssignment) -> AssignmentView {
    AssignmentView {
        song_id: assignment.song_id,
        soloist_id: assignment.soloist_id,
        song: tables.songs().get(assignment.song_id).map(SongSummary::from),
        soloist: tables
            .members()
            .get(assignment.soloist_id)
            .map(MemberSummary::from),
    }
}

pub fn scale_view(tables: &Tables, scale: &Scale) -> ScaleView {
    ScaleView {
        id: scale.id,
        name: scale.name.clone(),
        date: scale.date,
        songs: scale
            .songs
            .iter()
            .map(|a| assignment_view(tables, a))
            .collect(),
    }
}
