//! Entity models, creation inputs and partial-update patches

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned by the store to every record
pub type RecordId = u64;

/// The three entity kinds held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Member,
    Song,
    Scale,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Member => write!(f, "member"),
            EntityKind::Song => write!(f, "song"),
            EntityKind::Scale => write!(f, "scale"),
        }
    }
}

/// Member access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Admin,
    Common,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Admin => "admin",
            AccessLevel::Common => "common",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(AccessLevel::Admin),
            "common" => Ok(AccessLevel::Common),
            other => Err(format!("Unknown access level: {}", other)),
        }
    }
}

/// Stored record behaviour shared by all entity kinds
pub trait Record: Clone {
    /// Partial update applied by [`Record::apply`]
    type Patch;

    const KIND: EntityKind;

    fn id(&self) -> RecordId;

    /// Merge a patch field by field. The identifier is never touched.
    fn apply(&mut self, patch: Self::Patch);
}

// ========================================
// Member
// ========================================

/// A person in the worship group
///
/// Not serializable: the password hash must not leave the store.
/// Use [`PublicMember`] for anything that crosses the API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: RecordId,
    pub name: String,
    pub voice_type: String,
    pub email: String,
    pub password_hash: String,
    pub access_level: AccessLevel,
}

impl Member {
    /// Copy of this member with the credential stripped
    pub fn public(&self) -> PublicMember {
        PublicMember {
            id: self.id,
            name: self.name.clone(),
            voice_type: self.voice_type.clone(),
            email: self.email.clone(),
            access_level: self.access_level,
        }
    }
}

/// Member as exposed outside the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMember {
    pub id: RecordId,
    pub name: String,
    pub voice_type: String,
    pub email: String,
    pub access_level: AccessLevel,
}

#[derive(Debug, Clone)]
pub struct NewMember {
    pub name: String,
    pub voice_type: String,
    pub email: String,
    pub password_hash: String,
    pub access_level: AccessLevel,
}

impl NewMember {
    pub(crate) fn into_record(self, id: RecordId) -> Member {
        Member {
            id,
            name: self.name,
            voice_type: self.voice_type,
            email: self.email,
            password_hash: self.password_hash,
            access_level: self.access_level,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub voice_type: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub access_level: Option<AccessLevel>,
}

impl Record for Member {
    type Patch = MemberPatch;
    const KIND: EntityKind = EntityKind::Member;

    fn id(&self) -> RecordId {
        self.id
    }

    fn apply(&mut self, patch: MemberPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(voice_type) = patch.voice_type {
            self.voice_type = voice_type;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(access_level) = patch.access_level {
            self.access_level = access_level;
        }
    }
}

// ========================================
// Song
// ========================================

/// An item in the repertoire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: RecordId,
    pub name: String,
    pub key: String,
    pub version_link: String,
    pub lyrics: String,
    pub soloist_id: RecordId,
}

#[derive(Debug, Clone)]
pub struct NewSong {
    pub name: String,
    pub key: String,
    pub version_link: String,
    pub lyrics: String,
    pub soloist_id: RecordId,
}

impl NewSong {
    pub(crate) fn into_record(self, id: RecordId) -> Song {
        Song {
            id,
            name: self.name,
            key: self.key,
            version_link: self.version_link,
            lyrics: self.lyrics,
            soloist_id: self.soloist_id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SongPatch {
    pub name: Option<String>,
    pub key: Option<String>,
    pub version_link: Option<String>,
    pub lyrics: Option<String>,
    pub soloist_id: Option<RecordId>,
}

impl Record for Song {
    type Patch = SongPatch;
    const KIND: EntityKind = EntityKind::Song;

    fn id(&self) -> RecordId {
        self.id
    }

    fn apply(&mut self, patch: SongPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(key) = patch.key {
            self.key = key;
        }
        if let Some(version_link) = patch.version_link {
            self.version_link = version_link;
        }
        if let Some(lyrics) = patch.lyrics {
            self.lyrics = lyrics;
        }
        if let Some(soloist_id) = patch.soloist_id {
            self.soloist_id = soloist_id;
        }
    }
}

// ========================================
// Scale
// ========================================

/// One performance slot in a scale: which song, sung by whom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongAssignment {
    #[serde(alias = "musicId")]
    pub song_id: RecordId,
    pub soloist_id: RecordId,
}

/// A named, dated rotation of songs and soloists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    pub id: RecordId,
    pub name: String,
    pub date: NaiveDate,
    pub songs: Vec<SongAssignment>,
}

#[derive(Debug, Clone)]
pub struct NewScale {
    pub name: String,
    pub date: NaiveDate,
    pub songs: Vec<SongAssignment>,
}

impl NewScale {
    pub(crate) fn into_record(self, id: RecordId) -> Scale {
        Scale {
            id,
            name: self.name,
            date: self.date,
            songs: self.songs,
        }
    }
}

/// Scale patch; `songs` replaces the whole assignment list when present
#[derive(Debug, Clone, Default)]
pub struct ScalePatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub songs: Option<Vec<SongAssignment>>,
}

impl Record for Scale {
    type Patch = ScalePatch;
    const KIND: EntityKind = EntityKind::Scale;

    fn id(&self) -> RecordId {
        self.id
    }

    fn apply(&mut self, patch: ScalePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(songs) = patch.songs {
            self.songs = songs;
        }
    }
}
