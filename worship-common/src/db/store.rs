//! Entity store
//!
//! Three ordered tables plus the id allocator, behind one `RwLock`.
//! Every write holds the write lock from validation through commit, so a
//! concurrent delete can never slip between a reference check and the
//! insert that relies on it. Reads share the lock.
//!
//! Records handed out are clones; mutating them does not touch stored state.

use std::collections::BTreeMap;

use tokio::sync::{RwLock, RwLockReadGuard};

use super::ids::IdAllocator;
use super::integrity;
use super::models::{
    Member, MemberPatch, NewMember, NewScale, NewSong, Record, RecordId, Scale, ScalePatch, Song,
    SongPatch,
};
use super::StoreResult;

// ========================================
// Table
// ========================================

/// One entity collection keyed by id
///
/// Ids are allocated in increasing order, so key order is insertion order.
#[derive(Debug, Clone)]
pub struct Table<T: Record> {
    rows: BTreeMap<RecordId, T>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Record> Table<T> {
    /// All records in insertion order
    pub fn list(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn insert(&mut self, record: T) -> T {
        self.rows.insert(record.id(), record.clone());
        record
    }

    fn update(&mut self, id: RecordId, patch: T::Patch) -> Option<T> {
        let record = self.rows.get_mut(&id)?;
        record.apply(patch);
        Some(record.clone())
    }

    fn remove(&mut self, id: RecordId) -> bool {
        self.rows.remove(&id).is_some()
    }
}

// ========================================
// Tables
// ========================================

/// The three collections and their id counters
///
/// Readable by anyone holding a reference; only the store mutates.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    members: Table<Member>,
    songs: Table<Song>,
    scales: Table<Scale>,
    ids: IdAllocator,
}

impl Tables {
    pub fn members(&self) -> &Table<Member> {
        &self.members
    }

    pub fn songs(&self) -> &Table<Song> {
        &self.songs
    }

    pub fn scales(&self) -> &Table<Scale> {
        &self.scales
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    // Unchecked inserts: callers validate first.

    pub(crate) fn insert_member(&mut self, new: NewMember) -> Member {
        let id = self.ids.next(Member::KIND);
        self.members.insert(new.into_record(id))
    }

    pub(crate) fn insert_song(&mut self, new: NewSong) -> Song {
        let id = self.ids.next(Song::KIND);
        self.songs.insert(new.into_record(id))
    }

    pub(crate) fn insert_scale(&mut self, new: NewScale) -> Scale {
        let id = self.ids.next(Scale::KIND);
        self.scales.insert(new.into_record(id))
    }
}

// ========================================
// Store
// ========================================

/// Shared in-process store
///
/// Built once at startup and handed around as `Arc<Store>`.
#[derive(Debug, Default)]
pub struct Store {
    tables: RwLock<Tables>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every record and restart all id counters at 1
    pub async fn reset(&self) {
        *self.tables.write().await = Tables::default();
    }

    /// Consistent read-only view across all three tables
    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    // ---------- members ----------

    pub async fn list_members(&self) -> Vec<Member> {
        self.tables.read().await.members.list()
    }

    pub async fn get_member(&self, id: RecordId) -> Option<Member> {
        self.tables.read().await.members.get(id).cloned()
    }

    /// Exact-match lookup used by credential issuance
    pub async fn find_member_by_email(&self, email: &str) -> Option<Member> {
        self.tables
            .read()
            .await
            .members
            .iter()
            .find(|m| m.email == email)
            .cloned()
    }

    pub async fn create_member(&self, new: NewMember) -> StoreResult<Member> {
        let mut tables = self.tables.write().await;
        integrity::validate_email_available(&tables, &new.email, None)?;
        Ok(tables.insert_member(new))
    }

    /// `Ok(None)` when no member has this id
    pub async fn update_member(
        &self,
        id: RecordId,
        patch: MemberPatch,
    ) -> StoreResult<Option<Member>> {
        let mut tables = self.tables.write().await;
        if !tables.members.contains(id) {
            return Ok(None);
        }
        if let Some(email) = &patch.email {
            integrity::validate_email_available(&tables, email, Some(id))?;
        }
        Ok(tables.members.update(id, patch))
    }

    /// Songs and scales naming this member keep their now-dangling reference
    pub async fn delete_member(&self, id: RecordId) -> bool {
        self.tables.write().await.members.remove(id)
    }

    // ---------- songs ----------

    pub async fn list_songs(&self) -> Vec<Song> {
        self.tables.read().await.songs.list()
    }

    pub async fn get_song(&self, id: RecordId) -> Option<Song> {
        self.tables.read().await.songs.get(id).cloned()
    }

    pub async fn create_song(&self, new: NewSong) -> StoreResult<Song> {
        let mut tables = self.tables.write().await;
        integrity::validate_soloist_reference(&tables, new.soloist_id)?;
        Ok(tables.insert_song(new))
    }

    pub async fn update_song(&self, id: RecordId, patch: SongPatch) -> StoreResult<Option<Song>> {
        let mut tables = self.tables.write().await;
        if !tables.songs.contains(id) {
            return Ok(None);
        }
        if let Some(soloist_id) = patch.soloist_id {
            integrity::validate_soloist_reference(&tables, soloist_id)?;
        }
        Ok(tables.songs.update(id, patch))
    }

    pub async fn delete_song(&self, id: RecordId) -> bool {
        self.tables.write().await.songs.remove(id)
    }

    // ---------- scales ----------

    pub async fn list_scales(&self) -> Vec<Scale> {
        self.tables.read().await.scales.list()
    }

    pub async fn get_scale(&self, id: RecordId) -> Option<Scale> {
        self.tables.read().await.scales.get(id).cloned()
    }

    pub async fn create_scale(&self, new: NewScale) -> StoreResult<Scale> {
        let mut tables = self.tables.write().await;
        integrity::validate_scale_assignments(&tables, &new.songs)?;
        Ok(tables.insert_scale(new))
    }

    pub async fn update_scale(
        &self,
        id: RecordId,
        patch: ScalePatch,
    ) -> StoreResult<Option<Scale>> {
        let mut tables = self.tables.write().await;
        if !tables.scales.contains(id) {
            return Ok(None);
        }
        if let Some(songs) = &patch.songs {
            integrity::validate_scale_assignments(&tables, songs)?;
        }
        Ok(tables.scales.update(id, patch))
    }

    pub async fn delete_scale(&self, id: RecordId) -> bool {
        self.tables.write().await.scales.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{AccessLevel, EntityKind, SongAssignment};
    use crate::db::{ReferenceField, StoreError};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn new_member(email: &str) -> NewMember {
        NewMember {
            name: "Test Member".to_string(),
            voice_type: "Tenor".to_string(),
            email: email.to_string(),
            password_hash: "$2b$10$placeholder".to_string(),
            access_level: AccessLevel::Common,
        }
    }

    fn new_song(soloist_id: RecordId) -> NewSong {
        NewSong {
            name: "Amazing Grace".to_string(),
            key: "C".to_string(),
            version_link: "https://example.com/amazing-grace".to_string(),
            lyrics: "Amazing grace, how sweet the sound".to_string(),
            soloist_id,
        }
    }

    fn new_scale(songs: Vec<SongAssignment>) -> NewScale {
        NewScale {
            name: "Sunday Service".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            songs,
        }
    }

    fn assign(song_id: RecordId, soloist_id: RecordId) -> SongAssignment {
        SongAssignment { song_id, soloist_id }
    }

    #[tokio::test]
    async fn test_ids_never_reused_after_delete() {
        let store = Store::new();
        let a = store.create_member(new_member("a@x.com")).await.unwrap();
        let b = store.create_member(new_member("b@x.com")).await.unwrap();
        assert!(store.delete_member(b.id).await);

        let c = store.create_member(new_member("c@x.com")).await.unwrap();
        assert_eq!((a.id, b.id, c.id), (1, 2, 3));
    }

    #[tokio::test]
    async fn test_ids_monotonic_with_interleaved_deletes() {
        let store = Store::new();
        let mut issued = Vec::new();
        for i in 0..20 {
            let m = store
                .create_member(new_member(&format!("{}@x.com", i)))
                .await
                .unwrap();
            if let Some(&last) = issued.last() {
                assert!(m.id > last);
            }
            issued.push(m.id);
            if i % 3 == 0 {
                store.delete_member(m.id).await;
            }
        }

        let mut unique = issued.clone();
        unique.dedup();
        assert_eq!(unique.len(), issued.len());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_without_gaps() {
        let store = Store::new();
        for e in ["a@x.com", "b@x.com", "c@x.com"] {
            store.create_member(new_member(e)).await.unwrap();
        }
        store.delete_member(2).await;

        let emails: Vec<String> = store
            .list_members()
            .await
            .into_iter()
            .map(|m| m.email)
            .collect();
        assert_eq!(emails, vec!["a@x.com", "c@x.com"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = Store::new();
        assert!(store.get_member(1).await.is_none());
        assert!(store.get_song(1).await.is_none());
        assert!(store.get_scale(1).await.is_none());
    }

    #[tokio::test]
    async fn test_returned_record_is_a_copy() {
        let store = Store::new();
        let mut m = store.create_member(new_member("a@x.com")).await.unwrap();
        m.name = "Changed outside".to_string();

        let stored = store.get_member(m.id).await.unwrap();
        assert_eq!(stored.name, "Test Member");
    }

    #[tokio::test]
    async fn test_update_merges_only_present_fields() {
        let store = Store::new();
        let before = store.create_member(new_member("a@x.com")).await.unwrap();

        let after = store
            .update_member(
                before.id,
                MemberPatch {
                    voice_type: Some("Baritone".to_string()),
                    access_level: Some(AccessLevel::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(after.id, before.id);
        assert_eq!(after.voice_type, "Baritone");
        assert_eq!(after.access_level, AccessLevel::Admin);
        assert_eq!(after.name, before.name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.password_hash, before.password_hash);
        assert_eq!(store.get_member(before.id).await.unwrap(), after);
    }

    #[tokio::test]
    async fn test_update_missing_creates_nothing() {
        let store = Store::new();
        let result = store
            .update_member(
                42,
                MemberPatch {
                    name: Some("Ghost".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(result, Ok(None));
        assert!(store.list_members().await.is_empty());
        assert_eq!(store.read().await.ids().peek(EntityKind::Member), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_returns_false() {
        let store = Store::new();
        assert!(!store.delete_member(1).await);
        assert!(!store.delete_song(1).await);
        assert!(!store.delete_scale(1).await);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_on_create() {
        let store = Store::new();
        store.create_member(new_member("x@y.com")).await.unwrap();

        let err = store.create_member(new_member("x@y.com")).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail("x@y.com".to_string()));
        assert_eq!(store.list_members().await.len(), 1);
        // Rejected create does not burn an id
        assert_eq!(store.read().await.ids().peek(EntityKind::Member), 2);
    }

    #[tokio::test]
    async fn test_update_to_own_email_allowed() {
        let store = Store::new();
        let a = store.create_member(new_member("x@y.com")).await.unwrap();

        let result = store
            .update_member(
                a.id,
                MemberPatch {
                    email: Some("x@y.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(result.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_to_other_members_email_rejected() {
        let store = Store::new();
        store.create_member(new_member("a@y.com")).await.unwrap();
        let b = store.create_member(new_member("b@y.com")).await.unwrap();

        let err = store
            .update_member(
                b.id,
                MemberPatch {
                    email: Some("a@y.com".to_string()),
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::DuplicateEmail("a@y.com".to_string()));
        // Nothing from the rejected patch was applied
        assert_eq!(store.get_member(b.id).await.unwrap(), b);
    }

    #[tokio::test]
    async fn test_song_with_unknown_soloist_rejected() {
        let store = Store::new();
        store.create_member(new_member("a@x.com")).await.unwrap();
        store.create_song(new_song(1)).await.unwrap();
        let before = store.list_songs().await;

        let err = store.create_song(new_song(99)).await.unwrap_err();
        assert_eq!(
            err,
            StoreError::ReferenceNotFound {
                field: ReferenceField::Soloist,
                id: 99
            }
        );
        assert_eq!(store.list_songs().await, before);
    }

    #[tokio::test]
    async fn test_song_update_revalidates_soloist() {
        let store = Store::new();
        store.create_member(new_member("a@x.com")).await.unwrap();
        store.create_member(new_member("b@x.com")).await.unwrap();
        let song = store.create_song(new_song(1)).await.unwrap();

        let moved = store
            .update_song(
                song.id,
                SongPatch {
                    soloist_id: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(moved.soloist_id, 2);

        let err = store
            .update_song(
                song.id,
                SongPatch {
                    soloist_id: Some(3),
                    key: Some("D".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReferenceNotFound { id: 3, .. }));
        assert_eq!(store.get_song(song.id).await.unwrap(), moved);
    }

    #[tokio::test]
    async fn test_scale_empty_assignments_rejected() {
        let store = Store::new();
        let err = store.create_scale(new_scale(vec![])).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.list_scales().await.is_empty());
    }

    #[tokio::test]
    async fn test_scale_update_empty_assignments_leaves_record_unchanged() {
        let store = Store::new();
        let m = store.create_member(new_member("a@x.com")).await.unwrap();
        let song = store.create_song(new_song(m.id)).await.unwrap();
        let scale = store
            .create_scale(new_scale(vec![assign(song.id, m.id)]))
            .await
            .unwrap();

        let err = store
            .update_scale(
                scale.id,
                ScalePatch {
                    name: Some("Evening Service".to_string()),
                    songs: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get_scale(scale.id).await.unwrap(), scale);
    }

    #[tokio::test]
    async fn test_scale_update_bad_reference_leaves_record_unchanged() {
        let store = Store::new();
        let m = store.create_member(new_member("a@x.com")).await.unwrap();
        let song = store.create_song(new_song(m.id)).await.unwrap();
        let scale = store
            .create_scale(new_scale(vec![assign(song.id, m.id)]))
            .await
            .unwrap();

        let err = store
            .update_scale(
                scale.id,
                ScalePatch {
                    name: Some("Evening Service".to_string()),
                    songs: Some(vec![assign(song.id, m.id), assign(99, m.id)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::ReferenceNotFound { field: ReferenceField::Song, id: 99 }
        ));

        let err = store
            .update_scale(
                scale.id,
                ScalePatch {
                    songs: Some(vec![assign(song.id, 42)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::ReferenceNotFound { field: ReferenceField::Soloist, id: 42 }
        ));

        assert_eq!(store.get_scale(scale.id).await.unwrap(), scale);
    }

    #[tokio::test]
    async fn test_scale_update_missing_is_none() {
        let store = Store::new();
        let updated = store
            .update_scale(
                7,
                ScalePatch {
                    songs: Some(vec![]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn test_scale_assignments_order_preserved() {
        let store = Store::new();
        store.create_member(new_member("a@x.com")).await.unwrap();
        store.create_member(new_member("b@x.com")).await.unwrap();
        store.create_song(new_song(1)).await.unwrap();
        store.create_song(new_song(2)).await.unwrap();

        let songs = vec![assign(2, 1), assign(1, 2), assign(2, 2)];
        let scale = store.create_scale(new_scale(songs.clone())).await.unwrap();
        assert_eq!(scale.songs, songs);
        assert_eq!(store.get_scale(scale.id).await.unwrap().songs, songs);
    }

    #[tokio::test]
    async fn test_delete_member_does_not_cascade() {
        let store = Store::new();
        let m = store.create_member(new_member("a@x.com")).await.unwrap();
        let s = store.create_song(new_song(m.id)).await.unwrap();

        assert!(store.delete_member(m.id).await);
        assert!(store.list_members().await.iter().all(|x| x.id != m.id));

        let kept = store.get_song(s.id).await.unwrap();
        assert_eq!(kept.soloist_id, m.id);
    }

    #[tokio::test]
    async fn test_reset_clears_records_and_counters() {
        let store = Store::new();
        store.create_member(new_member("a@x.com")).await.unwrap();
        store.reset().await;

        assert!(store.list_members().await.is_empty());
        let m = store.create_member(new_member("a@x.com")).await.unwrap();
        assert_eq!(m.id, 1);
    }

    #[tokio::test]
    async fn test_find_member_by_email() {
        let store = Store::new();
        store.create_member(new_member("a@x.com")).await.unwrap();

        assert!(store.find_member_by_email("a@x.com").await.is_some());
        assert!(store.find_member_by_email("A@x.com").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = Arc::new(Store::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_member(new_member(&format!("{}@x.com", i)))
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<_>>());
    }
}
