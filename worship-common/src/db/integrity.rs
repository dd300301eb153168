//! Referential integrity checks
//!
//! Stateless: every check reads the tables it is given and nothing else.
//! The store runs these under its write lock, before allocating an id or
//! touching a table, so a failed check never leaves a partial write.

use super::models::{RecordId, SongAssignment};
use super::store::Tables;
use super::{ReferenceField, StoreError, StoreResult};

/// Soloist must be an existing member
pub fn validate_soloist_reference(tables: &Tables, member_id: RecordId) -> StoreResult<()> {
    if tables.members().contains(member_id) {
        Ok(())
    } else {
        Err(StoreError::ReferenceNotFound {
            field: ReferenceField::Soloist,
            id: member_id,
        })
    }
}

/// Song must be an existing repertoire entry
pub fn validate_song_reference(tables: &Tables, song_id: RecordId) -> StoreResult<()> {
    if tables.songs().contains(song_id) {
        Ok(())
    } else {
        Err(StoreError::ReferenceNotFound {
            field: ReferenceField::Song,
            id: song_id,
        })
    }
}

/// Assignments must be non-empty and fully resolvable
///
/// Checked in sequence order, song before soloist within an assignment;
/// the first unresolved reference is reported.
pub fn validate_scale_assignments(
    tables: &Tables,
    assignments: &[SongAssignment],
) -> StoreResult<()> {
    if assignments.is_empty() {
        return Err(StoreError::Validation(
            "A scale needs at least one song".to_string(),
        ));
    }

    for assignment in assignments {
        validate_song_reference(tables, assignment.song_id)?;
        validate_soloist_reference(tables, assignment.soloist_id)?;
    }

    Ok(())
}

/// Email must not belong to any other member
///
/// Plain case-sensitive equality. `exclude` is the member being updated.
pub fn validate_email_available(
    tables: &Tables,
    email: &str,
    exclude: Option<RecordId>,
) -> StoreResult<()> {
    let taken = tables
        .members()
        .iter()
        .any(|m| m.email == email && Some(m.id) != exclude);

    if taken {
        Err(StoreError::DuplicateEmail(email.to_string()))
    } else {
        Ok(())
    }
}
