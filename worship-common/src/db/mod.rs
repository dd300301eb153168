//! In-memory entity store
//!
//! Holds the three related collections (members, songs, scales), assigns
//! identifiers, and checks cross-entity references before any write.

pub mod enrich;
pub mod ids;
pub mod integrity;
pub mod models;
pub mod seed;
pub mod store;

pub use enrich::*;
pub use ids::IdAllocator;
pub use models::*;
pub use seed::{seed_store, SeedSummary, SEED_PASSWORD};
pub use store::{Store, Table, Tables};

use std::fmt;
use thiserror::Error;

/// Result type for store writes
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Which reference of a write failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceField {
    Soloist,
    Song,
}

impl fmt::Display for ReferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceField::Soloist => write!(f, "Soloist"),
            ReferenceField::Song => write!(f, "Song"),
        }
    }
}

/// Write rejected by the store; nothing was committed
///
/// Missing records are not errors here: reads return `Option`, deletes
/// return `bool`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A soloist or song reference does not resolve
    #[error("{field} with ID {id} was not found")]
    ReferenceNotFound { field: ReferenceField, id: RecordId },

    /// Another member already uses this email
    #[error("A member with email {0} already exists")]
    DuplicateEmail(String),

    /// Structurally invalid input
    #[error("{0}")]
    Validation(String),
}
