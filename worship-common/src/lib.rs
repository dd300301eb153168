//! # Worship Common Library
//!
//! Shared code for the worship group service including:
//! - The in-memory entity store (members, songs, scales)
//! - Referential integrity checks and output enrichment
//! - Credential and password primitives
//! - Configuration loading

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use db::{Store, StoreError};
pub use error::{Error, Result};
