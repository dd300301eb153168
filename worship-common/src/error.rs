//! Common error types for the worship service

use thiserror::Error;

/// Common result type for non-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ambient error types (configuration, I/O, startup)
///
/// Store write failures have their own taxonomy in [`crate::db::StoreError`].
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML config file could not be parsed
    #[error("Config parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
