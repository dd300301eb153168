//! API module for shared HTTP API functionality
//!
//! Provides credential primitives and request/response types used by the
//! service crate.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Store lookups needed for login
//! - Shared types
//!
//! The service wraps these with framework-specific middleware (Axum).

pub mod auth;
pub mod types;

pub use auth::{
    authenticate, generate_secret, hash_password, issue_token, verify_password, verify_token,
    Claims, CredentialError, Principal,
};
pub use types::{ErrorResponse, LoginRequest, LoginResponse, MessageResponse};
