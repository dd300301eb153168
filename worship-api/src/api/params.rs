//! Small helpers shared by the route handlers

use chrono::NaiveDate;
use worship_common::db::{AccessLevel, RecordId};

use super::ApiError;

/// Parse a path segment as a record id
pub fn parse_id(raw: &str) -> Result<RecordId, ApiError> {
    raw.parse::<RecordId>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid ID: {}", raw)))
}

/// Treat an empty string the same as an absent field
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

pub fn parse_access_level(raw: &str) -> Result<AccessLevel, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::InvalidAccessLevel(raw.to_string()))
}

/// Dates travel as `YYYY-MM-DD`
pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date {:?}, expected YYYY-MM-DD", raw)))
}
