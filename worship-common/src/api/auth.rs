//! Credentials: password hashing and signed bearer tokens
//!
//! # Token format
//!
//! `<payload>.<signature>` where
//! - payload is base64url (no padding) of the canonical claims JSON
//! - signature is SHA-256 of canonical claims JSON + secret, as 64 hex chars
//!
//! Canonical JSON: sorted keys, no whitespace.
//!
//! # Password format
//!
//! bcrypt modular crypt strings (`$2b$10$...`), salt embedded.
//!
//! # Pure Functions
//!
//! Apart from [`authenticate`], nothing here touches the store or any HTTP
//! framework. The service wraps these with its own middleware.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use once_cell::sync::Lazy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::db::{AccessLevel, Member, PublicMember, RecordId, Store};
use crate::time;

const BCRYPT_COST: u32 = 10;
const SECRET_LEN: usize = 32;

// ========================================
// Error Types
// ========================================

/// Why a token was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Not two dot-separated parts, bad base64, or bad claims JSON
    #[error("Malformed token")]
    Malformed,

    /// Signature does not match payload + secret
    #[error("Invalid token signature")]
    BadSignature,

    /// Past its expiry time
    #[error("Token expired")]
    Expired,

    /// Claims could not be serialized
    #[error("Token encoding failed: {0}")]
    Encoding(String),

    /// bcrypt refused to hash the password
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

// ========================================
// Claims / Principal
// ========================================

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: RecordId,
    pub email: String,
    pub name: String,
    pub access_level: AccessLevel,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expires at, seconds since epoch
    pub exp: i64,
}

impl Claims {
    pub fn new(member: &PublicMember, issued_at: i64, ttl: Duration) -> Self {
        Self {
            id: member.id,
            email: member.email.clone(),
            name: member.name.clone(),
            access_level: member.access_level,
            iat: issued_at,
            exp: issued_at + ttl.num_seconds(),
        }
    }
}

/// Authenticated actor behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: RecordId,
    pub email: String,
    pub name: String,
    pub access_level: AccessLevel,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.access_level == AccessLevel::Admin
    }
}

impl From<Claims> for Principal {
    fn from(c: Claims) -> Self {
        Self {
            id: c.id,
            email: c.email,
            name: c.name,
            access_level: c.access_level,
        }
    }
}

// ========================================
// Tokens
// ========================================

/// Issue a token for `member`, valid for `ttl` from now
pub fn issue_token(
    member: &PublicMember,
    secret: &str,
    ttl: Duration,
) -> Result<String, CredentialError> {
    encode_claims(&Claims::new(member, time::now_secs(), ttl), secret)
}

/// Sign and encode arbitrary claims
pub fn encode_claims(claims: &Claims, secret: &str) -> Result<String, CredentialError> {
    let value =
        serde_json::to_value(claims).map_err(|e| CredentialError::Encoding(e.to_string()))?;
    let canonical = to_canonical_json(&value);

    let payload = URL_SAFE_NO_PAD.encode(canonical.as_bytes());
    let signature = sign(&canonical, secret);

    Ok(format!("{}.{}", payload, signature))
}

/// Check signature and expiry, returning the principal on success
pub fn verify_token(token: &str, secret: &str) -> Result<Principal, CredentialError> {
    let (payload, signature) = token.split_once('.').ok_or(CredentialError::Malformed)?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| CredentialError::Malformed)?;
    let canonical = String::from_utf8(bytes).map_err(|_| CredentialError::Malformed)?;

    let expected = sign(&canonical, secret);
    if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        return Err(CredentialError::BadSignature);
    }

    let claims: Claims =
        serde_json::from_str(&canonical).map_err(|_| CredentialError::Malformed)?;

    if claims.exp <= time::now_secs() {
        return Err(CredentialError::Expired);
    }

    Ok(claims.into())
}

/// SHA-256 of canonical JSON + secret, as 64 hex characters
fn sign(canonical: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Convert JSON to canonical form (sorted keys, no whitespace)
///
/// # Examples
///
/// ```
/// use worship_common::api::auth::to_canonical_json;
/// use serde_json::json;
///
/// let json = json!({"z": 3, "a": 1, "m": 2});
/// assert_eq!(to_canonical_json(&json), r#"{"a":1,"m":2,"z":3}"#);
/// ```
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let items: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), to_canonical_json(v)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        // serde_json's own rendering escapes strings correctly
        other => other.to_string(),
    }
}

/// Random hex secret for signing tokens when none is configured
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_LEN];
    rand::thread_rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}

// ========================================
// Passwords
// ========================================

/// Salted bcrypt hash for storage in a member record
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|e| CredentialError::Hashing(e.to_string()))
}

/// Does `password` match the stored hash? Malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

/// Hash checked when the email is unknown, so both failures cost one bcrypt run
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| bcrypt::hash("unknown-member", BCRYPT_COST).unwrap_or_default());

/// Look up a member by email and check the password
///
/// Unknown email and wrong password both yield `None`, after the same
/// amount of hashing work. Verification runs on the blocking pool.
pub async fn authenticate(store: &Store, email: &str, password: &str) -> Option<Member> {
    let member = store.find_member_by_email(email).await;

    let stored = member.as_ref().map(|m| m.password_hash.clone());
    let password = password.to_string();

    let matches = tokio::task::spawn_blocking(move || {
        verify_password(&password, stored.as_deref().unwrap_or(DUMMY_HASH.as_str()))
    })
    .await
    .unwrap_or(false);

    member.filter(|_| matches)
}

// ========================================
// Helpers
// ========================================

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ========================================
// Tests
// ========================================
