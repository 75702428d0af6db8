//! User account record.
//!
//! # Invariants
//! - `username` and `email` are unique within one backend; the auth gate
//!   checks existence before any insert.
//! - `password_hash` holds a PHC-format hash, never plaintext.

use serde::{Deserialize, Serialize};

/// Registered account as persisted by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    /// Unix epoch milliseconds, set once at creation.
    pub created_at: i64,
}

/// Creation fields for a user; `id` and `created_at` are backend-assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl UserDraft {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}
