//! Domain records for the todo-keeper core.
//!
//! # Responsibility
//! - Define the four flat entity records (User, Task, Event, Note) and the
//!   draft types used at creation time.
//! - Own field-shape validation shared by the auth gate and the CRUD facade.
//!
//! # Invariants
//! - `id` and `created_at` are assigned by the storage backend exactly once;
//!   drafts never carry them.
//! - Every Task/Event/Note references exactly one owning `user_id`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod event;
pub mod note;
pub mod task;
pub mod user;

/// Minimum username length accepted at registration.
pub const USERNAME_MIN_CHARS: usize = 3;
/// Minimum password length accepted at registration.
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Per-field shape failure, reported before any persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    UsernameTooShort,
    EmailMalformed,
    PasswordTooShort,
    EmptyField(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UsernameTooShort => {
                write!(f, "username must be at least {USERNAME_MIN_CHARS} characters")
            }
            Self::EmailMalformed => write!(f, "email address is malformed"),
            Self::PasswordTooShort => {
                write!(f, "password must be at least {PASSWORD_MIN_CHARS} characters")
            }
            Self::EmptyField(field) => write!(f, "{field} must not be empty"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_empty(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}
