//! Auth gate: registration, credential verification, demo bootstrap.
//!
//! # Responsibility
//! - Validate credential shape before any persistence attempt.
//! - Hash passwords with Argon2id and verify stored PHC strings.
//! - Keep unknown-identity and wrong-password failures indistinguishable
//!   to callers.
//!
//! # Invariants
//! - Plaintext passwords are never stored, returned, or logged.
//! - Duplicate username/email is rejected via an existence check before
//!   insertion.

use crate::model::user::{User, UserDraft};
use crate::model::{ValidationError, PASSWORD_MIN_CHARS, USERNAME_MIN_CHARS};
use crate::service::data_service::DataService;
use crate::store::{StoreError, StoreResult};
use argon2::password_hash::{rand_core, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed-credential account created by the demo bootstrap.
pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_EMAIL: &str = "demo@todokeep.app";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub type AuthResult<T> = Result<T, AuthError>;

/// Failure returned by the auth gate.
#[derive(Debug)]
pub enum AuthError {
    Validation(ValidationError),
    /// Username or email already registered.
    Conflict,
    /// Unknown identity or wrong password; the two causes are deliberately
    /// not distinguished.
    InvalidCredentials,
    Store(StoreError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Conflict => write!(f, "username or email is already registered"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Conflict | Self::InvalidCredentials => None,
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl DataService {
    /// Registers a new user.
    ///
    /// Validates credential shape, rejects duplicate username/email with
    /// `AuthError::Conflict`, then stores the Argon2id hash of the password.
    pub fn register(&mut self, username: &str, email: &str, password: &str) -> AuthResult<User> {
        let username = username.trim();
        let email = email.trim();
        validate_credentials(username, email, password)?;

        if self.store_mut()?.user_exists(username, email)? {
            warn!("event=register module=auth status=conflict");
            return Err(AuthError::Conflict);
        }

        let password_hash =
            hash_password(password).map_err(|reason| AuthError::Store(StoreError::Internal(reason)))?;
        let user = self
            .store_mut()?
            .insert_user(UserDraft::new(username, email, password_hash))?;
        info!("event=register module=auth status=ok user_id={}", user.id);
        Ok(user)
    }

    /// Authenticates by username or email.
    ///
    /// Returns `AuthError::InvalidCredentials` for both unknown identities
    /// and wrong passwords.
    pub fn authenticate(&mut self, identifier: &str, password: &str) -> AuthResult<User> {
        let identifier = identifier.trim();
        match self.store_mut()?.find_user(identifier)? {
            Some(user) if verify_password(password, &user.password_hash) => {
                info!(
                    "event=authenticate module=auth status=ok user_id={}",
                    user.id
                );
                Ok(user)
            }
            // One rejection path for both causes; do not log which one hit.
            _ => {
                warn!("event=authenticate module=auth status=rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Returns whether a user with this username or email exists.
    pub fn user_exists(&mut self, username: &str, email: &str) -> AuthResult<bool> {
        Ok(self.store_mut()?.user_exists(username.trim(), email.trim())?)
    }

    /// Authenticates the demo identity, registering it when missing.
    /// Idempotent across repeated calls.
    pub fn ensure_demo_user(&mut self) -> AuthResult<User> {
        match self.authenticate(DEMO_USERNAME, DEMO_PASSWORD) {
            Ok(user) => Ok(user),
            Err(AuthError::InvalidCredentials) => {
                self.register(DEMO_USERNAME, DEMO_EMAIL, DEMO_PASSWORD)
            }
            Err(other) => Err(other),
        }
    }

    /// First-open fallback bootstrap; the caller has already established
    /// that no prior state exists.
    pub(crate) fn seed_demo_user(&mut self) -> StoreResult<()> {
        let password_hash = hash_password(DEMO_PASSWORD).map_err(StoreError::Internal)?;
        let user = self
            .store_mut()?
            .insert_user(UserDraft::new(DEMO_USERNAME, DEMO_EMAIL, password_hash))?;
        info!("event=demo_seed module=auth status=ok user_id={}", user.id);
        Ok(())
    }
}

fn validate_credentials(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationError> {
    if username.chars().count() < USERNAME_MIN_CHARS {
        return Err(ValidationError::UsernameTooShort);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::EmailMalformed);
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// Hashes a password as an Argon2id PHC string with a random salt.
pub(crate) fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut rand_core::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| format!("password hashing failed: {err}"))
}

/// Verifies a password against a stored PHC string. An unparseable stored
/// value counts as a mismatch.
pub(crate) fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::{hash_password, validate_credentials, verify_password};
    use crate::model::ValidationError;

    #[test]
    fn hash_round_trips_and_hides_plaintext() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("secret1").unwrap();
        let second = hash_password("secret1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn unparseable_stored_hash_is_a_mismatch() {
        assert!(!verify_password("secret1", "not-a-phc-string"));
    }

    #[test]
    fn credential_shape_is_checked_per_field() {
        assert_eq!(
            validate_credentials("ab", "a@x.com", "secret1"),
            Err(ValidationError::UsernameTooShort)
        );
        assert_eq!(
            validate_credentials("alice", "not-an-email", "secret1"),
            Err(ValidationError::EmailMalformed)
        );
        assert_eq!(
            validate_credentials("alice", "a@x.com", "short"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(validate_credentials("alice", "a@x.com", "secret1"), Ok(()));
    }
}
