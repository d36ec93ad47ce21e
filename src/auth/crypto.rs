//! # Credential Checks
//!
//! Password policy and Argon2id hashing. Passwords are only ever stored as
//! Argon2id hashes.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use regex::Regex;

use super::errors::{AuthError, AuthResult};

/// Address pattern accepted at registration
pub const REGISTRATION_EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Special characters a password may (and must) draw from
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*";

/// Password requirements configuration
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_number: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 20,
            require_uppercase: true,
            require_lowercase: true,
            require_number: true,
            require_special: true,
        }
    }
}

impl PasswordPolicy {
    /// Validate a password against this policy
    pub fn validate(&self, password: &str) -> AuthResult<()> {
        validate_password(password, self)
    }
}

fn is_special(c: char) -> bool {
    PASSWORD_SPECIALS.contains(c)
}

/// Validate password against policy.
///
/// Only ASCII letters, digits and [`PASSWORD_SPECIALS`] are accepted.
pub fn validate_password(password: &str, policy: &PasswordPolicy) -> AuthResult<()> {
    let len = password.chars().count();
    if len < policy.min_length || len > policy.max_length {
        return Err(AuthError::WeakPassword(format!(
            "Password must be {}-{} characters",
            policy.min_length, policy.max_length
        )));
    }

    if let Some(c) = password
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !is_special(*c))
    {
        return Err(AuthError::WeakPassword(format!(
            "Password contains unsupported character '{}'",
            c
        )));
    }

    if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one uppercase letter".to_string(),
        ));
    }

    if policy.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one lowercase letter".to_string(),
        ));
    }

    if policy.require_number && !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "Password must contain at least one number".to_string(),
        ));
    }

    if policy.require_special && !password.chars().any(is_special) {
        return Err(AuthError::WeakPassword(format!(
            "Password must contain at least one of {}",
            PASSWORD_SPECIALS
        )));
    }

    Ok(())
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(REGISTRATION_EMAIL_PATTERN).expect("registration pattern is a valid regex")
    })
}

/// Validate an email address for registration
pub fn validate_email(email: &str) -> AuthResult<()> {
    if email_regex().is_match(email) {
        Ok(())
    } else {
        Err(AuthError::InvalidEmail)
    }
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::HashingFailed)
}

/// Verify a password against its hash
///
/// Uses constant-time comparison internally (via argon2 crate).
pub fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let password = "Secure#Pass1";
        let hash = hash_password(password).unwrap();

        // Hash should be different from password
        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("Wrong#Pass1", &hash).unwrap());
    }

    #[test]
    fn test_default_policy() {
        let policy = PasswordPolicy::default();

        assert!(policy.validate("Abcdef1!").is_ok());
        assert!(policy.validate("Abcde1!").is_err()); // too short
        assert!(policy.validate("Abcdefghijklmnopqr1!x").is_err()); // too long
        assert!(policy.validate("abcdef1!").is_err()); // no uppercase
        assert!(policy.validate("ABCDEF1!").is_err()); // no lowercase
        assert!(policy.validate("Abcdefg!").is_err()); // no number
        assert!(policy.validate("Abcdefg1").is_err()); // no special
        assert!(policy.validate("Abcdef1!?").is_err()); // '?' not allowed
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
        assert!(validate_email("ada@example").is_err());
        assert!(validate_email("").is_err());
        assert!(validate_email("ada example.com").is_err());
    }
}
