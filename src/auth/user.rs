//! # User Management
//!
//! User model and repository for authentication.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::crypto::{hash_password, validate_email, validate_password, verify_password, PasswordPolicy};
use super::errors::{AuthError, AuthResult};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Submits forms
    User,
    /// Also creates and deletes templates
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    /// Exact match on `USER` / `ADMIN`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AuthError::InvalidRole(other.to_string())),
        }
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,

    /// User's email address (unique, used as the principal)
    pub email: String,

    /// Display name
    pub username: String,

    /// Argon2id password hash (never plaintext)
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: Role,

    /// When the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user, checking email, username and password
    pub fn new(
        email: String,
        username: String,
        password: &str,
        role: Role,
        policy: &PasswordPolicy,
    ) -> AuthResult<Self> {
        validate_email(&email)?;
        if username.trim().is_empty() {
            return Err(AuthError::InvalidUsername);
        }
        validate_password(password, policy)?;

        let password_hash = hash_password(password)?;

        Ok(Self {
            id: Uuid::new_v4(),
            email,
            username,
            password_hash,
            role,
            created_at: Utc::now(),
        })
    }

    /// Verify a password against this user's stored hash
    pub fn verify_password(&self, password: &str) -> AuthResult<bool> {
        verify_password(password, &self.password_hash)
    }
}

/// User repository trait
///
/// Abstracts storage operations for users.
pub trait UserRepository: Send + Sync {
    /// Find a user by their email
    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Check if an email is already registered
    fn email_exists(&self, email: &str) -> AuthResult<bool>;

    /// Create a new user
    fn create(&self, user: &User) -> AuthResult<()>;
}

/// In-memory user repository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: std::sync::RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    fn email_exists(&self, email: &str) -> AuthResult<bool> {
        let users = self
            .users
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        Ok(users.iter().any(|u| u.email == email))
    }

    fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self
            .users
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyExists);
        }

        users.push(user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str, password: &str) -> AuthResult<User> {
        User::new(
            email.to_string(),
            "ada".to_string(),
            password,
            Role::User,
            &PasswordPolicy::default(),
        )
    }

    #[test]
    fn test_user_creation() {
        let user = new_user("ada@example.com", "Analytic4!").unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, "Analytic4!");
        assert!(user.verify_password("Analytic4!").unwrap());
        assert!(!user.verify_password("Analytic5!").unwrap());
    }

    #[test]
    fn test_user_creation_checks_inputs() {
        assert!(matches!(
            new_user("not-an-email", "Analytic4!"),
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            new_user("ada@example.com", "weak"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            User::new(
                "ada@example.com".to_string(),
                "  ".to_string(),
                "Analytic4!",
                Role::User,
                &PasswordPolicy::default()
            ),
            Err(AuthError::InvalidUsername)
        ));
    }

    #[test]
    fn test_role_parsing_is_exact() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!(matches!("admin".parse::<Role>(), Err(AuthError::InvalidRole(_))));
    }

    #[test]
    fn test_in_memory_repository() {
        let repo = InMemoryUserRepository::new();
        let user = new_user("test@example.com", "Passw0rd!").unwrap();

        repo.create(&user).unwrap();

        let found = repo.find_by_email("test@example.com").unwrap();
        assert_eq!(found.unwrap().id, user.id);
        assert!(repo.email_exists("test@example.com").unwrap());
        assert!(!repo.email_exists("other@example.com").unwrap());

        // Duplicate email rejected
        let dup = new_user("test@example.com", "Passw0rd!!").unwrap();
        assert!(matches!(repo.create(&dup), Err(AuthError::EmailAlreadyExists)));
    }
}
