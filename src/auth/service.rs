//! # Auth Service
//!
//! Registration, login and bearer-token authentication.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::crypto::PasswordPolicy;
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager};
use super::user::{Role, User, UserRepository};
use crate::forms::Principal;

/// The authenticated caller of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub principal: Principal,
    pub role: Role,
}

impl AuthContext {
    /// Fails with `Forbidden` unless the caller is an admin
    pub fn require_admin(&self) -> AuthResult<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden("admin role required".to_string()))
        }
    }
}

pub struct AuthService<U: UserRepository + ?Sized> {
    user_repo: Arc<U>,
    jwt_manager: JwtManager,
    password_policy: PasswordPolicy,
}

impl<U: UserRepository + ?Sized> AuthService<U> {
    pub fn new(user_repo: Arc<U>, jwt_config: JwtConfig, password_policy: PasswordPolicy) -> Self {
        Self {
            user_repo,
            jwt_manager: JwtManager::new(jwt_config),
            password_policy,
        }
    }

    /// Register a new user
    pub fn register(&self, request: RegisterRequest) -> AuthResult<RegisterResponse> {
        let role: Role = request.role.parse()?;

        // Check if email already exists
        if self.user_repo.email_exists(&request.email)? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let user = User::new(
            request.email,
            request.username,
            &request.password,
            role,
            &self.password_policy,
        )?;
        self.user_repo.create(&user)?;

        tracing::info!(email = %user.email, role = %user.role, "user registered");
        Ok(RegisterResponse::from(user))
    }

    /// Authenticate a user and issue an access token
    pub fn login(&self, request: LoginRequest) -> AuthResult<LoginResponse> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        // Find user by email
        let user = self
            .user_repo
            .find_by_email(&request.email)?
            .ok_or(AuthError::InvalidCredentials)?;

        // Verify password
        if !user.verify_password(&request.password)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt_manager.generate_access_token(&user)?;
        Ok(LoginResponse {
            token,
            token_type: "bearer".to_string(),
            expires_in: self.jwt_manager.ttl_seconds(),
            email: user.email,
            roles: vec![user.role.to_string()],
        })
    }

    /// Resolve a bearer token to the calling principal
    pub fn authenticate(&self, token: &str) -> AuthResult<AuthContext> {
        let claims = self.jwt_manager.validate_token(token)?;
        Ok(AuthContext {
            principal: Principal::new(claims.sub),
            role: claims.role,
        })
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub email: String,
    pub username: String,
    pub role: Role,
}

impl From<User> for RegisterResponse {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub email: String,
    pub roles: Vec<String>,
}
