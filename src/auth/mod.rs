//! # Auth Module
//!
//! User registration, password login and JWT bearer authentication.
//!
//! The authenticated email is the principal that every form operation is
//! performed as.

pub mod crypto;
pub mod errors;
pub mod jwt;
pub mod service;
pub mod user;

pub use crypto::PasswordPolicy;
pub use errors::{AuthError, AuthResult};
pub use jwt::{JwtClaims, JwtConfig, JwtManager};
pub use service::{AuthContext, AuthService, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
pub use user::{InMemoryUserRepository, Role, User, UserRepository};
