pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserResponse;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::{Claims, TokenCodec};

/// Payload for `POST /api/auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    /// Only presence is checked here; length rules apply at registration.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Payload for `POST /api/auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Must be a valid email. Stored trimmed and lowercased.
    #[validate(email)]
    pub email: String,
    /// Between 6 and 100 characters.
    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

/// Response after successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    /// Bearer token for the `Authorization` header.
    pub token: String,
}

/// Response from `POST /api/auth/refresh`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
