pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// User's email address.
    /// Must be a valid email format.
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    /// User's password.
    pub password: String,
}

/// Represents the payload for a new account signup request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Display name for the new account, between 3 and 25 characters.
    #[validate(length(min = 3, max = 25, message = "Name must be between 3 and 25 characters"))]
    pub name: String,
    /// Email address for the new account.
    /// Must be a valid email format.
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
    /// Password for the new account, between 6 and 20 characters.
    #[validate(length(
        min = 6,
        max = 20,
        message = "Password must be between 6 and 20 characters"
    ))]
    pub password: String,
}

/// Response structure after successful authentication (login or signup).
/// Contains the signed token proving the caller's identity.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}
