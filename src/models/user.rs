use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::task::Task;

/// A user row as stored in the `users` table.
///
/// Deliberately not `Serialize`: the password hash must never leave the
/// process, so responses are built from [`UserProfile`] instead.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Payload for updating the authenticated user's name and email.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 25, message = "Name must be between 3 and 25 characters"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email"))]
    pub email: String,
}

/// Payload for changing the authenticated user's password.
///
/// Only the new password is format-checked; the old one is judged solely by
/// whether it verifies against the stored hash.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    pub old_password: String,
    #[validate(length(
        min = 6,
        max = 20,
        message = "Password must be between 6 and 20 characters"
    ))]
    pub password: String,
}

/// The profile body returned by `get-user-info`: the user's public fields
/// plus all tasks they own, most recent first.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub tasks: Vec<Task>,
}
