use crate::error::AppError;
use bcrypt::{hash, verify};

/// Salted one-way password hashing with a fixed work factor.
///
/// The cost comes from configuration so the whole process agrees on one
/// value; bcrypt salts each call itself, so hashing the same password twice
/// yields different outputs.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
    }

    /// Returns `Ok(false)` for a well-formed mismatch; a malformed stored
    /// hash surfaces as an error instead.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        verify(password, hashed_password)
            .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
    }
}
