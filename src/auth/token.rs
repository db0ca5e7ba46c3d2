use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a JWT (JSON Web Token).
///
/// Only the subject is carried today. Tokens are stateless and have no
/// server-side revocation; adding an `exp` claim later only requires a new
/// field here and flipping `validate_exp` in [`TokenService::new`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier.
    pub sub: Uuid,
}

/// Issues and verifies HS256-signed identity tokens.
///
/// Built once at startup from the configured secret; the keys are derived
/// here and the secret itself is not retained, logged, or returned.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No expiry is issued, so none is required or checked.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Signs `{sub: user_id}` into an opaque token string.
    ///
    /// The output is deterministic for identical claims and secret.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = Claims { sub: user_id };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token string and decodes its claims.
    ///
    /// Fails with `AppError::InvalidToken` if the token is malformed, its
    /// signature does not match, or it was signed with a different secret.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::InvalidToken(format!("Invalid token: {}", e)))
    }
}
