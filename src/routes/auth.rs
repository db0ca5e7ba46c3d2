use crate::{
    auth::{AuthResponse, LoginRequest, PasswordHasher, SignupRequest, TokenService},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// The one message for every credential failure. A missing account and a
/// wrong password must be indistinguishable to the caller.
pub const BAD_CREDENTIALS: &str = "Email or password not correct";

/// Register a new account
///
/// Validates the payload, rejects taken emails, then hashes the password,
/// inserts the user, and returns a token bound to the new id. All checks run
/// before the insert; the insert is the only mutating step.
#[post("/signup")]
pub async fn signup(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    tokens: web::Data<TokenService>,
    signup_data: web::Json<SignupRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    signup_data.validate()?;

    // Check if email already exists. The unique index on users.email backs
    // this up when a concurrent signup wins the race between check and insert.
    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&signup_data.email)
        .fetch_optional(&**pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already exists".into()));
    }

    // Hash password
    let password_hash = hasher.hash(&signup_data.password)?;

    // Insert new user
    let user_id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&signup_data.name)
    .bind(&signup_data.email)
    .bind(&password_hash)
    .fetch_one(&**pool)
    .await?;

    // Generate token
    let token = tokens.issue(user_id)?;

    Ok(HttpResponse::Created().json(AuthResponse { token }))
}

/// Login
///
/// Authenticates by email and password and returns a token. Both failure
/// modes produce the same [`BAD_CREDENTIALS`] message.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    // Get user from database
    let user: Option<(Uuid, String)> =
        sqlx::query_as("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(&login_data.email)
            .fetch_optional(&**pool)
            .await?;

    match user {
        Some((user_id, password_hash)) => {
            // Verify password
            if hasher.verify(&login_data.password, &password_hash)? {
                let token = tokens.issue(user_id)?;
                Ok(HttpResponse::Ok().json(AuthResponse { token }))
            } else {
                Err(AppError::Authentication(BAD_CREDENTIALS.into()))
            }
        }
        None => Err(AppError::Authentication(BAD_CREDENTIALS.into())),
    }
}
