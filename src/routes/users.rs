use crate::{
    auth::{AuthenticatedUser, PasswordHasher},
    error::AppError,
    models::{ChangePasswordRequest, Task, UpdateProfileRequest, User, UserProfile},
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Retrieves the authenticated user's profile together with all their tasks.
///
/// Tasks are ordered by creation time descending (most recent first).
///
/// ## Responses:
/// - `200 OK`: `{"user": {"name", "email", "tasks": [...]}}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the user record no longer exists.
#[post("/get-user-info")]
pub async fn get_user_info(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let record = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash FROM users WHERE id = $1",
    )
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("This user does not exist".into()))?;

    let tasks = sqlx::query_as::<_, Task>(
        "SELECT id, task_title, task_desc, date, checked, author \
         FROM tasks WHERE author = $1 ORDER BY date DESC",
    )
    .bind(record.id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "user": UserProfile {
            name: record.name,
            email: record.email,
            tasks,
        }
    })))
}

/// Updates the authenticated user's name and email.
///
/// The email-uniqueness check excludes the user's own row, so re-submitting
/// an unchanged email is not a conflict.
///
/// ## Responses:
/// - `200 OK`: `{"done": true}`.
/// - `409 Conflict`: If the new email belongs to a different user.
/// - `422 Unprocessable Entity`: If name or email fail format validation.
#[post("/update-user-info")]
pub async fn update_user_info(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    profile_data: web::Json<UpdateProfileRequest>,
) -> Result<impl Responder, AppError> {
    profile_data.validate()?;

    let taken: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE email = $1 AND id <> $2")
            .bind(&profile_data.email)
            .bind(user.0)
            .fetch_optional(&**pool)
            .await?;

    if taken.is_some() {
        return Err(AppError::Conflict("Email already exists".into()));
    }

    sqlx::query("UPDATE users SET name = $1, email = $2 WHERE id = $3")
        .bind(&profile_data.name)
        .bind(&profile_data.email)
        .bind(user.0)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "done": true })))
}

/// Changes the authenticated user's password.
///
/// The old password must verify against the stored hash before the new one
/// is hashed and written.
///
/// ## Responses:
/// - `200 OK`: `{"done": true}`.
/// - `401 Unauthorized`: If the old password does not match.
/// - `404 Not Found`: If the user record no longer exists.
/// - `422 Unprocessable Entity`: If the new password fails format validation.
#[post("/update-user-password")]
pub async fn update_user_password(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordHasher>,
    user: AuthenticatedUser,
    password_data: web::Json<ChangePasswordRequest>,
) -> Result<impl Responder, AppError> {
    password_data.validate()?;

    let record = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash FROM users WHERE id = $1",
    )
    .bind(user.0)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("This user does not exist".into()))?;

    if !hasher.verify(&password_data.old_password, &record.password_hash)? {
        return Err(AppError::Authentication("Old password not correct".into()));
    }

    let new_hash = hasher.hash(&password_data.password)?;

    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(&new_hash)
        .bind(record.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "done": true })))
}
