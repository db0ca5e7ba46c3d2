use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{AddTaskRequest, Task, TaskRef, UpdateTaskDataRequest},
};
use actix_web::{post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

/// Creates a new task for the authenticated user.
///
/// The task is stamped with the current time, starts unchecked, and its
/// author is the authenticated user; the author never changes afterwards.
///
/// ## Request Body:
/// - `taskTitle`: The title of the task, 1 to 100 characters (required).
/// - `taskDesc` (optional): A description of the task.
///
/// ## Responses:
/// - `201 Created`: `{"insertedTask": task}` including the store-assigned `_id`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If the title fails validation.
#[post("/add-task")]
pub async fn add_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_data: web::Json<AddTaskRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.0);

    let inserted = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (id, task_title, task_desc, date, checked, author) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING id, task_title, task_desc, date, checked, author",
    )
    .bind(task.id)
    .bind(task.task_title)
    .bind(task.task_desc)
    .bind(task.date)
    .bind(task.checked)
    .bind(task.author)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(json!({ "insertedTask": inserted })))
}

/// Toggles a task's checked flag.
///
/// The task must exist and belong to the authenticated user; a task owned by
/// someone else is rejected before anything is written.
///
/// ## Responses:
/// - `200 OK`: `{"done": true}`.
/// - `403 Forbidden`: If the task belongs to another user.
/// - `404 Not Found`: If no task has the given id.
#[post("/update-task")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_ref: web::Json<TaskRef>,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(
        "SELECT id, task_title, task_desc, date, checked, author FROM tasks WHERE id = $1",
    )
    .bind(task_ref.id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if task.author != user.0 {
        return Err(AppError::Forbidden("Task belongs to another user".into()));
    }

    sqlx::query("UPDATE tasks SET checked = $1 WHERE id = $2")
        .bind(!task.checked)
        .bind(task.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "done": true })))
}

/// Rewrites a task's title and description.
///
/// The update is filtered by both id and author in one statement; when
/// nothing matches (absent id or another user's task) the call is a no-op
/// success.
///
/// ## Responses:
/// - `200 OK`: `{"done": true}`.
/// - `422 Unprocessable Entity`: If the title fails validation.
#[post("/update-task-data")]
pub async fn update_task_data(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_data: web::Json<UpdateTaskDataRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    sqlx::query("UPDATE tasks SET task_title = $1, task_desc = $2 WHERE id = $3 AND author = $4")
        .bind(&task_data.task_title)
        .bind(&task_data.task_desc)
        .bind(task_data.id)
        .bind(user.0)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "done": true })))
}

/// Deletes a task.
///
/// The delete is filtered by both id and author; deleting zero rows is still
/// success, so the operation is idempotent and cannot touch other users'
/// tasks.
///
/// ## Responses:
/// - `200 OK`: `{"done": true}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[post("/delete-task")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: AuthenticatedUser,
    task_ref: web::Json<TaskRef>,
) -> Result<impl Responder, AppError> {
    sqlx::query("DELETE FROM tasks WHERE id = $1 AND author = $2")
        .bind(task_ref.id)
        .bind(user.0)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "done": true })))
}
