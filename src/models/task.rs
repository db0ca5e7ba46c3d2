use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Input structure for creating a new task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct AddTaskRequest {
    /// The title of the task.
    /// Must be between 1 and 100 characters.
    #[validate(length(min = 1, max = 100, message = "Add a title"))]
    #[serde(rename = "taskTitle")]
    pub task_title: String,

    /// An optional description for the task.
    #[serde(rename = "taskDesc", default)]
    pub task_desc: Option<String>,
}

/// Body for operations addressing a single task by id (toggle, delete).
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
}

/// Input structure for rewriting a task's title and description.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateTaskDataRequest {
    #[serde(rename = "_id")]
    pub id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Add a title"))]
    #[serde(rename = "taskTitle")]
    pub task_title: String,

    #[serde(rename = "taskDesc", default)]
    pub task_desc: Option<String>,
}

/// Represents a task entity as stored in the database and returned by the API.
///
/// Field names on the wire follow the public surface (`_id`, `taskTitle`,
/// `taskDesc`); the struct and column names stay snake_case.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// The title of the task.
    #[serde(rename = "taskTitle")]
    pub task_title: String,
    /// An optional description for the task.
    #[serde(rename = "taskDesc")]
    pub task_desc: Option<String>,
    /// Timestamp of when the task was created.
    pub date: DateTime<Utc>,
    /// Whether the task has been checked off. Defaults to false at creation.
    pub checked: bool,
    /// Identifier of the user who owns the task. Immutable after creation.
    pub author: Uuid,
}

impl Task {
    /// Creates a new `Task` from an [`AddTaskRequest`] and the owner's id.
    /// Sets `date` to the current time, `checked` to false, and `id` to a new UUID.
    pub fn new(input: AddTaskRequest, author: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_title: input.task_title,
            task_desc: input.task_desc,
            date: Utc::now(),
            checked: false,
            author,
        }
    }
}
