pub mod task;
pub mod user;

pub use task::{AddTaskRequest, Task, TaskRef, UpdateTaskDataRequest};
pub use user::{ChangePasswordRequest, UpdateProfileRequest, User, UserProfile};
