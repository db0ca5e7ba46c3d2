pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::web;

/// Registers every operation of the public surface. All routes are POST and
/// live under the `/api` scope applied by the caller; `AuthMiddleware` on
/// that scope gates everything except login and signup.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::signup)
        .service(users::get_user_info)
        .service(users::update_user_info)
        .service(users::update_user_password)
        .service(tasks::add_task)
        .service(tasks::update_task)
        .service(tasks::delete_task)
        .service(tasks::update_task_data);
}
