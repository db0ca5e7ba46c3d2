use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{rt, test, web, App, HttpServer};
use dotenv::dotenv;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::TcpListener;
use tasknest::auth::{AuthMiddleware, PasswordHasher, TokenService};
use tasknest::routes;
use tasknest::routes::health;

const TEST_JWT_SECRET: &str = "integration-test-secret";
const TEST_BCRYPT_COST: u32 = 4;

async fn test_pool() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations on test DB");
    pool
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    // Tasks go with the user via ON DELETE CASCADE.
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

async fn signup_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/signup")
        .set_json(&json!({ "name": name, "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert!(
        status.is_success(),
        "Setup: signup for {} failed. Body: {:?}",
        email,
        String::from_utf8_lossy(&body)
    );
    let auth: tasknest::auth::AuthResponse =
        serde_json::from_slice(&body).expect("Failed to parse signup response");
    auth.token
}

async fn fetch_profile(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
) -> serde_json::Value {
    let req = test::TestRequest::post()
        .uri("/api/get-user-info")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert!(resp.status().is_success(), "get-user-info failed");
    test::read_body_json(resp).await
}

macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(TokenService::new(TEST_JWT_SECRET)))
                .app_data(web::Data::new(PasswordHasher::new(TEST_BCRYPT_COST)))
                .wrap(Logger::default())
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

// Requires a running PostgreSQL at DATABASE_URL; run with `cargo test -- --ignored`.
#[ignore]
#[actix_rt::test]
async fn test_task_lifecycle() {
    let pool = test_pool().await;
    let email = "lifecycle@example.com";
    cleanup_user(&pool, email).await;

    let app = test_app!(pool);
    let token = signup_user(&app, "Lifecycle User", email, "Password123").await;

    // Fresh account: profile has no tasks yet
    let profile = fetch_profile(&app, &token).await;
    assert_eq!(profile["user"]["name"], "Lifecycle User");
    assert_eq!(profile["user"]["email"], email);
    assert_eq!(profile["user"]["tasks"], json!([]));

    // Add a task
    let req = test::TestRequest::post()
        .uri("/api/add-task")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "taskTitle": "Buy milk", "taskDesc": "Two liters" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let task = &body["insertedTask"];
    assert_eq!(task["taskTitle"], "Buy milk");
    assert_eq!(task["taskDesc"], "Two liters");
    assert_eq!(task["checked"], false);
    let task_id = task["_id"].as_str().expect("insertedTask carries _id").to_string();

    // Toggle: checked flips to true
    let req = test::TestRequest::post()
        .uri("/api/update-task")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "_id": task_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["done"], true);

    let profile = fetch_profile(&app, &token).await;
    assert_eq!(profile["user"]["tasks"][0]["checked"], true);

    // Toggle back: checked flips to false
    let req = test::TestRequest::post()
        .uri("/api/update-task")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "_id": task_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let profile = fetch_profile(&app, &token).await;
    assert_eq!(profile["user"]["tasks"][0]["checked"], false);

    // Toggling a task that does not exist is a 404
    let req = test::TestRequest::post()
        .uri("/api/update-task")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "_id": uuid::Uuid::new_v4() }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND);

    // Rewrite title and description
    let req = test::TestRequest::post()
        .uri("/api/update-task-data")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "_id": task_id, "taskTitle": "Buy bread", "taskDesc": "Whole grain" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let profile = fetch_profile(&app, &token).await;
    assert_eq!(profile["user"]["tasks"][0]["taskTitle"], "Buy bread");
    assert_eq!(profile["user"]["tasks"][0]["taskDesc"], "Whole grain");

    // Delete, then delete again: both succeed, the second is a no-op
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/api/delete-task")
            .append_header(("Authorization", format!("Bearer {}", token)))
            .set_json(&json!({ "_id": task_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["done"], true);
    }

    let profile = fetch_profile(&app, &token).await;
    assert_eq!(profile["user"]["tasks"], json!([]));

    cleanup_user(&pool, email).await;
}

// Requires a running PostgreSQL at DATABASE_URL; run with `cargo test -- --ignored`.
#[ignore]
#[actix_rt::test]
async fn test_tasks_are_ordered_most_recent_first() {
    let pool = test_pool().await;
    let email = "ordering@example.com";
    cleanup_user(&pool, email).await;

    let app = test_app!(pool);
    let token = signup_user(&app, "Ordering User", email, "Password123").await;

    for title in ["first", "second", "third"] {
        let req = test::TestRequest::post()
            .uri("/api/add-task")
            .append_header(("Authorization", format!("Bearer {}", token)))
            .set_json(&json!({ "taskTitle": title }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    }

    let profile = fetch_profile(&app, &token).await;
    let titles: Vec<&str> = profile["user"]["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["taskTitle"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["third", "second", "first"]);

    cleanup_user(&pool, email).await;
}

// Requires a running PostgreSQL at DATABASE_URL; run with `cargo test -- --ignored`.
#[ignore]
#[actix_rt::test]
async fn test_cross_user_isolation() {
    let pool = test_pool().await;
    let alice_email = "alice_isolation@example.com";
    let bob_email = "bob_isolation@example.com";
    cleanup_user(&pool, alice_email).await;
    cleanup_user(&pool, bob_email).await;

    let app = test_app!(pool);
    let alice_token = signup_user(&app, "Alice", alice_email, "Password123").await;
    let bob_token = signup_user(&app, "Bob", bob_email, "Password123").await;

    // Alice creates a task
    let req = test::TestRequest::post()
        .uri("/api/add-task")
        .append_header(("Authorization", format!("Bearer {}", alice_token)))
        .set_json(&json!({ "taskTitle": "Alice's task" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let task_id = body["insertedTask"]["_id"].as_str().unwrap().to_string();

    // Bob cannot toggle it, and the flag stays down
    let req = test::TestRequest::post()
        .uri("/api/update-task")
        .append_header(("Authorization", format!("Bearer {}", bob_token)))
        .set_json(&json!({ "_id": task_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);

    let profile = fetch_profile(&app, &alice_token).await;
    assert_eq!(profile["user"]["tasks"][0]["checked"], false);

    // Bob's rewrite matches nothing and reports a no-op success
    let req = test::TestRequest::post()
        .uri("/api/update-task-data")
        .append_header(("Authorization", format!("Bearer {}", bob_token)))
        .set_json(&json!({ "_id": task_id, "taskTitle": "Hijacked" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let profile = fetch_profile(&app, &alice_token).await;
    assert_eq!(profile["user"]["tasks"][0]["taskTitle"], "Alice's task");

    // Bob's delete matches nothing either; Alice keeps her task
    let req = test::TestRequest::post()
        .uri("/api/delete-task")
        .append_header(("Authorization", format!("Bearer {}", bob_token)))
        .set_json(&json!({ "_id": task_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let profile = fetch_profile(&app, &alice_token).await;
    assert_eq!(profile["user"]["tasks"].as_array().unwrap().len(), 1);

    cleanup_user(&pool, alice_email).await;
    cleanup_user(&pool, bob_email).await;
}

// Requires a running PostgreSQL at DATABASE_URL; run with `cargo test -- --ignored`.
#[ignore]
#[actix_rt::test]
async fn test_profile_update_and_password_change() {
    let pool = test_pool().await;
    let email = "profile@example.com";
    let new_email = "profile2@example.com";
    let other_email = "profile_other@example.com";
    cleanup_user(&pool, email).await;
    cleanup_user(&pool, new_email).await;
    cleanup_user(&pool, other_email).await;

    let app = test_app!(pool);
    let token = signup_user(&app, "Profile User", email, "secret1").await;
    let _other = signup_user(&app, "Other User", other_email, "Password123").await;

    // Taking another user's email is a conflict
    let req = test::TestRequest::post()
        .uri("/api/update-user-info")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "name": "Profile User", "email": other_email }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CONFLICT);

    // Re-submitting your own email is not a conflict
    let req = test::TestRequest::post()
        .uri("/api/update-user-info")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "name": "Profile User", "email": email }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    // Move to a fresh email, then login with it and the unchanged password
    let req = test::TestRequest::post()
        .uri("/api/update-user-info")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "name": "Profile User", "email": new_email }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(&json!({ "email": new_email, "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    // Password change rejects a wrong old password
    let req = test::TestRequest::post()
        .uri("/api/update-user-password")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "oldPassword": "not-the-one", "password": "secret2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    // And accepts the right one
    let req = test::TestRequest::post()
        .uri("/api/update-user-password")
        .append_header(("Authorization", format!("Bearer {}", token)))
        .set_json(&json!({ "oldPassword": "secret1", "password": "secret2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    // Old password no longer logs in; the new one does
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(&json!({ "email": new_email, "password": "secret1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(&json!({ "email": new_email, "password": "secret2" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);

    cleanup_user(&pool, new_email).await;
    cleanup_user(&pool, other_email).await;
}

// Exercises the auth gate over a real socket. The pool is lazy, so no
// database is needed: the request is rejected before any query runs.
#[actix_rt::test]
async fn test_add_task_without_token() {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://postgres@localhost/tasknest_unreachable")
        .expect("lazy pool construction should not fail");

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener); // Drop the listener so the server can bind to it

    let server_pool = pool.clone();
    let _server_handle = rt::spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(server_pool.clone()))
                .app_data(web::Data::new(TokenService::new(TEST_JWT_SECRET)))
                .app_data(web::Data::new(PasswordHasher::new(TEST_BCRYPT_COST)))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                )
        })
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    // Give the server a moment to start
    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let request_url = format!("http://127.0.0.1:{}/api/add-task", port);

    let resp = client
        .post(&request_url)
        .json(&json!({ "taskTitle": "No token task" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // A garbage token is also rejected with 401
    let resp = client
        .post(&request_url)
        .header("Authorization", "Bearer garbage")
        .json(&json!({ "taskTitle": "Bad token task" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
}
