#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::future::BoxFuture;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower::ServiceExt;

use genjira_backend::api::handlers::events::BoardEvent;
use genjira_backend::api::{create_router, AppState};
use genjira_backend::auth::tokens;
use genjira_backend::config::Config;
use genjira_backend::domain::{AiResponse, KanbanError, Priority, TaskDraft};
use genjira_backend::infrastructure::db;
use genjira_backend::services::AiGateway;

pub const TEST_USER_ID: &str = "user-test";
pub const TEST_EMAIL: &str = "dev@genjira.test";

/// Fresh in-memory database with the schema applied, one user, and an access
/// token for that user.
pub async fn setup_test_db() -> (SqlitePool, String) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let now = chrono::Utc::now().to_rfc3339();
    let password_hash = genjira_backend::auth::credentials::hash_password("correct-horse")
        .expect("Failed to hash password");
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(TEST_USER_ID)
    .bind(TEST_EMAIL)
    .bind(password_hash)
    .bind(&now)
    .bind(&now)
    .execute(&pool)
    .await
    .expect("Failed to insert test user");

    let key = tokens::get_or_create_signing_key(&pool)
        .await
        .expect("Failed to create signing key");
    let token = tokens::create_access_token(&key, TEST_USER_ID).expect("Failed to mint token");

    (pool, token)
}

pub fn sample_enhancement() -> AiResponse {
    AiResponse {
        improved_title: "Configure CI/CD pipeline".into(),
        improved_description: "As a developer, I want automated builds so that releases are safe."
            .into(),
        acceptance_criteria: vec![
            "Builds run on every push".into(),
            "Failed builds block merges".into(),
            "Artifacts are published".into(),
        ],
        suggested_tags: vec!["DevOps".into(), "CI".into()],
        estimated_story_points: 5,
    }
}

pub fn sample_drafts() -> Vec<TaskDraft> {
    vec![
        TaskDraft {
            title: "Fix login bug".into(),
            description: "Users are logged out on refresh".into(),
            priority: Priority::High,
            tags: vec!["Bug".into()],
            story_points: Some(3),
        },
        TaskDraft {
            title: "Update docs".into(),
            description: "Document the new import flow".into(),
            priority: Priority::Low,
            tags: vec!["Docs".into()],
            story_points: None,
        },
    ]
}

/// Canned gateway. `None` replies fail the way an unreachable service does.
#[derive(Default)]
pub struct StubGateway {
    pub enhancement: Option<AiResponse>,
    pub drafts: Option<Vec<TaskDraft>>,
    pub calls: AtomicUsize,
}

impl StubGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AiGateway for StubGateway {
    fn enhance_task<'a>(
        &'a self,
        _title: &'a str,
        _description: &'a str,
    ) -> BoxFuture<'a, Result<AiResponse, KanbanError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .enhancement
            .clone()
            .ok_or_else(|| KanbanError::Gateway("AI service unavailable".into()));
        Box::pin(async move { reply })
    }

    fn generate_tasks<'a>(
        &'a self,
        _raw_text: &'a str,
    ) -> BoxFuture<'a, Result<Vec<TaskDraft>, KanbanError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .drafts
            .clone()
            .ok_or_else(|| KanbanError::Gateway("AI service unavailable".into()));
        Box::pin(async move { reply })
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        frontend_dir: "./frontend/dist".to_string(),
        ..Config::default()
    }
}

pub fn test_app(pool: SqlitePool, gateway: Arc<StubGateway>) -> Router {
    test_app_with_events(pool, gateway).0
}

/// Router plus the sender its handlers broadcast board changes on.
pub fn test_app_with_events(
    pool: SqlitePool,
    gateway: Arc<StubGateway>,
) -> (Router, broadcast::Sender<BoardEvent>) {
    let (events, _) = broadcast::channel(100);
    let config = Arc::new(test_config());
    let state = AppState::new(Some(pool), events.clone(), gateway, Arc::clone(&config));
    (create_router(state, &config), events)
}

/// Sends a request carrying a `Cookie` header and returns the status, every
/// `Set-Cookie` value, and the body.
pub async fn make_cookie_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<String>,
    cookie: Option<&str>,
) -> (StatusCode, Vec<String>, String) {
    let mut request = Request::builder().uri(uri).method(method);

    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    let request = request
        .body(Body::from(body.unwrap_or_default()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let cookies = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, cookies, String::from_utf8(body.to_vec()).unwrap())
}

/// `name=value` pair of the named cookie among `Set-Cookie` values.
pub fn cookie_pair(set_cookies: &[String], name: &str) -> Option<String> {
    set_cookies
        .iter()
        .filter_map(|c| c.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
        .map(str::to_string)
}

pub async fn make_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<String>,
    token: Option<&str>,
) -> (StatusCode, String) {
    let mut request = Request::builder().uri(uri).method(method);

    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }

    let request = request
        .body(Body::from(body.unwrap_or_default()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();

    (status, body_str)
}
