use axum::{
    body::Body,
    extract::{Extension, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::state::AppState;
use crate::auth::{credentials, middleware::AuthUser, session, tokens};
use crate::domain::KanbanError;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
}

#[derive(Debug, sqlx::FromRow)]
struct UserWithPassword {
    id: String,
    email: String,
    created_at: String,
    password_hash: String,
}

async fn fetch_user(db: &sqlx::SqlitePool, user_id: &str) -> Result<Option<UserResponse>, sqlx::Error> {
    sqlx::query_as("SELECT id, email, created_at FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Creates the account only; the client signs in afterwards.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<UserResponse>), KanbanError> {
    let email = credentials::normalize_email(&req.email)?;
    credentials::check_password_strength(&req.password)?;

    let db = state.require_db()?;

    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(db)
        .await?;
    if existing.is_some() {
        return Err(KanbanError::Conflict("User already registered".into()));
    }

    let password_hash = credentials::hash_password(&req.password)
        .map_err(|e| KanbanError::Internal(format!("Failed to hash password: {}", e)))?;
    let user_id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, email, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user_id)
    .bind(&email)
    .bind(&password_hash)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    tracing::info!(user_id = user_id.as_str(), "User registered");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user_id,
            email,
            created_at: now,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Response, KanbanError> {
    let invalid = || KanbanError::Unauthorized("Invalid login credentials".into());
    let email = req.email.trim().to_lowercase();
    let db = state.require_db()?;

    let user: UserWithPassword = sqlx::query_as(
        "SELECT id, email, created_at, password_hash FROM users WHERE email = ?",
    )
    .bind(&email)
    .fetch_optional(db)
    .await?
    .ok_or_else(invalid)?;

    let valid = credentials::verify_password(&req.password, &user.password_hash)
        .map_err(|e| KanbanError::Internal(format!("Failed to verify password: {}", e)))?;
    if !valid {
        tracing::debug!(user_id = user.id.as_str(), "Password mismatch on login");
        return Err(invalid());
    }

    let tokens = tokens::issue_tokens(db, &user.id).await?;

    build_auth_response(
        UserResponse {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
        },
        &tokens,
        state.config.cookie_secure,
    )
}

/// Rotates the refresh token: the presented one is revoked and a new pair issued.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: Option<Json<RefreshRequest>>,
) -> Result<Response, KanbanError> {
    let invalid = || KanbanError::Unauthorized("Invalid refresh token".into());
    let db = state.require_db()?;

    let presented = session::cookie_value(&headers, session::REFRESH_TOKEN_COOKIE)
        .or_else(|| req.map(|Json(body)| body.refresh_token.trim().to_string()))
        .filter(|token| !token.is_empty())
        .ok_or_else(invalid)?;
    let now = chrono::Utc::now().to_rfc3339();

    let (token_id, user_id): (String, String) = sqlx::query_as(
        "SELECT id, user_id FROM refresh_tokens WHERE token_hash = ? AND revoked = 0 AND expires_at > ? ORDER BY created_at DESC LIMIT 1",
    )
    .bind(tokens::hash_refresh_token(&presented))
    .bind(&now)
    .fetch_optional(db)
    .await?
    .ok_or_else(invalid)?;

    sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE id = ?")
        .bind(&token_id)
        .execute(db)
        .await?;

    let user = fetch_user(db, &user_id).await?.ok_or_else(invalid)?;
    let tokens = tokens::issue_tokens(db, &user.id).await?;

    build_auth_response(user, &tokens, state.config.cookie_secure)
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, KanbanError> {
    let db = state.require_db()?;

    if let Some(refresh_token) = session::cookie_value(&headers, session::REFRESH_TOKEN_COOKIE) {
        sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE token_hash = ?")
            .bind(tokens::hash_refresh_token(&refresh_token))
            .execute(db)
            .await?;
    }

    let secure = state.config.cookie_secure;
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(
            header::SET_COOKIE,
            session::clear_cookie(session::ACCESS_TOKEN_COOKIE, secure),
        )
        .header(
            header::SET_COOKIE,
            session::clear_cookie(session::REFRESH_TOKEN_COOKIE, secure),
        )
        .body(Body::empty())
        .map_err(|e| KanbanError::Internal(format!("Failed to build auth response: {}", e)))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<UserResponse>, KanbanError> {
    let db = state.require_db()?;

    let user = fetch_user(db, &auth_user.user_id)
        .await?
        .ok_or_else(|| KanbanError::NotFound("User not found".into()))?;

    Ok(Json(user))
}

fn build_auth_response(
    user: UserResponse,
    tokens: &tokens::TokenPair,
    secure: bool,
) -> Result<Response, KanbanError> {
    let [access_cookie, refresh_cookie] = session::session_cookies(tokens, secure);
    let response_body = Json(LoginResponse { user }).into_response().into_body();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::SET_COOKIE, access_cookie)
        .header(header::SET_COOKIE, refresh_cookie)
        .body(response_body)
        .map_err(|e| KanbanError::Internal(format!("Failed to build auth response: {}", e)))
}
