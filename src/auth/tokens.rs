use std::collections::HashSet;

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::KanbanError;

pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

const SIGNING_KEY_NAME: &str = "jwt_signing_key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub nbf: usize,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn get_or_create_signing_key(pool: &SqlitePool) -> Result<Vec<u8>> {
    let existing: Option<(Vec<u8>,)> =
        sqlx::query_as("SELECT value FROM app_secrets WHERE key = ?")
            .bind(SIGNING_KEY_NAME)
            .fetch_optional(pool)
            .await?;

    if let Some((value,)) = existing {
        return Ok(value);
    }

    let mut key_bytes = [0_u8; 64];
    rand::thread_rng().fill_bytes(&mut key_bytes);

    // A concurrent first start may have inserted a key; whichever row won is read back.
    sqlx::query("INSERT OR IGNORE INTO app_secrets (key, value, created_at) VALUES (?, ?, ?)")
        .bind(SIGNING_KEY_NAME)
        .bind(key_bytes.to_vec())
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;

    let stored: (Vec<u8>,) = sqlx::query_as("SELECT value FROM app_secrets WHERE key = ?")
        .bind(SIGNING_KEY_NAME)
        .fetch_one(pool)
        .await?;

    Ok(stored.0)
}

pub fn create_access_token(key: &[u8], user_id: &str) -> Result<String> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + ACCESS_TOKEN_TTL_SECS as usize,
        iat: now,
        nbf: now,
        jti: Uuid::new_v4().to_string(),
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(key),
    )?)
}

pub fn verify_access_token(key: &[u8], token: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_nbf = true;
    validation.required_spec_claims = ["exp", "nbf", "iat", "sub", "jti"]
        .into_iter()
        .map(String::from)
        .collect::<HashSet<_>>();

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(key), &validation)?;
    Ok(token_data.claims)
}

pub fn create_refresh_token() -> String {
    let mut token_bytes = [0_u8; 64];
    rand::thread_rng().fill_bytes(&mut token_bytes);
    hex(&token_bytes)
}

pub fn hash_refresh_token(token: &str) -> String {
    hex(&Sha256::digest(token.as_bytes()))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Mints an access token and a stored, revocable refresh token for the user.
pub async fn issue_tokens(pool: &SqlitePool, user_id: &str) -> Result<TokenPair, KanbanError> {
    let signing_key = get_or_create_signing_key(pool)
        .await
        .map_err(|e| KanbanError::Internal(format!("Failed to load JWT signing key: {}", e)))?;
    let access_token = create_access_token(&signing_key, user_id)
        .map_err(|e| KanbanError::Internal(format!("Failed to create JWT token: {}", e)))?;

    let refresh_token = create_refresh_token();
    let now = Utc::now();

    sqlx::query(
        "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, created_at, revoked) VALUES (?, ?, ?, ?, ?, 0)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(hash_refresh_token(&refresh_token))
    .bind((now + Duration::days(REFRESH_TOKEN_TTL_DAYS)).to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}
