use axum::http::{header, HeaderMap};

use super::tokens::{TokenPair, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_DAYS};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

pub fn token_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}");

    if secure {
        cookie.push_str("; Secure");
    }

    cookie
}

pub fn clear_cookie(name: &str, secure: bool) -> String {
    token_cookie(name, "", 0, secure)
}

pub fn session_cookies(tokens: &TokenPair, secure: bool) -> [String; 2] {
    [
        token_cookie(
            ACCESS_TOKEN_COOKIE,
            &tokens.access_token,
            ACCESS_TOKEN_TTL_SECS,
            secure,
        ),
        token_cookie(
            REFRESH_TOKEN_COOKIE,
            &tokens.refresh_token,
            REFRESH_TOKEN_TTL_DAYS * 24 * 60 * 60,
            secure,
        ),
    ]
}

pub fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_header| cookie_header.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            let value = value.trim();
            (name.trim() == cookie_name && !value.is_empty()).then(|| value.to_string())
        })
}

/// Access token from an `Authorization: Bearer` header, falling back to the session cookie.
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| cookie_value(headers, ACCESS_TOKEN_COOKIE))
}
