use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::state::AppState;
use crate::auth::{session, tokens};

/// Identity of the caller; its user id doubles as the board key.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl AuthUser {
    pub fn board_key(&self) -> &str {
        &self.user_id
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = session::access_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let db = state
        .require_db()
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let signing_key = tokens::get_or_create_signing_key(db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let claims = tokens::verify_access_token(&signing_key, &token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected access token");
        StatusCode::UNAUTHORIZED
    })?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(req).await)
}
