use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context loaded from the store for the token subject
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Bearer token middleware: validates the token and injects an [`AuthUser`]
/// into the request. The subject must still exist in the store, so tokens
/// of deleted users stop working.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::authentication("Access denied. No token provided"))?;

    let claims = auth::decode_token(&token, &state.config.security.jwt_secret)
        .map_err(|_| ApiError::authentication("Invalid token"))?;

    let user = state
        .store
        .find_by_id("users", claims.sub)
        .await?
        .ok_or_else(|| ApiError::authentication("Invalid token"))?;

    let auth_user = AuthUser {
        id: claims.sub,
        name: user.get_str("name").unwrap_or_default().to_string(),
        email: user.get_str("email").unwrap_or_default().to_string(),
        role: user.get_str("role").unwrap_or("customer").to_string(),
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Role gate layered inside [`auth_middleware`]: rejects non-admin subjects
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<AuthUser>()
        .map(AuthUser::is_admin)
        .unwrap_or(false);

    if !is_admin {
        return Err(ApiError::authorization("Access denied"));
    }

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("authorization")?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?;

    if token.trim().is_empty() {
        return None;
    }
    Some(token.to_string())
}
