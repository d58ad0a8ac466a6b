use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use chrono::SecondsFormat;
use serde_json::{json, Map, Value};

use super::crud;
use crate::auth::{self, AuthUser, Claims};
use crate::entities::users;
use crate::error::ApiError;
use crate::pipeline;
use crate::pipeline::body_schema::{email, text, BodySchema};
use crate::response::{ApiResult, Envelope};
use crate::state::AppState;
use crate::store::FindQuery;

fn register_schema() -> BodySchema {
    BodySchema::new()
        .field("name", text().max(50))
        .field("email", email())
        .field("password", text().min(6).max(72))
        .require(&["name", "email", "password"])
}

fn login_schema() -> BodySchema {
    BodySchema::new()
        .field("email", email())
        .field("password", text())
        .require(&["email", "password"])
}

fn change_password_schema() -> BodySchema {
    BodySchema::new()
        .field("oldPassword", text().min(6).max(72))
        .field("newPassword", text().min(6).max(72))
        .require(&["oldPassword", "newPassword"])
}

/// POST /api/v1/auth/register - self-service signup. The role is never
/// taken from the body, so every registration lands as a customer.
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(raw) = body?;
    let mut body = pipeline::expect_object(raw)?;
    register_schema().validate(&body)?;
    hash_password_field(&state, &mut body)?;

    let created = crud::insert_document(&state, &users::SPEC, &HashMap::new(), body).await?;
    Ok(Envelope::ok("User is registered successfully", created))
}

/// POST /api/v1/auth/login - issues a bearer token. Unknown emails and
/// wrong passwords read the same.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(raw) = body?;
    let body = pipeline::expect_object(raw)?;
    login_schema().validate(&body)?;

    let email_value = body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();

    let query = FindQuery::new().filter("email", email_value);
    let user = state
        .store
        .find("users", &query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(invalid_credentials)?;

    let hash = user.get_str("password").unwrap_or_default();
    if !auth::verify_password(password, hash)? {
        return Err(invalid_credentials());
    }

    let user_id = user.id().ok_or_else(|| ApiError::unexpected("stored user has no id"))?;
    let claims = Claims::new(user_id, state.config.security.jwt_expiry_hours);
    let token = auth::generate_token(&claims, &state.config.security.jwt_secret)?;
    let expires_at = claims
        .expires_at()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| ApiError::unexpected("token expiry out of range"))?;

    Ok(Envelope::ok(
        "Logged in successfully",
        json!({ "token": token, "tokenExpiresAt": expires_at }),
    ))
}

/// POST /api/v1/auth/change-password - requires the current password and a
/// genuinely new one
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(raw) = body?;
    let body = pipeline::expect_object(raw)?;
    change_password_schema().validate(&body)?;

    let old_password = body.get("oldPassword").and_then(Value::as_str).unwrap_or_default();
    let new_password = body.get("newPassword").and_then(Value::as_str).unwrap_or_default();

    let stored = state
        .store
        .find_by_id("users", user.id)
        .await?
        .ok_or_else(|| ApiError::authentication("Invalid token"))?;
    let hash = stored.get_str("password").unwrap_or_default();

    if !auth::verify_password(old_password, hash)? {
        return Err(ApiError::validation("Old password is incorrect"));
    }
    if new_password == old_password {
        return Err(ApiError::validation(
            "New password must be different from the old password",
        ));
    }

    let mut changes = Map::new();
    changes.insert(
        "password".to_string(),
        Value::String(auth::hash_password(new_password, state.config.security.bcrypt_cost)?),
    );
    state
        .store
        .update_by_id("users", user.id, changes)
        .await?
        .ok_or_else(|| ApiError::authentication("Invalid token"))?;

    Ok(Envelope::ok("Password is changed successfully", Value::Null))
}

/// GET /api/v1/auth/me - the authenticated profile, membership populated
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Value> {
    let doc = state
        .store
        .find_by_id("users", user.id)
        .await?
        .ok_or_else(|| ApiError::authentication("Invalid token"))?;

    let mut records = crud::render_population(&state, &users::SPEC, vec![doc], None).await?;
    Ok(Envelope::ok("Success", records.remove(0)))
}

/// Replaces a plaintext `password` body field with its bcrypt hash
pub(crate) fn hash_password_field(
    state: &AppState,
    body: &mut Map<String, Value>,
) -> Result<(), ApiError> {
    let password = match body.get("password").and_then(Value::as_str) {
        Some(password) => password.to_string(),
        None => return Ok(()),
    };
    let hash = auth::hash_password(&password, state.config.security.bcrypt_cost)?;
    body.insert("password".to_string(), Value::String(hash));
    Ok(())
}

fn invalid_credentials() -> ApiError {
    ApiError::authentication("Invalid email or password")
}
