use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use super::auth::hash_password_field;
use super::crud;
use crate::entities::users;
use crate::pipeline;
use crate::response::{ApiResult, Envelope};
use crate::state::AppState;

/// POST /api/v1/users - admin-created account; unlike registration the
/// role and membership may be set explicitly
pub async fn create(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(raw) = body?;
    let mut body = pipeline::expect_object(raw)?;
    (users::SPEC.create_schema)().validate(&body)?;
    hash_password_field(&state, &mut body)?;

    let created = crud::insert_document(&state, &users::SPEC, &params, body).await?;
    Ok(Envelope::created("User is created successfully", created))
}

/// PUT /api/v1/users/:id - partial update; a new password is re-hashed
pub async fn update(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(raw) = body?;
    let mut body = pipeline::expect_object(raw)?;
    (users::SPEC.update_schema)().validate(&body)?;
    hash_password_field(&state, &mut body)?;

    let updated = crud::update_document(&state, &users::SPEC, &params, body).await?;
    Ok(Envelope::ok("User is updated successfully", updated))
}
