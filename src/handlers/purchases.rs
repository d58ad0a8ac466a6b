use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::crud;
use crate::auth::AuthUser;
use crate::entities::purchases;
use crate::error::ApiError;
use crate::pipeline::{self, list_query, references, ListData, ListParams};
use crate::response::{ApiResult, Envelope};
use crate::state::AppState;
use crate::store::Document;

/// POST /api/v1/purchases - books seats for a showtime. The buyer comes
/// from the token and the total from the showtime's movie ticket price.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(raw) = body?;
    let mut body = pipeline::expect_object(raw)?;
    (purchases::SPEC.create_schema)().validate(&body)?;

    references::apply_references(
        state.store.as_ref(),
        purchases::SPEC.create_refs,
        &HashMap::new(),
        &mut body,
    )
    .await?;

    let total = total_price(&state, &body).await?;
    body.insert("user".to_string(), json!(user.id.to_string()));
    body.insert("totalPrice".to_string(), total);

    let inserted = state.store.insert("purchases", Document::from(body)).await?;
    Ok(Envelope::created(
        "Purchase is created successfully",
        crud::render_plain(&purchases::SPEC, inserted),
    ))
}

/// GET /api/v1/purchases - admins see everything, customers only their own
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ListParams>,
) -> ApiResult<ListData> {
    let options = query.parse();
    let mut filters = Vec::new();
    if !user.is_admin() {
        filters.push(("user".to_string(), json!(user.id.to_string())));
    }

    let mut page =
        list_query::fetch_page(state.store.as_ref(), "purchases", filters, &options).await?;
    let documents = std::mem::take(&mut page.documents);
    let records = crud::render_population(
        &state,
        &purchases::SPEC,
        documents,
        options.select.as_deref(),
    )
    .await?;
    Ok(Envelope::ok("Success", ListData::new(records, &page)))
}

/// GET /api/v1/purchases/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(params): Path<HashMap<String, String>>,
) -> ApiResult<Value> {
    let (_, doc) = crud::find_existing(&state, &purchases::SPEC, &params).await?;
    ensure_owned(&user, &doc)?;

    let mut records = crud::render_population(&state, &purchases::SPEC, vec![doc], None).await?;
    Ok(Envelope::ok("Success", records.remove(0)))
}

/// DELETE /api/v1/purchases/:id
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(params): Path<HashMap<String, String>>,
) -> ApiResult<Value> {
    let (id, doc) = crud::find_existing(&state, &purchases::SPEC, &params).await?;
    ensure_owned(&user, &doc)?;

    let removed = state
        .store
        .delete_by_id("purchases", id)
        .await?
        .ok_or_else(|| ApiError::missing_document(purchases::SPEC.display, id))?;
    Ok(Envelope::ok(
        "Purchase is deleted successfully",
        crud::render_plain(&purchases::SPEC, removed),
    ))
}

fn ensure_owned(user: &AuthUser, doc: &Document) -> Result<(), ApiError> {
    if user.is_admin() {
        return Ok(());
    }
    let owner = doc.get_str("user").and_then(|raw| Uuid::parse_str(raw).ok());
    if owner != Some(user.id) {
        return Err(ApiError::authorization("Access denied"));
    }
    Ok(())
}

async fn total_price(state: &AppState, body: &Map<String, Value>) -> Result<Value, ApiError> {
    let showtime_id = body.get("showtime").and_then(Value::as_str).unwrap_or_default();
    let seats = body.get("seats").and_then(Value::as_array).map(Vec::len).unwrap_or(0);

    let showtime = lookup(state, "showtimes", showtime_id, "Showtime").await?;
    let movie_id = showtime.get_str("movie").unwrap_or_default();
    let movie = lookup(state, "movies", movie_id, "Movie").await?;
    let price = movie.get_f64("ticketPrice").unwrap_or(0.0);

    Ok(json!(price * seats as f64))
}

async fn lookup(
    state: &AppState,
    collection: &str,
    raw_id: &str,
    display: &str,
) -> Result<Document, ApiError> {
    let id =
        Uuid::parse_str(raw_id).map_err(|_| ApiError::missing_document(display, raw_id))?;
    state
        .store
        .find_by_id(collection, id)
        .await?
        .ok_or_else(|| ApiError::missing_document(display, raw_id))
}
