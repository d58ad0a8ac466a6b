use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::entities::{self, DefaultValue, EntitySpec};
use crate::error::ApiError;
use crate::pipeline::{self, list_query, path_filters, populate, references};
use crate::pipeline::{ListData, ListParams};
use crate::response::{ApiResult, Envelope};
use crate::state::AppState;
use crate::store::{Document, FindQuery};

/// GET /<collection> - paginated listing, with population and nested-route
/// path filters
pub async fn list(
    spec: &'static EntitySpec,
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<ListParams>,
) -> ApiResult<ListData> {
    let options = query.parse();
    let filters =
        path_filters::resolve_path_filters(state.store.as_ref(), spec.path_filters, &params)
            .await?;
    let mut page =
        list_query::fetch_page(state.store.as_ref(), spec.collection, filters, &options).await?;

    let documents = std::mem::take(&mut page.documents);
    let records = render_population(&state, spec, documents, options.select.as_deref()).await?;
    Ok(Envelope::ok("Success", ListData::new(records, &page)))
}

/// GET /<collection>/:id - single document, populated
pub async fn get(
    spec: &'static EntitySpec,
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
) -> ApiResult<Value> {
    let (_, doc) = find_existing(&state, spec, &params).await?;
    let mut records = render_population(&state, spec, vec![doc], None).await?;
    Ok(Envelope::ok("Success", records.remove(0)))
}

/// POST /<collection> - validate, resolve references, insert. The created
/// document is returned as stored (references stay ids).
pub async fn create(
    spec: &'static EntitySpec,
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(raw) = body?;
    let body = pipeline::expect_object(raw)?;
    (spec.create_schema)().validate(&body)?;

    let created = insert_document(&state, spec, &params, body).await?;
    Ok(Envelope::created(format!("{} is created successfully", spec.display), created))
}

/// PUT /<collection>/:id - partial update over validated fields
pub async fn update(
    spec: &'static EntitySpec,
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(raw) = body?;
    let body = pipeline::expect_object(raw)?;
    (spec.update_schema)().validate(&body)?;

    let updated = update_document(&state, spec, &params, body).await?;
    Ok(Envelope::ok(format!("{} is updated successfully", spec.display), updated))
}

/// DELETE /<collection>/:id - remove and return the document
pub async fn remove(
    spec: &'static EntitySpec,
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
) -> ApiResult<Value> {
    let (id, _) = find_existing(&state, spec, &params).await?;
    let removed = state
        .store
        .delete_by_id(spec.collection, id)
        .await?
        .ok_or_else(|| ApiError::missing_document(spec.display, id))?;

    Ok(Envelope::ok(
        format!("{} is deleted successfully", spec.display),
        render_plain(spec, removed),
    ))
}

/// Reference resolution, defaults, uniqueness and the insert itself.
/// The body must already be schema-validated.
pub async fn insert_document(
    state: &AppState,
    spec: &'static EntitySpec,
    params: &HashMap<String, String>,
    mut body: Map<String, Value>,
) -> Result<Value, ApiError> {
    references::apply_references(state.store.as_ref(), spec.create_refs, params, &mut body)
        .await?;
    apply_defaults(spec.defaults, &mut body);
    ensure_unique(state, spec, &body, None).await?;

    let inserted = state.store.insert(spec.collection, Document::from(body)).await?;
    Ok(render_plain(spec, inserted))
}

/// Existence check, reference resolution, uniqueness and the update itself.
/// The body must already be schema-validated.
pub async fn update_document(
    state: &AppState,
    spec: &'static EntitySpec,
    params: &HashMap<String, String>,
    mut body: Map<String, Value>,
) -> Result<Value, ApiError> {
    let (id, _) = find_existing(state, spec, params).await?;
    references::apply_references(state.store.as_ref(), spec.update_refs, params, &mut body)
        .await?;
    ensure_unique(state, spec, &body, Some(id)).await?;

    let updated = state
        .store
        .update_by_id(spec.collection, id, body)
        .await?
        .ok_or_else(|| ApiError::missing_document(spec.display, id))?;
    Ok(render_plain(spec, updated))
}

/// Resolves the entity's id path parameter against the store. A malformed
/// id reads the same as an unknown one.
pub async fn find_existing(
    state: &AppState,
    spec: &'static EntitySpec,
    params: &HashMap<String, String>,
) -> Result<(Uuid, Document), ApiError> {
    let raw = params.get(spec.id_param).map(String::as_str).unwrap_or_default();
    let id = Uuid::parse_str(raw).map_err(|_| ApiError::missing_document(spec.display, raw))?;
    let doc = state
        .store
        .find_by_id(spec.collection, id)
        .await?
        .ok_or_else(|| ApiError::missing_document(spec.display, raw))?;
    Ok((id, doc))
}

/// Rejects values already taken in the collection's unique fields.
/// `exclude` skips the document being updated.
pub async fn ensure_unique(
    state: &AppState,
    spec: &'static EntitySpec,
    body: &Map<String, Value>,
    exclude: Option<Uuid>,
) -> Result<(), ApiError> {
    for field in spec.unique {
        let value = match body.get(*field) {
            Some(value) => value.clone(),
            None => continue,
        };
        let query = FindQuery::new().filter(field.to_string(), value);
        let matches = state.store.find(spec.collection, &query).await?;
        if matches.iter().any(|doc| doc.id() != exclude) {
            return Err(ApiError::validation(format!(
                "Duplicate value entered for {} field",
                field
            )));
        }
    }
    Ok(())
}

/// Fills missing create-time fields from the entity's default table
pub fn apply_defaults(defaults: &[(&'static str, DefaultValue)], body: &mut Map<String, Value>) {
    for (field, default) in defaults {
        if body.contains_key(*field) {
            continue;
        }
        let value = match default {
            DefaultValue::Text(text) => Value::String((*text).to_string()),
            DefaultValue::Now => {
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
            }
        };
        body.insert((*field).to_string(), value);
    }
}

/// Hidden-field stripping only; references stay as stored ids
pub fn render_plain(spec: &EntitySpec, doc: Document) -> Value {
    let mut map = doc.into_map();
    populate::strip_hidden(&mut map, spec.hidden);
    Value::Object(map)
}

/// Population, hidden-field stripping and select projection for read paths
pub async fn render_population(
    state: &AppState,
    spec: &'static EntitySpec,
    documents: Vec<Document>,
    select: Option<&[String]>,
) -> Result<Vec<Value>, ApiError> {
    let mut maps: Vec<Map<String, Value>> =
        documents.into_iter().map(Document::into_map).collect();
    populate::apply_population(state.store.as_ref(), spec.populate, &mut maps, entities::hidden_for)
        .await?;

    for map in &mut maps {
        populate::strip_hidden(map, spec.hidden);
        if let Some(select) = select {
            list_query::apply_select(map, select);
        }
    }
    Ok(maps.into_iter().map(Value::Object).collect())
}
