use std::collections::HashMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Map, Value};

use super::crud;
use crate::entities::announcements;
use crate::error::ApiError;
use crate::pipeline;
use crate::pipeline::body_schema::parse_iso_date;
use crate::response::{ApiResult, Envelope};
use crate::state::AppState;
use crate::store::FindQuery;

/// POST /api/v1/announcements - create with the display-order position
/// assigned automatically (max existing + 1, first one gets 0)
pub async fn create(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(raw) = body?;
    let mut body = pipeline::expect_object(raw)?;
    (announcements::SPEC.create_schema)().validate(&body)?;

    // Defaults first so a defaulted startedDateTime takes part in the
    // window check
    crud::apply_defaults(announcements::SPEC.defaults, &mut body);
    check_date_window(&body)?;

    let position = next_index_position(&state).await?;
    body.insert("indexPosition".to_string(), json!(position));

    let created = crud::insert_document(&state, &announcements::SPEC, &params, body).await?;
    Ok(Envelope::created("Announcement is created successfully", created))
}

fn check_date_window(body: &Map<String, Value>) -> Result<(), ApiError> {
    let started = body.get("startedDateTime").and_then(Value::as_str).and_then(parse_iso_date);
    let ended = body.get("endedDateTime").and_then(Value::as_str).and_then(parse_iso_date);

    if let (Some(started), Some(ended)) = (started, ended) {
        if ended < started {
            return Err(ApiError::validation(
                "endedDateTime must be greater or equal to startedDateTime",
            ));
        }
    }
    Ok(())
}

async fn next_index_position(state: &AppState) -> Result<i64, ApiError> {
    let existing = state.store.find("announcements", &FindQuery::new()).await?;
    let max = existing
        .iter()
        .filter_map(|doc| doc.get_f64("indexPosition"))
        .fold(-1.0_f64, f64::max);
    Ok(max as i64 + 1)
}
