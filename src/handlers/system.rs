use axum::extract::State;
use chrono::Utc;
use serde_json::{json, Value};

use crate::response::{ApiResult, Envelope};
use crate::state::AppState;

/// GET / - service descriptor
pub async fn root() -> ApiResult<Value> {
    Ok(Envelope::ok(
        "Success",
        json!({
            "name": "Cinema API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Cinema management REST backend",
            "endpoints": {
                "api": "/api/v1",
                "health": "/health",
            },
        }),
    ))
}

/// GET /health - liveness plus a store round trip
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    state.store.ping().await?;

    Ok(Envelope::ok(
        "Success",
        json!({
            "status": "ok",
            "timestamp": Utc::now(),
            "store": "ok",
        }),
    ))
}
