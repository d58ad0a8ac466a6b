pub mod body_schema;
pub mod list_query;
pub mod path_filters;
pub mod populate;
pub mod references;

pub use body_schema::BodySchema;
pub use list_query::{ListData, ListOptions, ListParams, Page};
pub use path_filters::PathFilterRule;
pub use populate::PopulateRule;
pub use references::{RefSource, ReferenceRule};

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Coerces a parsed JSON body into an object map
pub fn expect_object(value: Value) -> Result<Map<String, Value>, ApiError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::validation("Request body must be a JSON object")),
    }
}
