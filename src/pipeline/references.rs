use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::Store;

/// Where a referenced id is read from
#[derive(Debug, Clone, Copy)]
pub enum RefSource {
    /// A body field holding one id string or an array of id strings
    Body(&'static str),
    /// A path parameter holding one id string
    Param(&'static str),
}

/// One foreign-key style check: the id(s) read from `source` must exist in
/// `collection`. When `destination` is set the validated id(s) are written
/// back into the body under that name, replacing the source field.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceRule {
    pub collection: &'static str,
    pub display: &'static str,
    pub source: RefSource,
    pub destination: Option<&'static str>,
}

/// Validates reference rules in declaration order, failing on the first id
/// that does not resolve. Rules whose source is absent are skipped.
pub async fn apply_references(
    store: &dyn Store,
    rules: &[ReferenceRule],
    params: &HashMap<String, String>,
    body: &mut Map<String, Value>,
) -> Result<(), ApiError> {
    for rule in rules {
        let (raw_ids, is_list) = match rule.source {
            RefSource::Body(name) => match body.get(name) {
                None => continue,
                Some(Value::Array(items)) => (items.iter().map(raw_text).collect(), true),
                Some(other) => (vec![raw_text(other)], false),
            },
            RefSource::Param(name) => match params.get(name) {
                None => continue,
                Some(raw) => (vec![raw.clone()], false),
            },
        };

        let mut validated = Vec::with_capacity(raw_ids.len());
        for raw in &raw_ids {
            let id = Uuid::parse_str(raw)
                .map_err(|_| ApiError::missing_document(rule.display, raw))?;
            let found = store.find_by_id(rule.collection, id).await?;
            if found.is_none() {
                return Err(ApiError::missing_document(rule.display, raw));
            }
            validated.push(id);
        }

        if let Some(dest) = rule.destination {
            let value = if is_list {
                Value::Array(validated.iter().map(|id| Value::String(id.to_string())).collect())
            } else {
                Value::String(validated[0].to_string())
            };
            body.insert(dest.to_string(), value);
            if let RefSource::Body(name) = rule.source {
                if name != dest {
                    body.remove(name);
                }
            }
        }
    }

    Ok(())
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
