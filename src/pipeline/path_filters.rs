use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::Store;

/// Scopes a list route to the resource named by a path parameter: the
/// parameter must resolve in `collection`, and the listed documents are
/// filtered on `field` equalling it.
#[derive(Debug, Clone, Copy)]
pub struct PathFilterRule {
    pub field: &'static str,
    pub param: &'static str,
    pub collection: &'static str,
    pub display: &'static str,
}

/// Turns the matched path parameters into equality filters. Rules whose
/// parameter is absent (the same handler mounted on an unnested route) are
/// skipped.
pub async fn resolve_path_filters(
    store: &dyn Store,
    rules: &[PathFilterRule],
    params: &HashMap<String, String>,
) -> Result<Vec<(String, Value)>, ApiError> {
    let mut filters = Vec::new();
    for rule in rules {
        let raw = match params.get(rule.param) {
            Some(raw) => raw,
            None => continue,
        };
        let id = Uuid::parse_str(raw)
            .map_err(|_| ApiError::missing_document(rule.display, raw))?;
        let found = store.find_by_id(rule.collection, id).await?;
        if found.is_none() {
            return Err(ApiError::missing_document(rule.display, raw));
        }
        filters.push((rule.field.to_string(), Value::String(id.to_string())));
    }
    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryStore};
    use serde_json::json;

    const RULES: &[PathFilterRule] = &[PathFilterRule {
        field: "genres",
        param: "genreId",
        collection: "genres",
        display: "Genre",
    }];

    #[tokio::test]
    async fn resolving_param_becomes_an_equality_filter() {
        let store = MemoryStore::new();
        let doc = Document::from_object(json!({ "name": "Horror" })).unwrap();
        let genre = store.insert("genres", doc).await.unwrap().id().unwrap();

        let mut params = HashMap::new();
        params.insert("genreId".to_string(), genre.to_string());

        let filters = resolve_path_filters(&store, RULES, &params).await.unwrap();
        assert_eq!(filters, vec![("genres".to_string(), json!(genre.to_string()))]);
    }

    #[tokio::test]
    async fn unknown_param_is_a_not_found() {
        let store = MemoryStore::new();
        let missing = Uuid::new_v4();
        let mut params = HashMap::new();
        params.insert("genreId".to_string(), missing.to_string());

        let err = resolve_path_filters(&store, RULES, &params).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), format!("Genre with given ID ({}) is not found", missing));
    }

    #[tokio::test]
    async fn absent_param_adds_no_filter() {
        let store = MemoryStore::new();
        let filters = resolve_path_filters(&store, RULES, &HashMap::new()).await.unwrap();
        assert!(filters.is_empty());
    }
}
