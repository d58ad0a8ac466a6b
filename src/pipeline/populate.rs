use std::collections::HashMap;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::store::Store;

/// Replaces the stored id(s) under `field` with the referenced documents
/// from `collection` when serializing outward.
#[derive(Debug, Clone, Copy)]
pub struct PopulateRule {
    pub field: &'static str,
    pub collection: &'static str,
}

/// Expands populate rules over a batch of documents, one level deep.
/// Lookups are cached per call so a page sharing referenced ids costs one
/// store read per distinct id. Ids that no longer resolve become `null`.
/// The target's hidden fields (via `hidden_for`) are stripped from every
/// populated sub-document.
pub async fn apply_population(
    store: &dyn Store,
    rules: &[PopulateRule],
    docs: &mut [Map<String, Value>],
    hidden_for: fn(&str) -> &'static [&'static str],
) -> Result<(), ApiError> {
    if rules.is_empty() {
        return Ok(());
    }

    let mut cache: HashMap<(&'static str, String), Value> = HashMap::new();
    for doc in docs.iter_mut() {
        for rule in rules {
            let current = match doc.get(rule.field) {
                Some(value) => value.clone(),
                None => continue,
            };
            let populated = match current {
                Value::String(id) => {
                    lookup(store, &mut cache, rule.collection, id, hidden_for).await?
                }
                Value::Array(ids) => {
                    let mut expanded = Vec::with_capacity(ids.len());
                    for item in ids {
                        let value = match item {
                            Value::String(id) => {
                                lookup(store, &mut cache, rule.collection, id, hidden_for).await?
                            }
                            other => other,
                        };
                        expanded.push(value);
                    }
                    Value::Array(expanded)
                }
                other => other,
            };
            doc.insert(rule.field.to_string(), populated);
        }
    }
    Ok(())
}

async fn lookup(
    store: &dyn Store,
    cache: &mut HashMap<(&'static str, String), Value>,
    collection: &'static str,
    id: String,
    hidden_for: fn(&str) -> &'static [&'static str],
) -> Result<Value, ApiError> {
    if let Some(hit) = cache.get(&(collection, id.clone())) {
        return Ok(hit.clone());
    }

    let value = match Uuid::parse_str(&id) {
        Ok(uuid) => match store.find_by_id(collection, uuid).await? {
            Some(doc) => {
                let mut map = doc.into_map();
                strip_hidden(&mut map, hidden_for(collection));
                Value::Object(map)
            }
            None => Value::Null,
        },
        Err(_) => Value::Null,
    };

    cache.insert((collection, id), value.clone());
    Ok(value)
}

/// Removes fields that must never serialize outward
pub fn strip_hidden(doc: &mut Map<String, Value>, hidden: &[&str]) {
    for field in hidden {
        doc.remove(*field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, MemoryStore};
    use serde_json::json;

    const RULES: &[PopulateRule] = &[
        PopulateRule { field: "genres", collection: "genres" },
        PopulateRule { field: "movieType", collection: "movie-types" },
    ];

    fn no_hidden(_collection: &str) -> &'static [&'static str] {
        &[]
    }

    fn user_password_hidden(collection: &str) -> &'static [&'static str] {
        if collection == "users" {
            &["password"]
        } else {
            &[]
        }
    }

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn expands_scalar_and_list_references() {
        let store = MemoryStore::new();
        let genre = store
            .insert("genres", Document::from_object(json!({ "name": "Horror" })).unwrap())
            .await
            .unwrap();
        let movie_type = store
            .insert("movie-types", Document::from_object(json!({ "name": "2D" })).unwrap())
            .await
            .unwrap();

        let mut docs = vec![obj(json!({
            "title": "Scary",
            "genres": [genre.id().unwrap().to_string()],
            "movieType": movie_type.id().unwrap().to_string(),
        }))];
        apply_population(&store, RULES, &mut docs, no_hidden).await.unwrap();

        let genres = docs[0].get("genres").and_then(Value::as_array).unwrap();
        assert_eq!(genres[0].get("name"), Some(&json!("Horror")));
        assert_eq!(
            docs[0].get("movieType").and_then(|v| v.get("name")),
            Some(&json!("2D"))
        );
    }

    #[tokio::test]
    async fn dangling_ids_become_null() {
        let store = MemoryStore::new();
        let mut docs = vec![obj(json!({
            "title": "Orphan",
            "genres": [Uuid::new_v4().to_string()],
            "movieType": Uuid::new_v4().to_string(),
        }))];
        apply_population(&store, RULES, &mut docs, no_hidden).await.unwrap();

        assert_eq!(docs[0].get("genres"), Some(&json!([null])));
        assert_eq!(docs[0].get("movieType"), Some(&json!(null)));
    }

    #[tokio::test]
    async fn populated_documents_lose_hidden_fields() {
        let store = MemoryStore::new();
        let user = store
            .insert(
                "users",
                Document::from_object(json!({ "name": "Vy", "password": "secret-hash" }))
                    .unwrap(),
            )
            .await
            .unwrap();

        let rules = [PopulateRule { field: "user", collection: "users" }];
        let mut docs = vec![obj(json!({ "user": user.id().unwrap().to_string() }))];
        apply_population(&store, &rules, &mut docs, user_password_hidden).await.unwrap();

        let populated = docs[0].get("user").unwrap();
        assert_eq!(populated.get("name"), Some(&json!("Vy")));
        assert!(populated.get("password").is_none());
    }

    #[tokio::test]
    async fn absent_fields_are_left_alone() {
        let store = MemoryStore::new();
        let mut docs = vec![obj(json!({ "title": "No refs yet" }))];
        apply_population(&store, RULES, &mut docs, no_hidden).await.unwrap();
        assert_eq!(docs[0].len(), 1);
    }
}
