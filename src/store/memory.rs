use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::query::{FindQuery, SortDirection};
use super::{Document, Store, StoreError};

/// In-memory document store. Backs the test suites and lets the server run
/// without a database; documents live in insertion order per collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now_timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Equality filter semantics: an array field matches when it contains the
/// expected value, any other field matches on plain equality.
fn value_matches(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        Some(Value::Array(items)) => items.contains(expected),
        Some(value) => value == expected,
        None => false,
    }
}

fn matches_filters(doc: &Document, filters: &[(String, Value)]) -> bool {
    filters.iter().all(|(field, expected)| value_matches(doc.get(field), expected))
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Cross-type ordering used for sorts: null < bool < number < string.
/// RFC 3339 timestamps compare chronologically as strings.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn sort_documents(docs: &mut [Document], query: &FindQuery) {
    if query.sort.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for key in &query.sort {
            let left = a.get(&key.field).unwrap_or(&Value::Null);
            let right = b.get(&key.field).unwrap_or(&Value::Null);
            let ordering = match key.direction {
                SortDirection::Asc => compare_values(left, right),
                SortDirection::Desc => compare_values(right, left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn apply_window(docs: Vec<Document>, query: &FindQuery) -> Vec<Document> {
    let skip = query.skip.unwrap_or(0) as usize;
    let iter = docs.into_iter().skip(skip);
    match query.take {
        Some(take) => iter.take(take as usize).collect(),
        None => iter.collect(),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, collection: &str, mut doc: Document) -> Result<Document, StoreError> {
        if doc.id().is_none() {
            doc.set_id(Uuid::new_v4());
        }
        if !doc.contains("createdAt") {
            doc.set("createdAt", now_timestamp());
        }

        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().push(doc.clone());
        Ok(doc)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        let docs = match collections.get(collection) {
            Some(docs) => docs,
            None => return Ok(None),
        };
        Ok(docs.iter().find(|doc| doc.id() == Some(id)).cloned())
    }

    async fn find(
        &self,
        collection: &str,
        query: &FindQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let mut docs: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter().filter(|doc| matches_filters(doc, &query.filters)).cloned().collect()
            })
            .unwrap_or_default();

        sort_documents(&mut docs, query);
        Ok(apply_window(docs, query))
    }

    async fn count(&self, collection: &str, query: &FindQuery) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| matches_filters(doc, &query.filters)).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: Uuid,
        changes: Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(None),
        };

        for doc in docs.iter_mut() {
            if doc.id() == Some(id) {
                doc.merge(changes);
                doc.set("updatedAt", now_timestamp());
                return Ok(Some(doc.clone()));
            }
        }
        Ok(None)
    }

    async fn delete_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = match collections.get_mut(collection) {
            Some(docs) => docs,
            None => return Ok(None),
        };

        match docs.iter().position(|doc| doc.id() == Some(id)) {
            Some(index) => Ok(Some(docs.remove(index))),
            None => Ok(None),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_object(value).unwrap()
    }

    #[tokio::test]
    async fn insert_stamps_id_and_created_at() {
        let store = MemoryStore::new();
        let saved = store.insert("genres", doc(json!({"name": "Action"}))).await.unwrap();
        assert!(saved.id().is_some());
        assert!(saved.contains("createdAt"));
    }

    #[tokio::test]
    async fn find_preserves_insertion_order_by_default() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store.insert("genres", doc(json!({"name": name}))).await.unwrap();
        }
        let docs = store.find("genres", &FindQuery::new()).await.unwrap();
        let names: Vec<&str> = docs.iter().map(|d| d.get_str("name").unwrap()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn array_fields_match_by_containment() {
        let store = MemoryStore::new();
        store.insert("movies", doc(json!({"title": "x", "genres": ["g1", "g2"]}))).await.unwrap();
        store.insert("movies", doc(json!({"title": "y", "genres": ["g3"]}))).await.unwrap();

        let query = FindQuery::new().filter("genres", json!("g2"));
        let docs = store.find("movies", &query).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].get_str("title"), Some("x"));
    }

    #[tokio::test]
    async fn sorts_numbers_numerically_and_respects_direction() {
        let store = MemoryStore::new();
        for price in [10.0, 2.0, 30.0] {
            store.insert("movies", doc(json!({"ticketPrice": price}))).await.unwrap();
        }
        let query = FindQuery::new().sort("ticketPrice", SortDirection::Desc);
        let docs = store.find("movies", &query).await.unwrap();
        let prices: Vec<f64> = docs.iter().map(|d| d.get_f64("ticketPrice").unwrap()).collect();
        assert_eq!(prices, vec![30.0, 10.0, 2.0]);
    }

    #[tokio::test]
    async fn skip_and_take_select_a_window() {
        let store = MemoryStore::new();
        for n in 0..5 {
            store.insert("genres", doc(json!({"n": n}))).await.unwrap();
        }
        let query = FindQuery::new().skip(2).take(2);
        let docs = store.find("genres", &query).await.unwrap();
        let ns: Vec<i64> = docs.iter().map(|d| d.get("n").unwrap().as_i64().unwrap()).collect();
        assert_eq!(ns, vec![2, 3]);
    }

    #[tokio::test]
    async fn update_merges_and_stamps_updated_at() {
        let store = MemoryStore::new();
        let saved = store.insert("genres", doc(json!({"name": "Action"}))).await.unwrap();
        let id = saved.id().unwrap();

        let changes = match json!({"name": "Drama"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let updated = store.update_by_id("genres", id, changes).await.unwrap().unwrap();
        assert_eq!(updated.get_str("name"), Some("Drama"));
        assert!(updated.contains("updatedAt"));
    }

    #[tokio::test]
    async fn delete_removes_and_returns_the_document() {
        let store = MemoryStore::new();
        let saved = store.insert("genres", doc(json!({"name": "Action"}))).await.unwrap();
        let id = saved.id().unwrap();

        let deleted = store.delete_by_id("genres", id).await.unwrap();
        assert!(deleted.is_some());
        assert!(store.find_by_id("genres", id).await.unwrap().is_none());
        assert!(store.delete_by_id("genres", id).await.unwrap().is_none());
    }
}
