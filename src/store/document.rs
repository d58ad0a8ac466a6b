use serde_json::{Map, Value};
use uuid::Uuid;

use super::StoreError;

/// A dynamic document: a flat JSON object addressed by its `id` field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Build a document from a JSON value, which must be an object
    pub fn from_object(value: Value) -> Result<Self, StoreError> {
        match value {
            Value::Object(map) => Ok(Self { fields: map }),
            _ => Err(StoreError::NotAnObject),
        }
    }

    /// Document id, when present and well-formed
    pub fn id(&self) -> Option<Uuid> {
        self.get("id").and_then(|v| v.as_str()).and_then(|s| Uuid::parse_str(s).ok())
    }

    pub fn set_id(&mut self, id: Uuid) -> &mut Self {
        self.set("id", Value::String(id.to_string()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_str())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|v| v.as_f64())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Merge another object's fields over this one
    pub fn merge(&mut self, changes: Map<String, Value>) -> &mut Self {
        for (key, value) in changes {
            self.fields.insert(key, value);
        }
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Document(id: {:?}, fields: {})", self.id(), self.fields.len())
    }
}
