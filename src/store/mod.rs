pub mod document;
pub mod memory;
pub mod postgres;
pub mod query;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use document::Document;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use query::{FindQuery, SortDirection, SortKey};

/// Errors from the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Expected a JSON object")]
    NotAnObject,

    #[error("Query error: {0}")]
    Query(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Narrow CRUD+query interface over the document database.
///
/// Inserts stamp `id` and `createdAt`; updates merge fields and stamp
/// `updatedAt`. Document order without an explicit sort is insertion order.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError>;

    async fn find_by_id(&self, collection: &str, id: Uuid)
        -> Result<Option<Document>, StoreError>;

    async fn find(&self, collection: &str, query: &FindQuery)
        -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: &str, query: &FindQuery) -> Result<u64, StoreError>;

    async fn update_by_id(
        &self,
        collection: &str,
        id: Uuid,
        changes: Map<String, Value>,
    ) -> Result<Option<Document>, StoreError>;

    async fn delete_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError>;

    /// Connectivity probe for the health endpoint
    async fn ping(&self) -> Result<(), StoreError>;
}
