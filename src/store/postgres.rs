use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;

use super::query::FindQuery;
use super::{Document, Store, StoreError};

/// Postgres-backed document store: one `id UUID + doc JSONB` table per
/// collection. All queries are built dynamically with positional binds.
pub struct PgStore {
    pool: PgPool,
}

/// Bind parameter for dynamically built queries
#[derive(Debug, Clone, PartialEq)]
enum Bind {
    Uuid(Uuid),
    Text(String),
    Json(Value),
    Int(i64),
}

fn bind_param(
    q: sqlx::query::Query<'_, sqlx::Postgres, PgArguments>,
    value: Bind,
) -> sqlx::query::Query<'_, sqlx::Postgres, PgArguments> {
    match value {
        Bind::Uuid(v) => q.bind(v),
        Bind::Text(v) => q.bind(v),
        Bind::Json(v) => q.bind(v),
        Bind::Int(v) => q.bind(v),
    }
}

impl PgStore {
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the backing table and index for each collection
    pub async fn ensure_collections(&self, collections: &[&str]) -> Result<(), StoreError> {
        for collection in collections {
            let table = table_name(collection)?;
            let create = format!(
                "CREATE TABLE IF NOT EXISTS {} (id UUID PRIMARY KEY, doc JSONB NOT NULL)",
                table
            );
            sqlx::query(&create).execute(&self.pool).await?;

            let index = format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} USING GIN (doc)",
                quote_identifier(&format!("{}_doc_idx", collection)),
                table
            );
            sqlx::query(&index).execute(&self.pool).await?;
        }
        info!("Ensured {} document collections", collections.len());
        Ok(())
    }
}

/// Validate collection names to prevent injection: lowercase ascii,
/// digits, underscore and hyphen only.
fn is_valid_collection(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Quote SQL identifier to prevent injection
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn table_name(collection: &str) -> Result<String, StoreError> {
    if !is_valid_collection(collection) {
        return Err(StoreError::InvalidCollection(collection.to_string()));
    }
    Ok(quote_identifier(collection))
}

fn now_timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Build the WHERE clause for equality filters. Containment (`@>`) matches
/// an equal scalar field or an array field holding the value, which mirrors
/// the in-memory filter semantics.
fn push_filters(sql: &mut String, binds: &mut Vec<Bind>, filters: &[(String, Value)]) {
    for (i, (field, value)) in filters.iter().enumerate() {
        if i == 0 {
            sql.push_str(" WHERE ");
        } else {
            sql.push_str(" AND ");
        }
        sql.push_str(&format!("doc->${} @> ${}", binds.len() + 1, binds.len() + 2));
        binds.push(Bind::Text(field.clone()));
        binds.push(Bind::Json(value.clone()));
    }
}

fn build_find_sql(table: &str, query: &FindQuery) -> (String, Vec<Bind>) {
    let mut sql = format!("SELECT doc FROM {}", table);
    let mut binds: Vec<Bind> = Vec::new();

    push_filters(&mut sql, &mut binds, &query.filters);

    for (i, key) in query.sort.iter().enumerate() {
        if i == 0 {
            sql.push_str(" ORDER BY ");
        } else {
            sql.push_str(", ");
        }
        sql.push_str(&format!("doc->${} {}", binds.len() + 1, key.direction.to_sql()));
        binds.push(Bind::Text(key.field.clone()));
    }

    if let Some(take) = query.take {
        sql.push_str(&format!(" LIMIT ${}", binds.len() + 1));
        binds.push(Bind::Int(take as i64));
    }
    if let Some(skip) = query.skip {
        sql.push_str(&format!(" OFFSET ${}", binds.len() + 1));
        binds.push(Bind::Int(skip as i64));
    }

    (sql, binds)
}

fn build_count_sql(table: &str, query: &FindQuery) -> (String, Vec<Bind>) {
    let mut sql = format!("SELECT COUNT(*) AS count FROM {}", table);
    let mut binds: Vec<Bind> = Vec::new();
    push_filters(&mut sql, &mut binds, &query.filters);
    (sql, binds)
}

fn row_document(row: &sqlx::postgres::PgRow) -> Result<Document, StoreError> {
    let doc: Value = row.try_get("doc")?;
    Document::from_object(doc)
}

#[async_trait]
impl Store for PgStore {
    async fn insert(&self, collection: &str, mut doc: Document) -> Result<Document, StoreError> {
        let table = table_name(collection)?;

        let id = match doc.id() {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4();
                doc.set_id(id);
                id
            }
        };
        if !doc.contains("createdAt") {
            doc.set("createdAt", now_timestamp());
        }

        let sql = format!("INSERT INTO {} (id, doc) VALUES ($1, $2) RETURNING doc", table);
        let row = sqlx::query(&sql).bind(id).bind(doc.to_value()).fetch_one(&self.pool).await?;
        row_document(&row)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        let table = table_name(collection)?;
        let sql = format!("SELECT doc FROM {} WHERE id = $1", table);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_document).transpose()
    }

    async fn find(
        &self,
        collection: &str,
        query: &FindQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let table = table_name(collection)?;
        let (sql, binds) = build_find_sql(&table, query);

        let mut q = sqlx::query(&sql);
        for value in binds {
            q = bind_param(q, value);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.iter().map(row_document).collect()
    }

    async fn count(&self, collection: &str, query: &FindQuery) -> Result<u64, StoreError> {
        let table = table_name(collection)?;
        let (sql, binds) = build_count_sql(&table, query);

        let mut q = sqlx::query(&sql);
        for value in binds {
            q = bind_param(q, value);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: Uuid,
        mut changes: Map<String, Value>,
    ) -> Result<Option<Document>, StoreError> {
        let table = table_name(collection)?;
        changes.insert("updatedAt".to_string(), now_timestamp());

        let sql = format!("UPDATE {} SET doc = doc || $2 WHERE id = $1 RETURNING doc", table);
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(Value::Object(changes))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_document).transpose()
    }

    async fn delete_by_id(
        &self,
        collection: &str,
        id: Uuid,
    ) -> Result<Option<Document>, StoreError> {
        let table = table_name(collection)?;
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING doc", table);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_document).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
