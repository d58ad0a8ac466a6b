use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::store::{Document, FindQuery, SortDirection, Store};

pub const DEFAULT_LIMIT: u64 = 20;
pub const DEFAULT_PAGE: u64 = 1;

/// Raw list query string parameters. Everything is optional and parsed
/// leniently: unusable values fall back to defaults instead of failing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub select: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<String>,
    pub page: Option<String>,
    pub paging: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    pub select: Option<Vec<String>>,
    pub sort: Vec<(String, SortDirection)>,
    pub limit: u64,
    pub page: u64,
    pub paging: bool,
}

impl ListParams {
    pub fn parse(&self) -> ListOptions {
        let select = self.select.as_deref().map(split_list).filter(|list| !list.is_empty());

        let sort = self
            .sort
            .as_deref()
            .map(split_list)
            .unwrap_or_default()
            .into_iter()
            .map(|token| match token.strip_prefix('-') {
                Some(field) => (field.to_string(), SortDirection::Desc),
                None => (token, SortDirection::Asc),
            })
            .collect();

        // Pagination is on unless explicitly switched off
        let paging = match self.paging.as_deref() {
            Some(raw) => !matches!(raw.trim().to_ascii_lowercase().as_str(), "false" | "0"),
            None => true,
        };

        ListOptions {
            select,
            sort,
            limit: parse_positive(self.limit.as_deref(), DEFAULT_LIMIT),
            page: parse_positive(self.page.as_deref(), DEFAULT_PAGE),
            paging,
        }
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|s| s.trim().parse::<u64>().ok()).filter(|n| *n > 0).unwrap_or(default)
}

/// One page of documents plus pagination metadata. The metadata is `None`
/// when pagination was switched off.
#[derive(Debug)]
pub struct Page {
    pub documents: Vec<Document>,
    pub total_count: Option<u64>,
    pub current_page: Option<u64>,
    pub total_pages: Option<u64>,
}

/// Runs the list read path: one count query plus one fetch query when
/// paginating, a single fetch otherwise. A page past the end yields empty
/// documents with the correct metadata.
pub async fn fetch_page(
    store: &dyn Store,
    collection: &str,
    filters: Vec<(String, Value)>,
    options: &ListOptions,
) -> Result<Page, ApiError> {
    let mut query = FindQuery::new().filters(filters);
    for (field, direction) in &options.sort {
        query = query.sort(field.clone(), *direction);
    }

    if !options.paging {
        let documents = store.find(collection, &query).await?;
        return Ok(Page { documents, total_count: None, current_page: None, total_pages: None });
    }

    let total_count = store.count(collection, &query).await?;
    let skip = (options.page - 1).saturating_mul(options.limit);
    let query = query.skip(skip).take(options.limit);
    let documents = store.find(collection, &query).await?;
    let total_pages = (total_count + options.limit - 1) / options.limit;

    Ok(Page {
        documents,
        total_count: Some(total_count),
        current_page: Some(options.page),
        total_pages: Some(total_pages),
    })
}

/// Serialized list payload: `records` always, pagination metadata only when
/// pagination ran.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListData {
    pub records: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
}

impl ListData {
    pub fn new(records: Vec<Value>, page: &Page) -> Self {
        Self {
            records,
            total_count: page.total_count,
            current_page: page.current_page,
            total_pages: page.total_pages,
        }
    }
}

/// Keeps only the selected fields. The id field always survives projection.
pub fn apply_select(doc: &mut Map<String, Value>, select: &[String]) {
    doc.retain(|key, _| key == "id" || select.iter().any(|field| field == key));
}
