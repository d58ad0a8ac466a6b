use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Store-level query: equality filters, ordering and a skip/take window.
///
/// A filter value that is matched against an array field counts as a match
/// when the array contains the value.
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filters: Vec<(String, Value)>,
    pub sort: Vec<SortKey>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl FindQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(SortKey { field: field.into(), direction });
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }
}
