use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::ApiError;

/// Field constraint kinds understood by the declarative body validator
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text { min_len: Option<usize>, max_len: Option<usize> },
    Number { min: Option<f64>, max: Option<f64> },
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    IsoDate { min_now: bool },
    Uri,
    Email,
    Id,
    IdList { min_items: usize },
    TextList { min_items: usize },
    Choice(&'static [&'static str]),
}

pub fn text() -> FieldKind {
    FieldKind::Text { min_len: None, max_len: None }
}

pub fn number() -> FieldKind {
    FieldKind::Number { min: None, max: None }
}

pub fn integer() -> FieldKind {
    FieldKind::Integer { min: None, max: None }
}

pub fn boolean() -> FieldKind {
    FieldKind::Boolean
}

pub fn iso_date() -> FieldKind {
    FieldKind::IsoDate { min_now: false }
}

pub fn uri() -> FieldKind {
    FieldKind::Uri
}

pub fn email() -> FieldKind {
    FieldKind::Email
}

pub fn id() -> FieldKind {
    FieldKind::Id
}

pub fn id_list() -> FieldKind {
    FieldKind::IdList { min_items: 1 }
}

pub fn text_list() -> FieldKind {
    FieldKind::TextList { min_items: 1 }
}

pub fn choice(options: &'static [&'static str]) -> FieldKind {
    FieldKind::Choice(options)
}

impl FieldKind {
    /// Lower bound: string length for text kinds, value for numeric kinds
    pub fn min(self, bound: i64) -> Self {
        match self {
            FieldKind::Text { max_len, .. } => {
                FieldKind::Text { min_len: Some(bound as usize), max_len }
            }
            FieldKind::Number { max, .. } => FieldKind::Number { min: Some(bound as f64), max },
            FieldKind::Integer { max, .. } => FieldKind::Integer { min: Some(bound), max },
            other => other,
        }
    }

    /// Upper bound: string length for text kinds, value for numeric kinds
    pub fn max(self, bound: i64) -> Self {
        match self {
            FieldKind::Text { min_len, .. } => {
                FieldKind::Text { min_len, max_len: Some(bound as usize) }
            }
            FieldKind::Number { min, .. } => FieldKind::Number { min, max: Some(bound as f64) },
            FieldKind::Integer { min, .. } => FieldKind::Integer { min, max: Some(bound) },
            other => other,
        }
    }

    /// Reject date values earlier than the time of validation
    pub fn min_now(self) -> Self {
        match self {
            FieldKind::IsoDate { .. } => FieldKind::IsoDate { min_now: true },
            other => other,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// Declarative request body schema: an ordered field list validated in a
/// single pass, reporting the first violation as one humanized message.
/// Unknown body fields are rejected.
#[derive(Debug, Clone, Default)]
pub struct BodySchema {
    fields: Vec<FieldRule>,
}

impl BodySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldRule { name, kind, required: false });
        self
    }

    /// Mark the named fields as required (create-variant adjustment)
    pub fn require(mut self, names: &[&str]) -> Self {
        for rule in &mut self.fields {
            if names.contains(&rule.name) {
                rule.required = true;
            }
        }
        self
    }

    /// Drop a field so its presence in the body becomes a violation
    pub fn without(mut self, name: &str) -> Self {
        self.fields.retain(|rule| rule.name != name);
        self
    }

    pub fn validate(&self, body: &Map<String, Value>) -> Result<(), ApiError> {
        for rule in &self.fields {
            match body.get(rule.name) {
                None => {
                    if rule.required {
                        return Err(ApiError::validation(format!("\"{}\" is required", rule.name)));
                    }
                }
                Some(value) => {
                    check_kind(rule.name, &rule.kind, value).map_err(ApiError::validation)?;
                }
            }
        }

        for key in body.keys() {
            if !self.fields.iter().any(|rule| rule.name == key) {
                return Err(ApiError::validation(format!("\"{}\" is not allowed", key)));
            }
        }

        Ok(())
    }
}

fn check_kind(name: &str, kind: &FieldKind, value: &Value) -> Result<(), String> {
    match kind {
        FieldKind::Text { min_len, max_len } => {
            let s = value.as_str().ok_or_else(|| format!("\"{}\" must be a string", name))?;
            if s.is_empty() {
                return Err(format!("\"{}\" is not allowed to be empty", name));
            }
            if let Some(min) = min_len {
                if s.chars().count() < *min {
                    return Err(format!(
                        "\"{}\" length must be at least {} characters long",
                        name, min
                    ));
                }
            }
            if let Some(max) = max_len {
                if s.chars().count() > *max {
                    return Err(format!(
                        "\"{}\" length must be less than or equal to {} characters long",
                        name, max
                    ));
                }
            }
            Ok(())
        }
        FieldKind::Number { min, max } => {
            let n = value.as_f64().ok_or_else(|| format!("\"{}\" must be a number", name))?;
            check_numeric_bounds(name, n, min.as_ref().copied(), max.as_ref().copied())
        }
        FieldKind::Integer { min, max } => {
            let n = value.as_f64().ok_or_else(|| format!("\"{}\" must be a number", name))?;
            if value.as_i64().is_none() && (!n.is_finite() || n.fract() != 0.0) {
                return Err(format!("\"{}\" must be an integer", name));
            }
            check_numeric_bounds(
                name,
                n,
                min.map(|m| m as f64),
                max.map(|m| m as f64),
            )
        }
        FieldKind::Boolean => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(format!("\"{}\" must be a boolean", name))
            }
        }
        FieldKind::IsoDate { min_now } => {
            let s = value.as_str().ok_or_else(|| {
                format!("\"{}\" must be in ISO 8601 date format", name)
            })?;
            let parsed = parse_iso_date(s)
                .ok_or_else(|| format!("\"{}\" must be in ISO 8601 date format", name))?;
            if *min_now && parsed < Utc::now() {
                return Err(format!("\"{}\" must be greater than or equal to now", name));
            }
            Ok(())
        }
        FieldKind::Uri => {
            let s = value.as_str().ok_or_else(|| format!("\"{}\" must be a valid uri", name))?;
            url::Url::parse(s).map_err(|_| format!("\"{}\" must be a valid uri", name))?;
            Ok(())
        }
        FieldKind::Email => {
            let s = value.as_str().ok_or_else(|| format!("\"{}\" must be a valid email", name))?;
            if is_valid_email(s) {
                Ok(())
            } else {
                Err(format!("\"{}\" must be a valid email", name))
            }
        }
        FieldKind::Id => {
            let s = value.as_str().ok_or_else(|| format!("\"{}\" must be a valid ID", name))?;
            Uuid::parse_str(s).map_err(|_| format!("\"{}\" must be a valid ID", name))?;
            Ok(())
        }
        FieldKind::IdList { min_items } => {
            let items =
                value.as_array().ok_or_else(|| format!("\"{}\" must be an array", name))?;
            if items.len() < *min_items {
                return Err(format!("\"{}\" must contain at least {} items", name, min_items));
            }
            for item in items {
                let valid = item.as_str().map(|s| Uuid::parse_str(s).is_ok()).unwrap_or(false);
                if !valid {
                    return Err(format!("\"{}\" must contain only valid IDs", name));
                }
            }
            Ok(())
        }
        FieldKind::TextList { min_items } => {
            let items =
                value.as_array().ok_or_else(|| format!("\"{}\" must be an array", name))?;
            if items.len() < *min_items {
                return Err(format!("\"{}\" must contain at least {} items", name, min_items));
            }
            for item in items {
                if !item.is_string() && !item.is_number() {
                    return Err(format!("\"{}\" must contain only strings or numbers", name));
                }
            }
            Ok(())
        }
        FieldKind::Choice(options) => {
            let s = value
                .as_str()
                .ok_or_else(|| format!("\"{}\" must be one of [{}]", name, options.join(", ")))?;
            if options.contains(&s) {
                Ok(())
            } else {
                Err(format!("\"{}\" must be one of [{}]", name, options.join(", ")))
            }
        }
    }
}

fn check_numeric_bounds(
    name: &str,
    n: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), String> {
    if let Some(min) = min {
        if n < min {
            return Err(format!("\"{}\" must be greater than or equal to {}", name, min));
        }
    }
    if let Some(max) = max {
        if n > max {
            return Err(format!("\"{}\" must be less than or equal to {}", name, max));
        }
    }
    Ok(())
}

/// Accepts RFC 3339 date-times or plain `YYYY-MM-DD` dates. Two-digit
/// years ("10-10-10") are rejected.
pub fn parse_iso_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if s.len() == 10 {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return date.and_hms_opt(0, 0, 0).map(|ndt| Utc.from_utc_datetime(&ndt));
        }
    }
    None
}

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        _ => false,
    }
}
