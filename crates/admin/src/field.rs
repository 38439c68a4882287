//! Named field access for admin rendering, search and filtering.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use storefront_core::Entity;

/// A single field value as the admin sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Foreign key to another record, rendered through a [`Resolve`]r.
    Ref(i64),
}

impl FieldValue {
    /// Key used to match `?field=value` filter parameters.
    pub fn filter_key(&self) -> String {
        match self {
            FieldValue::Null => "none".to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(i) | FieldValue::Ref(i) => i.to_string(),
            FieldValue::Decimal(d) => d.to_string(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Timestamp(t) => t.to_rfc3339(),
        }
    }

    /// Plain text rendering without foreign-key resolution.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            other => other.filter_key(),
        }
    }

    pub fn as_ref_id(&self) -> Option<i64> {
        match self {
            FieldValue::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

/// Record whose fields the admin can address by name.
pub trait AdminRecord: Entity {
    /// Primary key as a raw integer.
    fn pk(&self) -> i64;

    /// Value of `name`, or `None` when the record has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Display strings for related records (e.g. a category's path for `parent`).
pub trait Resolve {
    fn display(&self, field: &str, id: i64) -> Option<String>;
}

impl<F> Resolve for F
where
    F: Fn(&str, i64) -> Option<String>,
{
    fn display(&self, field: &str, id: i64) -> Option<String> {
        self(field, id)
    }
}

/// Parse a filter parameter for a boolean field.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
