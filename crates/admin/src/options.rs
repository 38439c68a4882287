//! Per-model admin options: what the list screen shows, searches and filters.

use std::collections::BTreeMap;

use serde::Serialize;

use storefront_core::slugify;

use crate::error::AdminError;
use crate::field::{AdminRecord, FieldValue, Resolve, parse_bool};
use crate::query::ListQuery;

/// Slug field filled in from other fields while the operator types.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Prepopulated {
    pub field: &'static str,
    pub from: &'static [&'static str],
}

/// Child model edited inside its parent's page.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct InlineAdmin {
    pub model: &'static str,
    /// Field on the child that points at the parent.
    pub fk_field: &'static str,
    pub fields: &'static [&'static str],
    /// Blank rows offered for new children.
    pub extra: usize,
    /// Many-to-many fields edited with a two-pane selector.
    pub filter_horizontal: &'static [&'static str],
}

/// Registration metadata for one model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelAdmin {
    pub model: &'static str,
    /// Path segment under `/admin`.
    pub route: &'static str,
    pub verbose_name_plural: &'static str,
    pub list_display: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub prepopulated_fields: &'static [Prepopulated],
    pub inlines: &'static [InlineAdmin],
    /// `-field` sorts descending.
    pub ordering: &'static [&'static str],
}

/// One cell of a rendered list row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub value: FieldValue,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub id: i64,
    pub cells: BTreeMap<&'static str, Cell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl ModelAdmin {
    /// Search: every whitespace-separated term must appear
    /// (case-insensitively) in at least one search field.
    pub fn matches_search<R: AdminRecord>(&self, record: &R, search: &str) -> bool {
        let haystacks: Vec<String> = self
            .search_fields
            .iter()
            .filter_map(|f| record.field(f))
            .map(|v| v.to_text().to_lowercase())
            .collect();

        search
            .split_whitespace()
            .map(str::to_lowercase)
            .all(|term| haystacks.iter().any(|h| h.contains(&term)))
    }

    /// Exact-match dropdown filters. Only fields listed in `list_filter` are accepted.
    pub fn matches_filters<R: AdminRecord>(
        &self,
        record: &R,
        filters: &BTreeMap<String, String>,
    ) -> Result<bool, AdminError> {
        for (field, wanted) in filters {
            if !self.list_filter.iter().any(|f| *f == field.as_str()) {
                return Err(AdminError::UnknownFilter {
                    model: self.model,
                    field: field.clone(),
                });
            }
            let value = record.field(field).unwrap_or(FieldValue::Null);
            let hit = match &value {
                FieldValue::Bool(b) => parse_bool(wanted) == Some(*b),
                FieldValue::Null => wanted.trim().is_empty() || wanted.eq_ignore_ascii_case("none"),
                other => other.filter_key() == wanted.trim(),
            };
            if !hit {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Filter, search and render `records` for the list screen.
    pub fn list<'a, R, I, S>(
        &self,
        records: I,
        query: &ListQuery,
        resolve: &S,
    ) -> Result<Vec<Row>, AdminError>
    where
        R: AdminRecord + 'a,
        I: IntoIterator<Item = &'a R>,
        S: Resolve,
    {
        let mut rows = Vec::new();
        for record in records {
            if !self.matches_filters(record, &query.filters)? {
                continue;
            }
            if let Some(search) = query.search.as_deref() {
                if !self.matches_search(record, search) {
                    continue;
                }
            }
            rows.push(self.render_row(record, resolve));
        }
        Ok(rows)
    }

    pub fn render_row<R: AdminRecord, S: Resolve>(&self, record: &R, resolve: &S) -> Row {
        let cells = self
            .list_display
            .iter()
            .map(|&column| {
                let value = record.field(column).unwrap_or(FieldValue::Null);
                let display = display_value(column, &value, resolve);
                (column, Cell { value, display })
            })
            .collect();
        Row {
            id: record.pk(),
            cells,
        }
    }

    /// Distinct values per filter, sorted by filter key.
    pub fn filter_choices<'a, R, I, S>(&self, records: I, resolve: &S) -> BTreeMap<&'static str, Vec<Choice>>
    where
        R: AdminRecord + 'a,
        I: IntoIterator<Item = &'a R>,
        S: Resolve,
    {
        let mut seen: BTreeMap<&'static str, BTreeMap<String, String>> = self
            .list_filter
            .iter()
            .map(|&f| (f, BTreeMap::new()))
            .collect();

        for record in records {
            for &field in self.list_filter {
                let value = record.field(field).unwrap_or(FieldValue::Null);
                let label = display_value(field, &value, resolve);
                if let Some(values) = seen.get_mut(field) {
                    values.entry(value.filter_key()).or_insert(label);
                }
            }
        }

        seen.into_iter()
            .map(|(field, values)| {
                let choices = values
                    .into_iter()
                    .map(|(value, label)| Choice { value, label })
                    .collect();
                (field, choices)
            })
            .collect()
    }

    /// Slug suggestion for a prepopulated field, from the given source values.
    pub fn prepopulate(&self, field: &str, source: impl Fn(&str) -> Option<String>) -> Option<String> {
        let spec = self.prepopulated_fields.iter().find(|p| p.field == field)?;
        let joined: Vec<String> = spec.from.iter().filter_map(|f| source(f)).collect();
        Some(slugify(&joined.join(" ")))
    }

    pub fn inline(&self, model: &str) -> Option<&InlineAdmin> {
        self.inlines.iter().find(|i| i.model == model)
    }
}

fn display_value<S: Resolve>(field: &str, value: &FieldValue, resolve: &S) -> String {
    match value {
        FieldValue::Ref(id) => resolve.display(field, *id).unwrap_or_else(|| id.to_string()),
        FieldValue::Null => "-".to_string(),
        other => other.to_text(),
    }
}
