//! List screen query parameters.

use std::collections::{BTreeMap, HashMap};

/// Parameter carrying the free-text search.
pub const SEARCH_PARAM: &str = "q";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    /// `field -> wanted value`, matched against `list_filter` fields.
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    /// Split raw query parameters into the search term and filters.
    pub fn from_params(params: HashMap<String, String>) -> Self {
        let mut query = Self::default();
        for (key, value) in params {
            if key == SEARCH_PARAM {
                let term = value.trim();
                if !term.is_empty() {
                    query.search = Some(term.to_string());
                }
            } else {
                query.filters.insert(key, value);
            }
        }
        query
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }
}
