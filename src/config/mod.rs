pub mod settings;

use crate::core::{CoreError, FilterCriterion, FilterKind, NameQuery};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Every parameter of a search, as entered by the user.
///
/// Field names on disk follow the legacy saved-query format so existing
/// `search_queries.json` files load unchanged. Missing fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub dir_path: PathBuf,
    #[serde(rename = "search_input")]
    pub name_pattern: String,
    /// Comma-separated suffixes, e.g. `.txt, .md`.
    #[serde(rename = "extension_input")]
    pub extensions: String,
    #[serde(rename = "file_regex_checkbox")]
    pub name_regex: bool,
    #[serde(rename = "content_search_input")]
    pub content_query: String,
    #[serde(rename = "regex_checkbox")]
    pub content_regex: bool,
    #[serde(rename = "filter_combo")]
    pub filter_kind: FilterKind,
    #[serde(rename = "filter_value_input")]
    pub filter_value: String,
}

impl SearchQuery {
    /// The extension list, trimmed, with empty entries dropped.
    pub fn extension_set(&self) -> Vec<String> {
        self.extensions
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn name_query(&self) -> NameQuery {
        NameQuery {
            pattern: self.name_pattern.clone(),
            extensions: self.extension_set(),
            use_regex: self.name_regex,
        }
    }

    /// Validates the filter fields.
    pub fn filter_criterion(&self) -> Result<FilterCriterion, CoreError> {
        FilterCriterion::parse(self.filter_kind, &self.filter_value)
    }
}

/// Named queries, kept sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedQueries {
    #[serde(default)]
    pub saved_queries: BTreeMap<String, SearchQuery>,
}

impl SavedQueries {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.saved_queries.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&SearchQuery> {
        self.saved_queries.get(name)
    }

    /// Stores `query` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, query: SearchQuery) {
        self.saved_queries.insert(name.into(), query);
    }

    pub fn remove(&mut self, name: &str) -> Option<SearchQuery> {
        self.saved_queries.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.saved_queries.is_empty()
    }
}
