//! Declarative per-index settings.
//!
//! Mirrors the settings file an application keeps per index; the keys
//! accept both snake_case and the engine's camelCase spelling for the
//! primary key.
//!
//! ```
//! use meili_connector::IndexSettings;
//!
//! let settings: IndexSettings = serde_json::from_str(r#"{
//!     "primaryKey": "sku",
//!     "filters": ["brand", "color"],
//!     "sortable": ["price"]
//! }"#).unwrap();
//!
//! assert_eq!(settings.primary_key, "sku");
//! assert_eq!(settings.max_total_hits, 10_000);
//! ```

use serde::{Deserialize, Serialize};

/// Ranking rules the engine applies when none are configured.
pub const DEFAULT_RANKING_RULES: [&str; 6] =
    ["words", "typo", "proximity", "attribute", "sort", "exactness"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "default_primary_key", alias = "primaryKey")]
    pub primary_key: String,

    /// Searchable attributes
    #[serde(default)]
    pub search: Vec<String>,

    /// Filterable attributes
    #[serde(default)]
    pub filters: Vec<String>,

    /// Sortable attributes
    #[serde(default)]
    pub sortable: Vec<String>,

    /// Ranking rules, most important first; custom rules like `created_at:desc` allowed
    #[serde(default = "default_ranking")]
    pub ranking: Vec<String>,

    /// Upper bound on reachable hits, pagination included
    #[serde(default = "default_max_total_hits")]
    pub max_total_hits: u64,

    /// Distinct values returned per facet
    #[serde(default = "default_max_values_per_facet")]
    pub max_values_per_facet: u64,
}

fn default_primary_key() -> String { "id".to_string() }
fn default_ranking() -> Vec<String> { DEFAULT_RANKING_RULES.iter().map(|r| r.to_string()).collect() }
fn default_max_total_hits() -> u64 { 10_000 }
fn default_max_values_per_facet() -> u64 { 1_000 }

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            primary_key: default_primary_key(),
            search: Vec::new(),
            filters: Vec::new(),
            sortable: Vec::new(),
            ranking: default_ranking(),
            max_total_hits: default_max_total_hits(),
            max_values_per_facet: default_max_values_per_facet(),
        }
    }
}

impl IndexSettings {
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    pub fn with_search<S: Into<String>>(mut self, attributes: impl IntoIterator<Item = S>) -> Self {
        self.search = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_filters<S: Into<String>>(mut self, attributes: impl IntoIterator<Item = S>) -> Self {
        self.filters = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sortable<S: Into<String>>(mut self, attributes: impl IntoIterator<Item = S>) -> Self {
        self.sortable = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ranking<S: Into<String>>(mut self, rules: impl IntoIterator<Item = S>) -> Self {
        self.ranking = rules.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = IndexSettings::default();
        assert_eq!(settings.primary_key, "id");
        assert_eq!(settings.ranking, DEFAULT_RANKING_RULES.to_vec());
        assert_eq!(settings.max_total_hits, 10_000);
        assert_eq!(settings.max_values_per_facet, 1_000);
        assert!(settings.filters.is_empty());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let settings: IndexSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, IndexSettings::default());
    }

    #[test]
    fn test_builder_helpers() {
        let settings = IndexSettings::default()
            .with_primary_key("sku")
            .with_filters(["brand"])
            .with_ranking(["sort", "words"]);
        assert_eq!(settings.primary_key, "sku");
        assert_eq!(settings.filters, vec!["brand"]);
        assert_eq!(settings.ranking, vec!["sort", "words"]);
    }
}
