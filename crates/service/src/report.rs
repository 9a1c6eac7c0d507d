//! Request and report types for the discovery operations.

use scout_catalog::{CatalogEntry, Cursor};
use scout_protocol::PageMetadata;
use scout_search::{EcosystemInsights, EntryAnalytics, FilterCriteria, OverlapAnalysis, SimilarityResult, SortKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    #[serde(flatten)]
    pub criteria: FilterCriteria,
    /// Result cap applied after filtering and sorting
    pub limit: Option<usize>,
    /// Entries to scan before filtering; defaults to `limit`
    pub scan_limit: Option<usize>,
    /// Unrecognized keys leave the collaborator's order untouched
    #[serde(deserialize_with = "SortKey::deserialize_lenient")]
    pub sort_by: Option<SortKey>,
    pub cursor: Cursor,
    pub version_filter: Option<String>,
}

impl SearchQuery {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = Some(scan_limit);
        self
    }

    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort_by = Some(key);
        self
    }

    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn version_filter(mut self, version: impl Into<String>) -> Self {
        self.version_filter = Some(version.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub entries: Vec<CatalogEntry>,
    pub metadata: PageMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindAlternativesRequest {
    pub name: String,
    /// Free-form motivation, echoed in the report
    pub reason: String,
    pub limit: Option<usize>,
}

impl FindAlternativesRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativesMetadata {
    pub count: usize,
    pub source_server: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    pub scoring_criteria: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativesReport {
    pub schema_version: u32,
    pub alternatives: Vec<SimilarityResult>,
    pub metadata: AlternativesMetadata,
}

/// Either `name` or at least one of `tags`/`tools` must be given; `name` wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindSimilarRequest {
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub tools: Vec<String>,
    pub limit: Option<usize>,
}

impl FindSimilarRequest {
    pub fn to_entry(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_capabilities<T, U>(tags: T, tools: U) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        U: IntoIterator,
        U::Item: Into<String>,
    {
        Self {
            name: None,
            tags: tags.into_iter().map(Into::into).collect(),
            tools: tools.into_iter().map(Into::into).collect(),
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn source_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    pub(crate) fn has_capabilities(&self) -> bool {
        self.tags.iter().chain(&self.tools).any(|v| !v.trim().is_empty())
    }

    /// Human-readable description of what was searched for.
    pub(crate) fn describe(&self) -> String {
        if let Some(name) = self.source_name() {
            return format!("similar to {name}");
        }
        let mut parts = Vec::new();
        if !self.tags.is_empty() {
            parts.push(format!("tags: {}", self.tags.join(", ")));
        }
        if !self.tools.is_empty() {
            parts.push(format!("tools: {}", self.tools.join(", ")));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMetadata {
    pub count: usize,
    pub search_criteria: String,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarReport {
    pub schema_version: u32,
    pub similar: Vec<SimilarityResult>,
    pub metadata: SimilarMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapReport {
    pub schema_version: u32,
    #[serde(flatten)]
    pub analysis: OverlapAnalysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsReport {
    pub schema_version: u32,
    #[serde(flatten)]
    pub insights: EcosystemInsights,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub schema_version: u32,
    #[serde(flatten)]
    pub analytics: EntryAnalytics,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn similar_request_describes_its_criteria() {
        assert_eq!(FindSimilarRequest::to_entry("io.test/pg").describe(), "similar to io.test/pg");
        assert_eq!(
            FindSimilarRequest::by_capabilities(["db", "sql"], ["query"]).describe(),
            "tags: db, sql, tools: query"
        );
        assert_eq!(
            FindSimilarRequest::by_capabilities(Vec::<String>::new(), ["query"]).describe(),
            "tools: query"
        );
    }

    #[test]
    fn blank_name_and_criteria_count_as_missing() {
        let request = FindSimilarRequest {
            name: Some("  ".to_string()),
            tags: vec![" ".to_string()],
            ..FindSimilarRequest::default()
        };
        assert_eq!(request.source_name(), None);
        assert!(!request.has_capabilities());
    }

    #[test]
    fn search_query_reads_flat_json() {
        let query: SearchQuery = serde_json::from_value(serde_json::json!({
            "query": "postgres",
            "min_stars": 10,
            "limit": 5,
            "sort_by": "stars"
        }))
        .unwrap();
        assert_eq!(query.criteria.query, "postgres");
        assert_eq!(query.criteria.min_stars, 10);
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.sort_by, Some(SortKey::Stars));
        assert!(query.cursor.is_empty());
    }

    #[test]
    fn unknown_sort_key_does_not_reject_query() {
        let query: SearchQuery = serde_json::from_value(serde_json::json!({
            "query": "postgres",
            "sort_by": "relevance"
        }))
        .unwrap();
        assert_eq!(query.criteria.query, "postgres");
        assert_eq!(query.sort_by, None);

        let query: SearchQuery =
            serde_json::from_value(serde_json::json!({ "sort_by": "last_updated" })).unwrap();
        assert_eq!(query.sort_by, Some(SortKey::UpdatedAt));
    }
}
