use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Why a fetch stopped before the catalog was exhausted.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Truncation {
    Deadline,
    PageFailure,
}

/// Pagination metadata attached to every listing result.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct PageMetadata {
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<Truncation>,
    pub pages_read: usize,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct FrequencyItem {
    pub name: String,
    pub count: usize,
}

/// One cell of the pairwise overlap matrix.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct OverlapPair {
    pub server_a: String,
    pub server_b: String,
    pub overlap_score: f64,
    pub shared_tools: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ServerToolInfo {
    pub server_name: String,
    pub total_tools: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_tools: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct OverlapSummary {
    pub total_servers: usize,
    pub total_unique_tools: usize,
    pub avg_overlap: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct InsightsOverview {
    pub total_servers: usize,
    pub total_stars: u64,
    pub total_pulls: u64,
    pub avg_stars: u64,
    pub avg_pulls: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct PopularityRank {
    pub rank: String,
    pub percentile: String,
    pub compared_to: String,
}

/// Short, user-facing failure description. Never carries an internal error chain.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub hint: Option<String>,
}

/// Pretty JSON rendering shared by every report.
pub fn serialize_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_metadata_omits_absent_cursor() {
        let meta = PageMetadata {
            count: 2,
            next_cursor: None,
            truncated: false,
            truncation: None,
            pages_read: 1,
            elapsed_ms: 3,
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "count": 2,
                "truncated": false,
                "pages_read": 1,
                "elapsed_ms": 3
            })
        );
    }

    #[test]
    fn truncation_reason_is_snake_case() {
        let raw = serialize_json(&Truncation::PageFailure).unwrap();
        assert_eq!(raw, "\"page_failure\"");
    }
}
