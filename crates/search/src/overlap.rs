use std::collections::BTreeSet;

use crate::error::{Result, SearchError};
use crate::profile::OverlapThresholds;
use crate::similarity::{jaccard, shared_items};
use scout_catalog::CatalogEntry;
use scout_protocol::{OverlapPair, OverlapSummary, ServerToolInfo};
use serde::{Deserialize, Serialize};

pub const MIN_OVERLAP_ENTRIES: usize = 2;
pub const MAX_OVERLAP_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapAnalysis {
    pub servers: Vec<ServerToolInfo>,
    /// Every unordered pair, highest overlap first
    pub overlap_matrix: Vec<OverlapPair>,
    pub summary: OverlapSummary,
    pub insights: Vec<String>,
}

pub fn validate_overlap_count(count: usize) -> Result<()> {
    if (MIN_OVERLAP_ENTRIES..=MAX_OVERLAP_ENTRIES).contains(&count) {
        Ok(())
    } else {
        Err(SearchError::InvalidCriteria(format!(
            "provide between {MIN_OVERLAP_ENTRIES} and {MAX_OVERLAP_ENTRIES} servers to analyze"
        )))
    }
}

/// Tool-set overlap for every unordered pair of `entries`.
pub fn analyze_overlap(
    entries: &[CatalogEntry],
    show_unique: bool,
    thresholds: &OverlapThresholds,
) -> Result<OverlapAnalysis> {
    validate_overlap_count(entries.len())?;

    let mut pairs = Vec::new();
    for (i, a) in entries.iter().enumerate() {
        for b in &entries[i + 1..] {
            pairs.push(OverlapPair {
                server_a: a.name.clone(),
                server_b: b.name.clone(),
                overlap_score: jaccard(&a.tools, &b.tools),
                shared_tools: shared_items(&a.tools, &b.tools).len(),
            });
        }
    }
    pairs.sort_by(|x, y| y.overlap_score.total_cmp(&x.overlap_score));

    let servers = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| ServerToolInfo {
            server_name: entry.name.clone(),
            total_tools: entry.tools.len(),
            unique_tools: if show_unique {
                unique_tools(i, entries)
            } else {
                Vec::new()
            },
        })
        .collect();

    let all_tools: BTreeSet<String> = entries
        .iter()
        .flat_map(|entry| entry.tools.iter().map(|tool| tool.to_lowercase()))
        .collect();

    let avg_overlap = if pairs.is_empty() {
        0.0
    } else {
        pairs.iter().map(|p| p.overlap_score).sum::<f64>() / pairs.len() as f64
    };

    let mut insights = vec![overlap_insight(avg_overlap, thresholds).to_string()];
    if let Some(highest) = pairs.first() {
        insights.push(format!(
            "Highest overlap: {} ↔ {} ({:.1}% similar, {} shared tools)",
            highest.server_a,
            highest.server_b,
            highest.overlap_score * 100.0,
            highest.shared_tools
        ));
    }

    Ok(OverlapAnalysis {
        servers,
        overlap_matrix: pairs,
        summary: OverlapSummary {
            total_servers: entries.len(),
            total_unique_tools: all_tools.len(),
            avg_overlap,
        },
        insights,
    })
}

fn overlap_insight(avg_overlap: f64, thresholds: &OverlapThresholds) -> &'static str {
    if avg_overlap > thresholds.competing {
        "High overlap detected - servers are competing for similar use cases"
    } else if avg_overlap < thresholds.complementary {
        "Low overlap detected - servers are complementary and serve different needs"
    } else {
        "Moderate overlap - some shared functionality with unique features"
    }
}

fn unique_tools(index: usize, entries: &[CatalogEntry]) -> Vec<String> {
    let others: BTreeSet<String> = entries
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .flat_map(|(_, entry)| entry.tools.iter().map(|tool| tool.to_lowercase()))
        .collect();

    let mut seen = BTreeSet::new();
    entries[index]
        .tools
        .iter()
        .filter(|tool| {
            let key = tool.to_lowercase();
            !others.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, tools: &[&str]) -> CatalogEntry {
        CatalogEntry::new(name, "1.0.0", "").with_tools(tools.iter().copied())
    }

    #[test]
    fn disjoint_tools_are_complementary() {
        let entries = vec![
            entry("a", &["read"]),
            entry("b", &["write"]),
            entry("c", &["search"]),
        ];
        let analysis = analyze_overlap(&entries, false, &OverlapThresholds::default()).unwrap();

        assert_eq!(analysis.overlap_matrix.len(), 3);
        assert!(analysis.overlap_matrix.iter().all(|p| p.overlap_score == 0.0));
        assert!(analysis.insights[0].contains("servers are complementary"));
        assert_eq!(analysis.summary.total_unique_tools, 3);
        assert_eq!(analysis.summary.avg_overlap, 0.0);
        assert!(analysis.servers.iter().all(|s| s.unique_tools.is_empty()));
    }

    #[test]
    fn pairs_sorted_by_overlap_with_highest_insight() {
        let entries = vec![
            entry("a", &["query", "execute"]),
            entry("b", &["read"]),
            entry("c", &["Query", "execute", "explain"]),
        ];
        let analysis = analyze_overlap(&entries, true, &OverlapThresholds::default()).unwrap();

        let first = &analysis.overlap_matrix[0];
        assert_eq!((first.server_a.as_str(), first.server_b.as_str()), ("a", "c"));
        assert_eq!(first.shared_tools, 2);
        assert_eq!(
            analysis.insights[1],
            "Highest overlap: a ↔ c (66.7% similar, 2 shared tools)"
        );
        // Remaining zero-overlap pairs keep generation order
        assert_eq!(analysis.overlap_matrix[1].server_b, "b");
        assert_eq!(analysis.overlap_matrix[2].server_a, "b");

        assert_eq!(analysis.summary.total_unique_tools, 4);
        assert_eq!(analysis.servers[0].unique_tools, Vec::<String>::new());
        assert_eq!(analysis.servers[1].unique_tools, vec!["read"]);
        assert_eq!(analysis.servers[2].unique_tools, vec!["explain"]);
    }

    #[test]
    fn identical_tool_sets_are_competing() {
        let entries = vec![entry("a", &["x", "y"]), entry("b", &["y", "x"])];
        let analysis = analyze_overlap(&entries, false, &OverlapThresholds::default()).unwrap();
        assert!(analysis.insights[0].starts_with("High overlap"));
    }

    #[test]
    fn rejects_out_of_range_counts() {
        assert!(validate_overlap_count(1).is_err());
        assert!(validate_overlap_count(11).is_err());
        assert!(validate_overlap_count(2).is_ok());
        let err = analyze_overlap(&[entry("a", &[])], false, &OverlapThresholds::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid criteria: provide between 2 and 10 servers to analyze"
        );
    }
}
