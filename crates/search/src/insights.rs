//! Ecosystem aggregation: frequency tables and summary statistics.

use std::collections::{BTreeMap, BTreeSet};

use crate::runtime::{detect_runtime, UNKNOWN_RUNTIME};
use scout_catalog::CatalogEntry;
use scout_protocol::{FrequencyItem, InsightsOverview};
use serde::{Deserialize, Serialize};

pub const ALL_CATEGORIES: &str = "all";

/// Occurrence counts per attribute value, consumed through [`FrequencyTable::top_n`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<String, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: &str) {
        *self.counts.entry(value.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, value: &str) -> usize {
        self.counts.get(value).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Highest counts first; equal counts in name order.
    pub fn top_n(&self, n: usize) -> Vec<FrequencyItem> {
        let mut items: Vec<FrequencyItem> = self
            .counts
            .iter()
            .map(|(name, count)| FrequencyItem {
                name: name.clone(),
                count: *count,
            })
            .collect();
        // BTreeMap iteration is already name-ordered; the stable sort keeps it for ties.
        items.sort_by(|a, b| b.count.cmp(&a.count));
        items.truncate(n);
        items
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightLimits {
    pub tags: usize,
    pub tools: usize,
    pub transports: usize,
    pub runtimes: usize,
}

impl Default for InsightLimits {
    fn default() -> Self {
        Self {
            tags: 10,
            tools: 10,
            transports: 5,
            runtimes: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcosystemInsights {
    pub category: String,
    pub overview: InsightsOverview,
    pub top_tags: Vec<FrequencyItem>,
    pub top_tools: Vec<FrequencyItem>,
    pub transports: Vec<FrequencyItem>,
    pub runtimes: Vec<FrequencyItem>,
    pub insights: Vec<String>,
    pub opportunities: Vec<String>,
}

fn is_unrestricted(category: &str) -> bool {
    let category = category.trim();
    category.is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES)
}

/// Case-insensitive substring match against any tag; an empty or "all" category matches everything.
pub fn matches_category(entry: &CatalogEntry, category: &str) -> bool {
    if is_unrestricted(category) {
        return true;
    }
    let needle = category.trim().to_lowercase();
    entry
        .tags
        .iter()
        .any(|tag| tag.to_lowercase().contains(&needle))
}

/// Values are counted once per entry, so counts read as "number of entries".
fn count_distinct<'a>(table: &mut FrequencyTable, values: impl Iterator<Item = &'a String>) {
    let distinct: BTreeSet<&str> = values
        .map(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .collect();
    for value in distinct {
        table.add(value);
    }
}

pub fn aggregate(entries: &[CatalogEntry], category: &str, limits: &InsightLimits) -> EcosystemInsights {
    let mut tags = FrequencyTable::new();
    let mut tools = FrequencyTable::new();
    let mut transports = FrequencyTable::new();
    let mut runtimes = FrequencyTable::new();
    let mut overview = InsightsOverview::default();

    for entry in entries.iter().filter(|e| matches_category(e, category)) {
        overview.total_servers += 1;
        overview.total_stars = overview.total_stars.saturating_add(entry.stars_or_zero());
        overview.total_pulls = overview.total_pulls.saturating_add(entry.pulls_or_zero());

        count_distinct(&mut tags, entry.tags.iter());
        count_distinct(&mut tools, entry.tools.iter());

        if let Some(transport) = entry.primary_transport().filter(|t| !t.is_empty()) {
            transports.add(transport);
        }
        let runtime = detect_runtime(entry);
        if runtime != UNKNOWN_RUNTIME {
            runtimes.add(runtime);
        }
    }

    if overview.total_servers > 0 {
        let n = overview.total_servers as u64;
        overview.avg_stars = overview.total_stars / n;
        overview.avg_pulls = overview.total_pulls / n;
    }

    let top_tags = tags.top_n(limits.tags);
    let top_tools = tools.top_n(limits.tools);
    let top_transports = transports.top_n(limits.transports);
    let top_runtimes = runtimes.top_n(limits.runtimes);

    let mut insights = Vec::new();
    if let Some(top) = top_transports.first() {
        insights.push(format!("Most popular transport: {} ({} servers)", top.name, top.count));
    }
    if let Some(top) = top_runtimes.first() {
        insights.push(format!("Most common runtime: {} ({} servers)", top.name, top.count));
    }
    if let Some(top) = top_tags.first() {
        insights.push(format!("Most popular category: {} ({} servers)", top.name, top.count));
    }

    EcosystemInsights {
        category: if is_unrestricted(category) {
            ALL_CATEGORIES.to_string()
        } else {
            category.trim().to_string()
        },
        overview,
        top_tags,
        top_tools,
        transports: top_transports,
        runtimes: top_runtimes,
        insights,
        opportunities: vec![
            "Areas with fewer than 5 servers represent opportunities for new implementations"
                .to_string(),
            "Growth trends and emerging categories will be available with historical data"
                .to_string(),
        ],
    }
}
