use scout_catalog::CatalogEntry;
use scout_protocol::PopularityRank;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PERIOD: &str = "30d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSnapshot {
    pub stars: u64,
    pub pulls: u64,
    pub tool_count: usize,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAnalytics {
    pub server_name: String,
    pub period: String,
    pub current: CurrentSnapshot,
    pub trends: String,
    pub popularity: PopularityRank,
    pub recommendations: Vec<String>,
}

/// Coarse band derived from the star count alone.
pub fn popularity_rank(stars: u64) -> PopularityRank {
    let (rank, percentile) = match stars {
        s if s > 1000 => ("Top Tier", "Top 5%"),
        s if s > 500 => ("High", "Top 15%"),
        s if s > 100 => ("Medium", "Top 40%"),
        _ => ("Growing", "Emerging"),
    };
    PopularityRank {
        rank: rank.to_string(),
        percentile: percentile.to_string(),
        compared_to: "all registered MCP servers".to_string(),
    }
}

pub fn recommendations(entry: &CatalogEntry) -> Vec<String> {
    let mut out = Vec::new();
    if entry.stars_or_zero() < 50 {
        out.push("Consider promoting your server on GitHub and social media".to_string());
    }
    if entry.tools.len() < 3 {
        out.push("Adding more tools could increase adoption".to_string());
    }
    if entry.tags.len() < 3 {
        out.push("Add more descriptive tags to improve discoverability".to_string());
    }
    if entry.packages.is_empty() {
        out.push("Add package information to make installation easier".to_string());
    }
    out
}

/// Snapshot analytics; `period` is echoed back (empty means [`DEFAULT_PERIOD`]).
pub fn analyze_entry(entry: &CatalogEntry, period: &str) -> EntryAnalytics {
    let period = match period.trim() {
        "" => DEFAULT_PERIOD,
        p => p,
    };
    EntryAnalytics {
        server_name: entry.name.clone(),
        period: period.to_string(),
        current: CurrentSnapshot {
            stars: entry.stars_or_zero(),
            pulls: entry.pulls_or_zero(),
            tool_count: entry.tools.len(),
            tags: entry.tags.clone(),
        },
        trends: "Historical trend data not yet available. Showing current snapshot.".to_string(),
        popularity: popularity_rank(entry.stars_or_zero()),
        recommendations: recommendations(entry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scout_catalog::Package;

    #[test]
    fn rank_bands_are_exclusive_lower_bounds() {
        assert_eq!(popularity_rank(1001).rank, "Top Tier");
        assert_eq!(popularity_rank(1000).rank, "High");
        assert_eq!(popularity_rank(501).percentile, "Top 15%");
        assert_eq!(popularity_rank(101).rank, "Medium");
        assert_eq!(popularity_rank(100).rank, "Growing");
        assert_eq!(popularity_rank(0).percentile, "Emerging");
    }

    #[test]
    fn young_entry_gets_every_recommendation() {
        let analytics = analyze_entry(&CatalogEntry::new("io.test/new", "0.1.0", ""), "");
        assert_eq!(analytics.period, "30d");
        assert_eq!(analytics.recommendations.len(), 4);
        assert_eq!(analytics.popularity.compared_to, "all registered MCP servers");
    }

    #[test]
    fn established_entry_needs_no_advice() {
        let entry = CatalogEntry::new("io.test/big", "3.0.0", "")
            .with_tags(["a", "b", "c"])
            .with_tools(["x", "y", "z"])
            .with_package(Package::new("npm", "big", "stdio"))
            .with_stars(800)
            .with_pulls(12);
        let analytics = analyze_entry(&entry, "7d");
        assert_eq!(analytics.period, "7d");
        assert!(analytics.recommendations.is_empty());
        assert_eq!(
            analytics.current,
            CurrentSnapshot {
                stars: 800,
                pulls: 12,
                tool_count: 3,
                tags: vec!["a".into(), "b".into(), "c".into()],
            }
        );
        assert_eq!(analytics.popularity.rank, "High");
    }
}
