//! Per-request discovery pipeline.
//!
//! Every operation validates its input before touching the catalog, then
//! fetches with the accumulator and hands the candidate set to one of the
//! pure stages in `scout-search`. Nothing is cached between requests.

use log::{error, info};
use serde::Serialize;
use tokio::time::Instant;

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::report::{
    AlternativesMetadata, AlternativesReport, AnalyticsReport, FindAlternativesRequest, FindSimilarRequest,
    InsightsReport, OverlapReport, SearchPage, SearchQuery, SimilarMetadata, SimilarReport,
};
use scout_catalog::{fetch_up_to, CatalogEntry, CatalogSource, FetchBudget, FetchOutcome, PageRequest};
use scout_protocol::{serialize_json, REPORT_SCHEMA_VERSION};
use scout_search::{
    aggregate, analyze_entry, analyze_overlap, filter_entries, render_comparison, render_setup_guide,
    sort_entries, validate_compare_count, validate_overlap_count, Platform, SimilarityEngine,
};

pub struct Discovery<C> {
    source: C,
    config: DiscoveryConfig,
    engine: SimilarityEngine,
}

impl<C: CatalogSource> Discovery<C> {
    pub fn new(source: C) -> Self {
        Self::with_config(source, DiscoveryConfig::default())
    }

    pub fn with_config(source: C, config: DiscoveryConfig) -> Self {
        let engine = SimilarityEngine::new(config.profile.clone());
        Self {
            source,
            config,
            engine,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    async fn fetch(&self, request: &PageRequest, target: usize) -> Result<FetchOutcome> {
        let budget = FetchBudget::new(target, self.config.fetch_deadline).ceiling(self.config.target_ceiling);
        fetch_up_to(&self.source, request, budget).await.map_err(|err| {
            error!("Catalog fetch failed: {err}");
            DiscoveryError::from(err)
        })
    }

    async fn candidates(&self) -> Result<FetchOutcome> {
        self.fetch(&PageRequest::default(), self.config.candidate_pool).await
    }

    async fn lookup(&self, name: &str) -> Result<CatalogEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DiscoveryError::InvalidCriteria(
                "provide a server name".to_string(),
            ));
        }
        match self.source.get_entry(name).await {
            Ok(Some(entry)) => Ok(entry),
            Ok(None) => Err(DiscoveryError::EntryNotFound(name.to_string())),
            Err(err) => {
                error!("Lookup of {name} failed: {err}");
                Err(err.into())
            }
        }
    }

    async fn lookup_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<CatalogEntry>> {
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            entries.push(self.lookup(name.as_ref()).await?);
        }
        Ok(entries)
    }

    /// Fetch, filter, sort, cap.
    ///
    /// `scan_limit` bounds how many entries are pulled from the catalog;
    /// `limit` bounds how many survive into the page. The returned cursor
    /// resumes the scan, not the filtered view.
    pub async fn search(&self, query: SearchQuery) -> Result<SearchPage> {
        let started = Instant::now();
        let limit = self.config.search.resolve(query.limit).min(self.config.target_ceiling);
        let scan_limit = query.scan_limit.filter(|n| *n > 0).unwrap_or(limit);

        let name_hint = query.criteria.name.trim();
        let request = PageRequest {
            cursor: query.cursor.clone(),
            version_filter: query.version_filter.clone().filter(|v| !v.trim().is_empty()),
            search_hint: (!name_hint.is_empty()).then(|| name_hint.to_string()),
        };
        let mut outcome = self.fetch(&request, scan_limit).await?;

        let scanned = std::mem::take(&mut outcome.entries);
        let scanned_count = scanned.len();
        let mut entries = filter_entries(scanned, &query.criteria);
        sort_entries(&mut entries, query.sort_by);
        entries.truncate(limit);

        info!(
            "search: {} of {scanned_count} scanned entries in {:?}",
            entries.len(),
            started.elapsed()
        );
        let metadata = outcome.metadata(entries.len());
        Ok(SearchPage { entries, metadata })
    }

    pub async fn details(&self, name: &str) -> Result<CatalogEntry> {
        self.lookup(name).await
    }

    pub async fn find_alternatives(&self, request: FindAlternativesRequest) -> Result<AlternativesReport> {
        let started = Instant::now();
        let limit = self.config.alternatives.resolve(request.limit);
        let source = self.lookup(&request.name).await?;
        let outcome = self.candidates().await?;

        let mut alternatives = self.engine.rank_alternatives(&source, &outcome.entries);
        alternatives.truncate(limit);

        info!(
            "find_alternatives: {} alternatives for {} in {:?}",
            alternatives.len(),
            source.name,
            started.elapsed()
        );
        Ok(AlternativesReport {
            schema_version: REPORT_SCHEMA_VERSION,
            metadata: AlternativesMetadata {
                count: alternatives.len(),
                source_server: source.name,
                reason: request.reason,
                scoring_criteria: self.engine.profile().weights().describe(),
                truncated: outcome.truncated,
            },
            alternatives,
        })
    }

    pub async fn find_similar(&self, request: FindSimilarRequest) -> Result<SimilarReport> {
        let started = Instant::now();
        if request.source_name().is_none() && !request.has_capabilities() {
            return Err(DiscoveryError::InvalidCriteria(
                "provide a server name, tags or tools".to_string(),
            ));
        }
        let limit = self.config.similar.resolve(request.limit);

        let (mut similar, truncated) = match request.source_name() {
            Some(name) => {
                let source = self.lookup(name).await?;
                let outcome = self.candidates().await?;
                (self.engine.rank_similar(&source, &outcome.entries), outcome.truncated)
            }
            None => {
                let outcome = self.candidates().await?;
                let ranked = self
                    .engine
                    .rank_by_criteria(&request.tags, &request.tools, &outcome.entries)?;
                (ranked, outcome.truncated)
            }
        };
        similar.truncate(limit);

        let search_criteria = request.describe();
        info!(
            "find_similar: {} results for \"{search_criteria}\" in {:?}",
            similar.len(),
            started.elapsed()
        );
        Ok(SimilarReport {
            schema_version: REPORT_SCHEMA_VERSION,
            metadata: SimilarMetadata {
                count: similar.len(),
                search_criteria,
                truncated,
            },
            similar,
        })
    }

    pub async fn analyze_overlap<S: AsRef<str>>(&self, names: &[S], show_unique: bool) -> Result<OverlapReport> {
        validate_overlap_count(names.len())?;
        let entries = self.lookup_all(names).await?;
        let analysis = analyze_overlap(&entries, show_unique, self.engine.profile().overlap())?;
        info!(
            "analyze_overlap: {} servers, {} pairs",
            entries.len(),
            analysis.overlap_matrix.len()
        );
        Ok(OverlapReport {
            schema_version: REPORT_SCHEMA_VERSION,
            analysis,
        })
    }

    /// Markdown comparison table.
    pub async fn compare<S: AsRef<str>>(&self, names: &[S]) -> Result<String> {
        validate_compare_count(names.len())?;
        let entries = self.lookup_all(names).await?;
        info!("compare: {} servers", entries.len());
        Ok(render_comparison(&entries)?)
    }

    pub async fn insights(&self, category: &str) -> Result<InsightsReport> {
        let started = Instant::now();
        let outcome = self.candidates().await?;
        let insights = aggregate(&outcome.entries, category, &self.config.insight_limits);
        info!(
            "insights: {} of {} servers in category {} in {:?}",
            insights.overview.total_servers,
            outcome.entries.len(),
            insights.category,
            started.elapsed()
        );
        Ok(InsightsReport {
            schema_version: REPORT_SCHEMA_VERSION,
            insights,
            truncated: outcome.truncated,
        })
    }

    pub async fn analytics(&self, name: &str, period: &str) -> Result<AnalyticsReport> {
        let entry = self.lookup(name).await?;
        info!("analytics: {}", entry.name);
        Ok(AnalyticsReport {
            schema_version: REPORT_SCHEMA_VERSION,
            analytics: analyze_entry(&entry, period),
        })
    }

    /// Markdown install guide; `platform` defaults to Claude Desktop when empty.
    pub async fn setup_guide(&self, name: &str, platform: &str, runtime: Option<&str>) -> Result<String> {
        let entry = self.lookup(name).await?;
        info!("setup_guide: {} for {platform:?}", entry.name);
        Ok(render_setup_guide(&entry, &Platform::parse(platform), runtime))
    }
}

/// Pretty JSON for any report.
pub fn render_json<T: Serialize>(report: &T) -> Result<String> {
    Ok(serialize_json(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scout_catalog::{Package, SnapshotCatalog};
    use scout_search::{FilterCriteria, SortKey};

    fn catalog() -> SnapshotCatalog {
        let entries = (0..12)
            .map(|i| {
                CatalogEntry::new(format!("io.test/server-{i:02}"), "1.0.0", "")
                    .with_tags(if i % 2 == 0 { vec!["database"] } else { vec!["files"] })
                    .with_package(Package::new("npm", format!("server-{i}"), "stdio"))
                    .with_stars(i * 10)
            })
            .collect();
        SnapshotCatalog::with_page_size(entries, 5)
    }

    #[tokio::test]
    async fn limit_applies_after_filter_and_sort() {
        let discovery = Discovery::new(catalog());
        let query = SearchQuery::new(FilterCriteria::default().tags(["database"]))
            .scan_limit(12)
            .limit(2)
            .sort_by(SortKey::Stars);
        let page = discovery.search(query).await.unwrap();
        let names: Vec<&str> = page.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["io.test/server-10", "io.test/server-08"]);
        assert_eq!(page.metadata.count, 2);
        assert_eq!(page.metadata.pages_read, 3);
        assert!(!page.metadata.truncated);
        assert_eq!(page.metadata.next_cursor, None);
    }

    #[tokio::test]
    async fn scan_defaults_to_limit() {
        let discovery = Discovery::new(catalog());
        let page = discovery.search(SearchQuery::default().limit(5)).await.unwrap();
        assert_eq!(page.entries.len(), 5);
        assert_eq!(page.metadata.pages_read, 1);
        assert!(page.metadata.next_cursor.is_some());
    }

    #[tokio::test]
    async fn blank_lookup_name_is_invalid() {
        let discovery = Discovery::new(catalog());
        let err = discovery.details("  ").await.unwrap_err();
        assert_eq!(err.code(), "invalid_criteria");
    }

    #[test]
    fn render_json_is_pretty() {
        let raw = render_json(&serde_json::json!({ "a": 1 })).unwrap();
        assert_eq!(raw, "{\n  \"a\": 1\n}");
    }
}
