//! Discovery logic over an accumulated candidate set.
//!
//! Everything here is synchronous and pure: filtering, sorting, similarity
//! ranking with explanations, tool-overlap analysis, ecosystem aggregation
//! and the markdown renderers. Fetching lives in `scout-catalog`.

mod analytics;
mod compare;
mod error;
mod explain;
mod filter;
mod insights;
mod overlap;
mod profile;
mod runtime;
mod setup;
mod similarity;
mod sort;

pub use analytics::{analyze_entry, popularity_rank, CurrentSnapshot, EntryAnalytics, DEFAULT_PERIOD};
pub use compare::{render_comparison, validate_compare_count, MAX_COMPARE_ENTRIES, MIN_COMPARE_ENTRIES};
pub use error::{Result, SearchError};
pub use explain::{criteria_reasons, differences, match_reasons};
pub use filter::{filter_entries, FilterCriteria, FilterPipeline, Predicate, PredicateCost};
pub use insights::{aggregate, matches_category, EcosystemInsights, FrequencyTable, InsightLimits, ALL_CATEGORIES};
pub use overlap::{
    analyze_overlap, validate_overlap_count, OverlapAnalysis, MAX_OVERLAP_ENTRIES, MIN_OVERLAP_ENTRIES,
};
pub use profile::{MigrationThresholds, OverlapThresholds, ScoringProfile, ScoringWeights};
pub use runtime::{detect_runtime, package_runtime, UNKNOWN_RUNTIME};
pub use setup::{env_file_example, environment_variables, render_setup_guide, Platform};
pub use similarity::{
    jaccard, overlap_coefficient, shared_items, transport_compatibility, MigrationComplexity,
    ScoreBreakdown, SimilarityEngine, SimilarityResult,
};
pub use sort::{sort_entries, SortKey};
