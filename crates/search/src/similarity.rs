//! Lexical similarity between catalog entries.
//!
//! Set measures (tags, tools) use the Jaccard index over case-insensitive
//! members. Descriptions use an overlap coefficient over longer tokens. The
//! composite blends both with the weights of a [`ScoringProfile`].

use std::collections::BTreeSet;

use crate::error::{Result, SearchError};
use crate::explain;
use crate::profile::ScoringProfile;
use scout_catalog::CatalogEntry;
use serde::{Deserialize, Serialize};

/// Tokens of this many characters or fewer are ignored.
const MIN_TOKEN_CHARS: usize = 3;

const NEUTRAL_TRANSPORT_SCORE: f64 = 0.5;

fn lowercase_set<S: AsRef<str>>(items: &[S]) -> BTreeSet<String> {
    items
        .iter()
        .map(|item| item.as_ref().trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// |A ∩ B| / |A ∪ B| over case-insensitive members; 0 when either side is empty.
pub fn jaccard<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> f64 {
    let a = lowercase_set(a);
    let b = lowercase_set(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    intersection as f64 / union as f64
}

/// Items of `a` also present in `b` (case-insensitive), in `a`'s order and casing, deduplicated.
pub fn shared_items<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> Vec<String> {
    let b = lowercase_set(b);
    let mut seen = BTreeSet::new();
    a.iter()
        .map(AsRef::as_ref)
        .filter(|item| {
            let key = item.trim().to_lowercase();
            b.contains(&key) && seen.insert(key)
        })
        .map(str::to_string)
        .collect()
}

fn description_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .collect()
}

/// Matched tokens / tokens of the shorter description.
///
/// Each token of the shorter side consumes at most one token of the other.
pub fn overlap_coefficient(a: &str, b: &str) -> f64 {
    let a = description_tokens(a);
    let b = description_tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    let mut used = vec![false; large.len()];
    let mut matches = 0usize;
    for token in &small {
        if let Some(idx) = (0..large.len()).find(|&i| !used[i] && large[i] == *token) {
            used[idx] = true;
            matches += 1;
        }
    }
    matches as f64 / small.len() as f64
}

/// 1.0 on equal primary transports, 0.0 otherwise, 0.5 when either entry has no package.
pub fn transport_compatibility(a: &CatalogEntry, b: &CatalogEntry) -> f64 {
    match (a.primary_transport(), b.primary_transport()) {
        (Some(ta), Some(tb)) if ta.eq_ignore_ascii_case(tb) => 1.0,
        (Some(_), Some(_)) => 0.0,
        _ => NEUTRAL_TRANSPORT_SCORE,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub tags: f64,
    pub tools: f64,
    pub transport: f64,
    pub description: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationComplexity {
    Low,
    Medium,
    High,
}

impl MigrationComplexity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// A ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub entry: CatalogEntry,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    pub reasons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_complexity: Option<MigrationComplexity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub differences: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    profile: ScoringProfile,
}

impl SimilarityEngine {
    pub fn new(profile: ScoringProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    pub fn breakdown(&self, a: &CatalogEntry, b: &CatalogEntry) -> ScoreBreakdown {
        ScoreBreakdown {
            tags: jaccard(&a.tags, &b.tags),
            tools: jaccard(&a.tools, &b.tools),
            transport: transport_compatibility(a, b),
            description: overlap_coefficient(&a.description, &b.description),
        }
    }

    fn weigh(&self, breakdown: &ScoreBreakdown) -> f64 {
        let weights = self.profile.weights();
        let total = weights.total();
        if !(total > 0.0) {
            return 0.0;
        }
        let weighted = breakdown.tags * weights.tags
            + breakdown.tools * weights.tools
            + breakdown.transport * weights.transport
            + breakdown.description * weights.description;
        (weighted / total).clamp(0.0, 1.0)
    }

    /// Weighted composite in [0, 1]; an entry compared with itself scores 0.
    pub fn composite(&self, a: &CatalogEntry, b: &CatalogEntry) -> f64 {
        if a.name == b.name {
            return 0.0;
        }
        self.weigh(&self.breakdown(a, b))
    }

    /// Effort to move from `source` to `target`, judged on shared tools only.
    pub fn migration_complexity(
        &self,
        source: &CatalogEntry,
        target: &CatalogEntry,
    ) -> MigrationComplexity {
        if source.tools.is_empty() && target.tools.is_empty() {
            return MigrationComplexity::Low;
        }
        let tools = jaccard(&source.tools, &target.tools);
        let thresholds = self.profile.migration();
        if tools >= thresholds.low {
            MigrationComplexity::Low
        } else if tools >= thresholds.medium {
            MigrationComplexity::Medium
        } else {
            MigrationComplexity::High
        }
    }

    fn score_candidates<'a>(
        &self,
        source: &CatalogEntry,
        candidates: &'a [CatalogEntry],
    ) -> Vec<(&'a CatalogEntry, ScoreBreakdown, f64)> {
        candidates
            .iter()
            .filter(|candidate| candidate.name != source.name)
            .filter_map(|candidate| {
                let breakdown = self.breakdown(source, candidate);
                let score = self.weigh(&breakdown);
                (score > self.profile.inclusion_threshold()).then_some((candidate, breakdown, score))
            })
            .collect()
    }

    /// Replacement candidates for `source`, best first, with migration estimates.
    pub fn rank_alternatives(
        &self,
        source: &CatalogEntry,
        candidates: &[CatalogEntry],
    ) -> Vec<SimilarityResult> {
        let mut results: Vec<SimilarityResult> = self
            .score_candidates(source, candidates)
            .into_iter()
            .map(|(candidate, breakdown, score)| SimilarityResult {
                entry: candidate.clone(),
                score,
                breakdown: Some(breakdown),
                reasons: explain::match_reasons(source, candidate),
                migration_complexity: Some(self.migration_complexity(source, candidate)),
                differences: explain::differences(source, candidate),
            })
            .collect();
        sort_by_score(&mut results);
        results
    }

    /// Entries resembling `source`, best first, with match reasons only.
    pub fn rank_similar(
        &self,
        source: &CatalogEntry,
        candidates: &[CatalogEntry],
    ) -> Vec<SimilarityResult> {
        let mut results: Vec<SimilarityResult> = self
            .score_candidates(source, candidates)
            .into_iter()
            .map(|(candidate, _, score)| SimilarityResult {
                entry: candidate.clone(),
                score,
                breakdown: None,
                reasons: explain::match_reasons(source, candidate),
                migration_complexity: None,
                differences: Vec::new(),
            })
            .collect();
        sort_by_score(&mut results);
        results
    }

    /// Entries matching requested tags and/or tools, averaged evenly when both are given.
    pub fn rank_by_criteria(
        &self,
        tags: &[String],
        tools: &[String],
        candidates: &[CatalogEntry],
    ) -> Result<Vec<SimilarityResult>> {
        let has_tags = !lowercase_set(tags).is_empty();
        let has_tools = !lowercase_set(tools).is_empty();
        if !has_tags && !has_tools {
            return Err(SearchError::InvalidCriteria(
                "provide a server name, tags or tools".to_string(),
            ));
        }

        let mut results: Vec<SimilarityResult> = candidates
            .iter()
            .filter_map(|candidate| {
                let tag_score = if has_tags { jaccard(tags, &candidate.tags) } else { 0.0 };
                let tool_score = if has_tools { jaccard(tools, &candidate.tools) } else { 0.0 };
                let score = match (has_tags, has_tools) {
                    (true, true) => 0.5 * tag_score + 0.5 * tool_score,
                    (true, false) => tag_score,
                    _ => tool_score,
                };
                (score > self.profile.inclusion_threshold()).then(|| SimilarityResult {
                    entry: candidate.clone(),
                    score,
                    breakdown: None,
                    reasons: explain::criteria_reasons(tags, tools, candidate),
                    migration_complexity: None,
                    differences: Vec::new(),
                })
            })
            .collect();
        sort_by_score(&mut results);
        Ok(results)
    }
}

/// Descending score; ties keep input order.
fn sort_by_score(results: &mut [SimilarityResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
}
