//! Human-readable match reasons and differences.
//!
//! Purely descriptive: nothing here feeds back into scores or ordering.

use crate::runtime::{detect_runtime, UNKNOWN_RUNTIME};
use crate::similarity::shared_items;
use scout_catalog::CatalogEntry;

/// Why `candidate` resembles `source`.
pub fn match_reasons(source: &CatalogEntry, candidate: &CatalogEntry) -> Vec<String> {
    let mut reasons = Vec::new();

    let tags = shared_items(&source.tags, &candidate.tags);
    if !tags.is_empty() {
        reasons.push(format!("shared tags: {}", tags.join(", ")));
    }

    let tools = shared_items(&source.tools, &candidate.tools).len();
    if tools > 0 {
        reasons.push(format!("similar tools: {tools}/{}", source.tools.len()));
    }

    if let (Some(ours), Some(theirs)) = (source.primary_transport(), candidate.primary_transport()) {
        if ours.eq_ignore_ascii_case(theirs) {
            reasons.push(format!("same transport: {ours}"));
        }
    }

    let (ours, theirs) = (source.stars_or_zero(), candidate.stars_or_zero());
    if theirs > ours {
        reasons.push(format!("more popular: {theirs} vs {ours} stars"));
    }

    reasons
}

/// What a user switching from `source` to `candidate` would notice.
pub fn differences(source: &CatalogEntry, candidate: &CatalogEntry) -> Vec<String> {
    let mut diffs = Vec::new();

    if let (Some(ours), Some(theirs)) = (source.primary_transport(), candidate.primary_transport()) {
        if !ours.eq_ignore_ascii_case(theirs) {
            diffs.push(format!("transport: {ours} vs {theirs}"));
        }
    }

    let (ours, theirs) = (detect_runtime(source), detect_runtime(candidate));
    if ours != theirs && ours != UNKNOWN_RUNTIME && theirs != UNKNOWN_RUNTIME {
        diffs.push(format!("runtime: {ours} vs {theirs}"));
    }

    if let (Some(ours), Some(theirs)) = (source.tier.as_deref(), candidate.tier.as_deref()) {
        if ours != theirs {
            diffs.push(format!("tier: {ours} vs {theirs}"));
        }
    }

    diffs
}

/// Reasons for a tag/tool criteria match.
pub fn criteria_reasons(tags: &[String], tools: &[String], candidate: &CatalogEntry) -> Vec<String> {
    let mut reasons = Vec::new();

    let matched_tags = shared_items(tags, &candidate.tags);
    if !matched_tags.is_empty() {
        reasons.push(format!("tags: {}", matched_tags.join(", ")));
    }

    let requested: Vec<&String> = tools.iter().filter(|t| !t.trim().is_empty()).collect();
    let matched_tools = shared_items(&requested, &candidate.tools).len();
    if matched_tools > 0 {
        reasons.push(format!("tools: {matched_tools}/{}", requested.len()));
    }

    reasons
}
