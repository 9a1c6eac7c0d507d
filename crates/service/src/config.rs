use std::time::Duration;

use scout_catalog::{DEFAULT_FETCH_DEADLINE, MAX_TARGET_COUNT};
use scout_search::{InsightLimits, ScoringProfile};

/// Default and maximum result count for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultLimit {
    pub default: usize,
    pub max: usize,
}

impl ResultLimit {
    pub const fn new(default: usize, max: usize) -> Self {
        Self { default, max }
    }

    /// `None` or zero selects the default; anything else is capped at `max`.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        match requested {
            None | Some(0) => self.default,
            Some(n) => n.min(self.max),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    pub fetch_deadline: Duration,
    /// Hard cap on entries accumulated by any one request
    pub target_ceiling: usize,
    pub search: ResultLimit,
    pub alternatives: ResultLimit,
    pub similar: ResultLimit,
    /// Entries fetched as the candidate set for ranking and aggregation
    pub candidate_pool: usize,
    pub insight_limits: InsightLimits,
    pub profile: ScoringProfile,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fetch_deadline: DEFAULT_FETCH_DEADLINE,
            target_ceiling: MAX_TARGET_COUNT,
            search: ResultLimit::new(20, MAX_TARGET_COUNT),
            alternatives: ResultLimit::new(5, 20),
            similar: ResultLimit::new(10, 50),
            candidate_pool: MAX_TARGET_COUNT,
            insight_limits: InsightLimits::default(),
            profile: ScoringProfile::default(),
        }
    }
}

impl DiscoveryConfig {
    pub fn with_fetch_deadline(mut self, deadline: Duration) -> Self {
        self.fetch_deadline = deadline;
        self
    }

    /// Clamped to the accumulator's hard limit.
    pub fn with_target_ceiling(mut self, ceiling: usize) -> Self {
        self.target_ceiling = ceiling.clamp(1, MAX_TARGET_COUNT);
        self
    }

    pub fn with_search_limit(mut self, limit: ResultLimit) -> Self {
        self.search = limit;
        self
    }

    pub fn with_alternatives_limit(mut self, limit: ResultLimit) -> Self {
        self.alternatives = limit;
        self
    }

    pub fn with_similar_limit(mut self, limit: ResultLimit) -> Self {
        self.similar = limit;
        self
    }

    pub fn with_candidate_pool(mut self, pool: usize) -> Self {
        self.candidate_pool = pool.max(1);
        self
    }

    pub fn with_insight_limits(mut self, limits: InsightLimits) -> Self {
        self.insight_limits = limits;
        self
    }

    pub fn with_profile(mut self, profile: ScoringProfile) -> Self {
        self.profile = profile;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_fall_back_and_cap() {
        let limit = ResultLimit::new(5, 20);
        assert_eq!(limit.resolve(None), 5);
        assert_eq!(limit.resolve(Some(0)), 5);
        assert_eq!(limit.resolve(Some(7)), 7);
        assert_eq!(limit.resolve(Some(500)), 20);
    }

    #[test]
    fn ceiling_never_exceeds_hard_limit() {
        let config = DiscoveryConfig::default().with_target_ceiling(5000);
        assert_eq!(config.target_ceiling, MAX_TARGET_COUNT);
        let config = config.with_target_ceiling(0);
        assert_eq!(config.target_ceiling, 1);
    }

    #[test]
    fn defaults_match_operation_budgets() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.fetch_deadline, Duration::from_secs(25));
        assert_eq!(config.search, ResultLimit::new(20, 1000));
        assert_eq!(config.similar, ResultLimit::new(10, 50));
        assert_eq!(config.profile.name(), "balanced");
    }
}
