//! Predicate filter pipeline.
//!
//! Every non-empty criterion becomes one [`Predicate`]; an entry survives only
//! when all of them accept it. Predicates run cheapest first and the pipeline
//! only removes entries, so the surviving order is the input order.

use scout_catalog::CatalogEntry;
use serde::{Deserialize, Serialize};

/// Filter criteria. Empty strings, empty lists and zero thresholds are no-ops.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the qualified name
    pub name: String,
    /// Free text over name, description and tools (tags excluded)
    pub query: String,
    /// All of these tags are required
    pub tags: Vec<String>,
    /// All of these tools are required, each as a substring of some declared tool
    pub tools: Vec<String>,
    pub transport: String,
    pub registry_type: String,
    pub min_stars: u64,
    pub min_pulls: u64,
    pub tier: String,
    pub status: String,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        FilterPipeline::from_criteria(self).is_empty()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = transport.into();
        self
    }

    pub fn registry_type(mut self, registry_type: impl Into<String>) -> Self {
        self.registry_type = registry_type.into();
        self
    }

    pub fn min_stars(mut self, min: u64) -> Self {
        self.min_stars = min;
        self
    }

    pub fn min_pulls(mut self, min: u64) -> Self {
        self.min_pulls = min;
        self
    }

    pub fn tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

/// Rough evaluation cost; lower runs first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PredicateCost {
    /// Integer comparison
    Metric,
    /// Single short string comparison
    Field,
    /// Scan over packages
    Packages,
    /// Substring scan of one string
    Text,
    /// Scan over a list per required item
    Set,
    /// Substring scan across several fields
    FullText,
}

/// One independent filter criterion.
pub trait Predicate: Send + Sync {
    fn name(&self) -> &'static str;

    fn cost(&self) -> PredicateCost;

    fn matches(&self, entry: &CatalogEntry) -> bool;
}

fn normalized(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn normalized_list(values: &[String]) -> Option<Vec<String>> {
    let list: Vec<String> = values.iter().filter_map(|v| normalized(v)).collect();
    (!list.is_empty()).then_some(list)
}

struct NameContains(String);

impl Predicate for NameContains {
    fn name(&self) -> &'static str {
        "name"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::Text
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        entry.name.to_lowercase().contains(&self.0)
    }
}

struct FreeText(String);

impl Predicate for FreeText {
    fn name(&self) -> &'static str {
        "query"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::FullText
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        entry.name.to_lowercase().contains(&self.0)
            || entry.description.to_lowercase().contains(&self.0)
            || entry
                .tools
                .iter()
                .any(|tool| tool.to_lowercase().contains(&self.0))
    }
}

struct AllTags(Vec<String>);

impl Predicate for AllTags {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::Set
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        self.0
            .iter()
            .all(|required| entry.tags.iter().any(|tag| tag.to_lowercase() == *required))
    }
}

struct AllTools(Vec<String>);

impl Predicate for AllTools {
    fn name(&self) -> &'static str {
        "tools"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::Set
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        self.0.iter().all(|required| {
            entry
                .tools
                .iter()
                .any(|tool| tool.to_lowercase().contains(required.as_str()))
        })
    }
}

struct Transport(String);

impl Predicate for Transport {
    fn name(&self) -> &'static str {
        "transport"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::Packages
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        entry
            .packages
            .iter()
            .any(|pkg| pkg.transport.eq_ignore_ascii_case(&self.0))
    }
}

struct RegistryType(String);

impl Predicate for RegistryType {
    fn name(&self) -> &'static str {
        "registry_type"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::Packages
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        entry
            .packages
            .iter()
            .any(|pkg| pkg.registry_type.eq_ignore_ascii_case(&self.0))
    }
}

struct MinStars(u64);

impl Predicate for MinStars {
    fn name(&self) -> &'static str {
        "min_stars"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::Metric
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        entry.stars_or_zero() >= self.0
    }
}

struct MinPulls(u64);

impl Predicate for MinPulls {
    fn name(&self) -> &'static str {
        "min_pulls"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::Metric
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        entry.pulls_or_zero() >= self.0
    }
}

struct Tier(String);

impl Predicate for Tier {
    fn name(&self) -> &'static str {
        "tier"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::Field
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        entry
            .tier
            .as_deref()
            .is_some_and(|tier| tier.eq_ignore_ascii_case(&self.0))
    }
}

struct Status(String);

impl Predicate for Status {
    fn name(&self) -> &'static str {
        "status"
    }

    fn cost(&self) -> PredicateCost {
        PredicateCost::Field
    }

    fn matches(&self, entry: &CatalogEntry) -> bool {
        entry
            .status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case(&self.0))
    }
}

/// Ordered conjunction of predicates.
#[derive(Default)]
pub struct FilterPipeline {
    predicates: Vec<Box<dyn Predicate>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one predicate per non-empty criterion.
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        let mut pipeline = Self::new();
        if let Some(name) = normalized(&criteria.name) {
            pipeline.push(Box::new(NameContains(name)));
        }
        if let Some(query) = normalized(&criteria.query) {
            pipeline.push(Box::new(FreeText(query)));
        }
        if let Some(tags) = normalized_list(&criteria.tags) {
            pipeline.push(Box::new(AllTags(tags)));
        }
        if let Some(tools) = normalized_list(&criteria.tools) {
            pipeline.push(Box::new(AllTools(tools)));
        }
        if let Some(transport) = normalized(&criteria.transport) {
            pipeline.push(Box::new(Transport(transport)));
        }
        if let Some(registry_type) = normalized(&criteria.registry_type) {
            pipeline.push(Box::new(RegistryType(registry_type)));
        }
        if criteria.min_stars > 0 {
            pipeline.push(Box::new(MinStars(criteria.min_stars)));
        }
        if criteria.min_pulls > 0 {
            pipeline.push(Box::new(MinPulls(criteria.min_pulls)));
        }
        if let Some(tier) = normalized(&criteria.tier) {
            pipeline.push(Box::new(Tier(tier)));
        }
        if let Some(status) = normalized(&criteria.status) {
            pipeline.push(Box::new(Status(status)));
        }
        pipeline
    }

    /// Add a predicate, keeping the pipeline ordered by cost.
    pub fn push(&mut self, predicate: Box<dyn Predicate>) {
        self.predicates.push(predicate);
        self.predicates.sort_by_key(|p| p.cost());
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.predicates.iter().map(|p| p.name()).collect()
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        self.predicates.iter().all(|p| p.matches(entry))
    }

    pub fn apply(&self, mut entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
        if self.predicates.is_empty() {
            return entries;
        }
        log::debug!("Filtering {} entries with {:?}", entries.len(), self.names());
        entries.retain(|entry| self.matches(entry));
        entries
    }
}

pub fn filter_entries(entries: Vec<CatalogEntry>, criteria: &FilterCriteria) -> Vec<CatalogEntry> {
    FilterPipeline::from_criteria(criteria).apply(entries)
}
