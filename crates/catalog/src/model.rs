use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of one catalog entry, decoded once at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique qualified name (e.g. `io.github.acme/postgres-mcp`)
    pub name: String,

    pub version: String,

    pub description: String,

    /// Declared capability names ("tools")
    #[serde(default)]
    pub tools: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub packages: Vec<Package>,

    /// Absent when the publisher supplied no metrics at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<EnvVarSpec>,
}

/// One way of installing an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Registry kind (`npm`, `pypi`, `oci`, `docker`, `nuget`, `mcpb`, ...)
    pub registry_type: String,
    pub identifier: String,
    pub transport: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_hint: Option<String>,
}

impl Package {
    pub fn new(
        registry_type: impl Into<String>,
        identifier: impl Into<String>,
        transport: impl Into<String>,
    ) -> Self {
        Self {
            registry_type: registry_type.into(),
            identifier: identifier.into(),
            transport: transport.into(),
            runtime_hint: None,
        }
    }

    pub fn runtime_hint(mut self, hint: impl Into<String>) -> Self {
        self.runtime_hint = Some(hint.into());
        self
    }
}

/// Popularity metrics. Each field is `None` when unknown, which is distinct from zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulls: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Metrics {
    pub fn is_empty(&self) -> bool {
        self.stars.is_none() && self.pulls.is_none() && self.last_updated.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvVarSource {
    Metadata,
    Convention,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVarSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub example: String,
    pub source: EnvVarSource,
}

impl CatalogEntry {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            tools: Vec::new(),
            tags: Vec::new(),
            packages: Vec::new(),
            metrics: None,
            tier: None,
            status: None,
            repository_url: None,
            env_vars: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = if metrics.is_empty() {
            None
        } else {
            Some(metrics)
        };
        self
    }

    pub fn with_stars(mut self, stars: u64) -> Self {
        self.metrics.get_or_insert_with(Metrics::default).stars = Some(stars);
        self
    }

    pub fn with_pulls(mut self, pulls: u64) -> Self {
        self.metrics.get_or_insert_with(Metrics::default).pulls = Some(pulls);
        self
    }

    pub fn with_last_updated(mut self, at: DateTime<Utc>) -> Self {
        self.metrics.get_or_insert_with(Metrics::default).last_updated = Some(at);
        self
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_repository(mut self, url: impl Into<String>) -> Self {
        self.repository_url = Some(url.into());
        self
    }

    pub fn with_env_var(mut self, env: EnvVarSpec) -> Self {
        self.env_vars.push(env);
        self
    }

    pub fn stars(&self) -> Option<u64> {
        self.metrics.as_ref().and_then(|m| m.stars)
    }

    pub fn pulls(&self) -> Option<u64> {
        self.metrics.as_ref().and_then(|m| m.pulls)
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.metrics.as_ref().and_then(|m| m.last_updated)
    }

    /// Star count with "unknown counts as zero" semantics (thresholds, sorting, totals).
    pub fn stars_or_zero(&self) -> u64 {
        self.stars().unwrap_or(0)
    }

    pub fn pulls_or_zero(&self) -> u64 {
        self.pulls().unwrap_or(0)
    }

    pub fn primary_package(&self) -> Option<&Package> {
        self.packages.first()
    }

    /// Transport of the first declared package.
    pub fn primary_transport(&self) -> Option<&str> {
        self.primary_package().map(|p| p.transport.as_str())
    }
}
