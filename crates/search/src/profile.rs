use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

const BUILTIN_BALANCED: &str = include_str!("../../../profiles/balanced.json");
const BUILTIN_CAPABILITY_FIRST: &str = include_str!("../../../profiles/capability-first.toml");

/// Relative weight of each similarity component in the composite score.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringWeights {
    pub tags: f64,
    pub tools: f64,
    pub transport: f64,
    pub description: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            tags: 0.4,
            tools: 0.4,
            transport: 0.1,
            description: 0.1,
        }
    }
}

impl ScoringWeights {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.tags + self.tools + self.transport + self.description
    }

    /// Human-readable share of each component, e.g. `tags(40%), tools(40%), ...`.
    #[must_use]
    pub fn describe(&self) -> String {
        let total = self.total();
        let share = |w: f64| {
            if total > 0.0 {
                (w / total * 100.0).round()
            } else {
                0.0
            }
        };
        format!(
            "tags({}%), tools({}%), transport({}%), description({}%)",
            share(self.tags),
            share(self.tools),
            share(self.transport),
            share(self.description)
        )
    }
}

/// Tool-set Jaccard thresholds for migration complexity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MigrationThresholds {
    pub low: f64,
    pub medium: f64,
}

impl Default for MigrationThresholds {
    fn default() -> Self {
        Self {
            low: 0.8,
            medium: 0.5,
        }
    }
}

/// Average-overlap thresholds for the qualitative overlap insight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlapThresholds {
    pub competing: f64,
    pub complementary: f64,
}

impl Default for OverlapThresholds {
    fn default() -> Self {
        Self {
            competing: 0.7,
            complementary: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringProfile {
    name: String,
    description: Option<String>,
    weights: ScoringWeights,
    inclusion_threshold: f64,
    migration: MigrationThresholds,
    overlap: OverlapThresholds,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self {
            name: "balanced".to_string(),
            description: None,
            weights: ScoringWeights::default(),
            inclusion_threshold: 0.1,
            migration: MigrationThresholds::default(),
            overlap: OverlapThresholds::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawProfile {
    #[serde(default)]
    schema_version: Option<u32>,
    name: Option<String>,
    description: Option<String>,
    #[serde(default)]
    weights: Option<RawWeights>,
    inclusion_threshold: Option<f64>,
    #[serde(default)]
    migration: Option<RawMigration>,
    #[serde(default)]
    overlap: Option<RawOverlap>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawWeights {
    tags: Option<f64>,
    tools: Option<f64>,
    transport: Option<f64>,
    description: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawMigration {
    low: Option<f64>,
    medium: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawOverlap {
    competing: Option<f64>,
    complementary: Option<f64>,
}

impl ScoringProfile {
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "balanced" | "default" => {
                Self::from_bytes("balanced", BUILTIN_BALANCED.as_bytes()).ok()
            }
            "capability-first" => {
                Self::from_bytes("capability-first", BUILTIN_CAPABILITY_FIRST.as_bytes()).ok()
            }
            _ => None,
        }
    }

    pub fn from_file(profile_name: &str, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read scoring profile {}", path.display()))?;
        Self::from_bytes(profile_name, &bytes)
    }

    /// Parse JSON (or TOML) and merge it over the defaults.
    pub fn from_bytes(profile_name: &str, bytes: &[u8]) -> Result<Self> {
        let raw = parse_raw(bytes).with_context(|| {
            format!("Scoring profile '{profile_name}' is not valid JSON/TOML configuration")
        })?;
        Self::from_raw(raw, profile_name)
    }

    fn from_raw(raw: RawProfile, profile_name: &str) -> Result<Self> {
        if let Some(schema_version) = raw.schema_version {
            if schema_version != 1 {
                return Err(anyhow!(
                    "profile.schema_version {schema_version} is not supported (expected 1)"
                ));
            }
        }

        let defaults = Self::default();
        let weights = raw.weights.unwrap_or_default();
        let migration = raw.migration.unwrap_or_default();
        let overlap = raw.overlap.unwrap_or_default();

        let profile = Self {
            name: raw.name.unwrap_or_else(|| profile_name.to_string()),
            description: raw.description,
            weights: ScoringWeights {
                tags: weights.tags.unwrap_or(defaults.weights.tags),
                tools: weights.tools.unwrap_or(defaults.weights.tools),
                transport: weights.transport.unwrap_or(defaults.weights.transport),
                description: weights.description.unwrap_or(defaults.weights.description),
            },
            inclusion_threshold: raw
                .inclusion_threshold
                .unwrap_or(defaults.inclusion_threshold),
            migration: MigrationThresholds {
                low: migration.low.unwrap_or(defaults.migration.low),
                medium: migration.medium.unwrap_or(defaults.migration.medium),
            },
            overlap: OverlapThresholds {
                competing: overlap.competing.unwrap_or(defaults.overlap.competing),
                complementary: overlap
                    .complementary
                    .unwrap_or(defaults.overlap.complementary),
            },
        };
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("weights.tags", self.weights.tags),
            ("weights.tools", self.weights.tools),
            ("weights.transport", self.weights.transport),
            ("weights.description", self.weights.description),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(anyhow!("{key} must be a non-negative number (got {value})"));
            }
        }
        if self.weights.total() <= 0.0 {
            return Err(anyhow!("weights must not all be zero"));
        }

        for (key, value) in [
            ("inclusion_threshold", self.inclusion_threshold),
            ("migration.low", self.migration.low),
            ("migration.medium", self.migration.medium),
            ("overlap.competing", self.overlap.competing),
            ("overlap.complementary", self.overlap.complementary),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{key} must be within [0, 1] (got {value})"));
            }
        }
        if self.migration.medium > self.migration.low {
            return Err(anyhow!("migration.medium must not exceed migration.low"));
        }
        if self.overlap.complementary > self.overlap.competing {
            return Err(anyhow!(
                "overlap.complementary must not exceed overlap.competing"
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    #[must_use]
    pub const fn inclusion_threshold(&self) -> f64 {
        self.inclusion_threshold
    }

    #[must_use]
    pub const fn migration(&self) -> &MigrationThresholds {
        &self.migration
    }

    #[must_use]
    pub const fn overlap(&self) -> &OverlapThresholds {
        &self.overlap
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn with_inclusion_threshold(mut self, threshold: f64) -> Self {
        self.inclusion_threshold = threshold;
        self
    }
}

fn parse_raw(bytes: &[u8]) -> Result<RawProfile> {
    let value: serde_json::Value = match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| anyhow!("{json_err}; {err}"))?;
            let toml_value: toml::Value = toml::from_str(utf8).map_err(|toml_err| {
                anyhow!(
                    "Profile is not valid JSON or TOML ({json_err}); TOML parse error: {toml_err}"
                )
            })?;
            serde_json::to_value(toml_value)
                .map_err(|err| anyhow!("Failed to convert TOML profile to JSON: {err}"))?
        }
    };

    validate_profile_value(&value)?;
    serde_json::from_value(value).map_err(|err| anyhow!("Profile parse error: {err}"))
}

fn validate_profile_value(value: &serde_json::Value) -> Result<()> {
    fn validate_object_keys(
        unknown: &mut Vec<String>,
        obj: &serde_json::Map<String, serde_json::Value>,
        base: &str,
        allowed: &[&str],
    ) {
        for key in obj.keys() {
            if !allowed.contains(&key.as_str()) {
                if base.is_empty() {
                    unknown.push(key.clone());
                } else {
                    unknown.push(format!("{base}.{key}"));
                }
            }
        }
    }

    let serde_json::Value::Object(root) = value else {
        return Err(anyhow!("Profile config must be a JSON object"));
    };

    let mut unknown = Vec::new();
    validate_object_keys(
        &mut unknown,
        root,
        "",
        &[
            "schema_version",
            "name",
            "description",
            "weights",
            "inclusion_threshold",
            "migration",
            "overlap",
        ],
    );

    let sections: [(&str, &[&str]); 3] = [
        ("weights", &["tags", "tools", "transport", "description"]),
        ("migration", &["low", "medium"]),
        ("overlap", &["competing", "complementary"]),
    ];
    for (section, allowed) in sections {
        if let Some(serde_json::Value::Object(obj)) = root.get(section) {
            validate_object_keys(&mut unknown, obj, section, allowed);
        }
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "Profile config has unknown fields: {}",
            unknown.join(", ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_balanced_matches_defaults() {
        let profile = ScoringProfile::builtin("balanced").unwrap();
        assert_eq!(profile.weights(), ScoringProfile::default().weights());
        assert_eq!(
            profile.weights().describe(),
            "tags(40%), tools(40%), transport(10%), description(10%)"
        );
        assert!(profile.description().is_some());
    }

    #[test]
    fn builtin_toml_profile_parses() {
        let profile = ScoringProfile::builtin("capability-first").unwrap();
        assert_eq!(profile.name(), "capability-first");
        assert!((profile.weights().tools - 0.6).abs() < f64::EPSILON);
        assert!((profile.inclusion_threshold() - 0.1).abs() < f64::EPSILON);
        assert!(ScoringProfile::builtin("nope").is_none());
    }

    #[test]
    fn partial_profile_merges_over_defaults() {
        let profile = ScoringProfile::from_bytes(
            "custom",
            br#"{ "weights": { "description": 0.3 }, "migration": { "low": 0.9 } }"#,
        )
        .unwrap();
        assert_eq!(profile.name(), "custom");
        assert!((profile.weights().description - 0.3).abs() < f64::EPSILON);
        assert!((profile.weights().tags - 0.4).abs() < f64::EPSILON);
        assert!((profile.migration().low - 0.9).abs() < f64::EPSILON);
        assert!((profile.migration().medium - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn profile_rejects_unknown_fields_with_paths() {
        let bytes = br#"
        {
          "schema_version": 1,
          "weights": { "tags": 0.5, "stars": 0.5 },
          "ranking": {}
        }
        "#;
        let err = ScoringProfile::from_bytes("custom", bytes).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("weights.stars"), "{msg}");
        assert!(msg.contains("ranking"), "{msg}");
    }

    #[test]
    fn profile_rejects_unsupported_schema_version() {
        let err = ScoringProfile::from_bytes("custom", br#"{ "schema_version": 2 }"#).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("profile.schema_version"), "{msg}");
    }

    #[test]
    fn profile_rejects_negative_and_zero_weights() {
        let err = ScoringProfile::from_bytes("custom", br#"{ "weights": { "tools": -0.1 } }"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("weights.tools"));

        let zero = br#"{ "weights": { "tags": 0, "tools": 0, "transport": 0, "description": 0 } }"#;
        assert!(ScoringProfile::from_bytes("custom", zero).is_err());
    }

    #[test]
    fn profile_rejects_inverted_thresholds() {
        let err = ScoringProfile::from_bytes("custom", br#"{ "migration": { "low": 0.4 } }"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("migration.medium"));
        assert!(
            ScoringProfile::from_bytes("custom", br#"{ "inclusion_threshold": 1.5 }"#).is_err()
        );
    }

    #[test]
    fn loads_profile_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[weights]\ntags = 1.0\ntools = 1.0").unwrap();
        let profile = ScoringProfile::from_file("from-disk", file.path()).unwrap();
        assert_eq!(profile.name(), "from-disk");
        assert_eq!(
            profile.weights().describe(),
            "tags(45%), tools(45%), transport(5%), description(5%)"
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = ScoringProfile::from_file("x", &path).unwrap_err();
        assert!(format!("{err:#}").contains("absent.toml"));
    }
}
