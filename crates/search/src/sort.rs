use scout_catalog::CatalogEntry;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Descending
    Stars,
    /// Descending
    Pulls,
    /// Ascending, byte-wise
    Name,
    /// Newest first; unknown timestamps last
    UpdatedAt,
}

impl SortKey {
    /// `None` for empty or unrecognized keys, which leave the order untouched.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stars" => Some(Self::Stars),
            "pulls" => Some(Self::Pulls),
            "name" => Some(Self::Name),
            "updated_at" | "last_updated" | "updated" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    /// Serde adapter for request fields; unknown or blank keys become `None` like [`SortKey::parse`].
    pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Self>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(Self::parse))
    }

    fn compare(self, a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
        match self {
            Self::Stars => b.stars_or_zero().cmp(&a.stars_or_zero()),
            Self::Pulls => b.pulls_or_zero().cmp(&a.pulls_or_zero()),
            Self::Name => a.name.cmp(&b.name),
            Self::UpdatedAt => b.last_updated().cmp(&a.last_updated()),
        }
    }
}

/// Stable sort: entries with equal keys keep their relative order.
pub fn sort_entries(entries: &mut [CatalogEntry], key: Option<SortKey>) {
    if let Some(key) = key {
        entries.sort_by(|a, b| key.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn names(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    fn sample() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("b", "1", "").with_stars(10).with_pulls(5),
            CatalogEntry::new("a", "1", "").with_pulls(50),
            CatalogEntry::new("c", "1", "").with_stars(10),
            CatalogEntry::new("d", "1", "").with_stars(99),
        ]
    }

    #[test]
    fn stars_descend_with_ties_in_input_order() {
        let mut entries = sample();
        sort_entries(&mut entries, SortKey::parse("stars"));
        assert_eq!(names(&entries), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn pulls_descend_absent_as_zero() {
        let mut entries = sample();
        sort_entries(&mut entries, SortKey::parse("PULLS"));
        assert_eq!(names(&entries), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn name_ascends() {
        let mut entries = sample();
        sort_entries(&mut entries, SortKey::parse("name"));
        assert_eq!(names(&entries), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn updated_at_puts_newest_first_and_unknown_last() {
        let mut entries = vec![
            CatalogEntry::new("old", "1", "")
                .with_last_updated(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            CatalogEntry::new("unknown", "1", ""),
            CatalogEntry::new("new", "1", "")
                .with_last_updated(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()),
        ];
        sort_entries(&mut entries, SortKey::parse("updated_at"));
        assert_eq!(names(&entries), vec!["new", "old", "unknown"]);
    }

    #[derive(Deserialize)]
    struct Request {
        #[serde(default, deserialize_with = "SortKey::deserialize_lenient")]
        sort_by: Option<SortKey>,
    }

    fn requested(value: serde_json::Value) -> Option<SortKey> {
        serde_json::from_value::<Request>(value).unwrap().sort_by
    }

    #[test]
    fn lenient_field_accepts_aliases_and_ignores_unknown_keys() {
        assert_eq!(requested(serde_json::json!({ "sort_by": "updated" })), Some(SortKey::UpdatedAt));
        assert_eq!(requested(serde_json::json!({ "sort_by": "Stars" })), Some(SortKey::Stars));
        assert_eq!(requested(serde_json::json!({ "sort_by": "relevance" })), None);
        assert_eq!(requested(serde_json::json!({ "sort_by": null })), None);
        assert_eq!(requested(serde_json::json!({})), None);
    }

    #[test]
    fn unknown_key_keeps_collaborator_order() {
        let mut entries = sample();
        assert_eq!(SortKey::parse("relevance"), None);
        assert_eq!(SortKey::parse(""), None);
        sort_entries(&mut entries, SortKey::parse("relevance"));
        assert_eq!(names(&entries), vec!["b", "a", "c", "d"]);
    }

    proptest! {
        #[test]
        fn sort_is_stable_and_repeatable(stars in prop::collection::vec(0u64..4, 0..30)) {
            let entries: Vec<CatalogEntry> = stars
                .iter()
                .enumerate()
                .map(|(i, s)| CatalogEntry::new(format!("{i:02}"), "1", "").with_stars(*s))
                .collect();

            let mut first = entries.clone();
            sort_entries(&mut first, Some(SortKey::Stars));
            let mut second = entries;
            sort_entries(&mut second, Some(SortKey::Stars));
            prop_assert_eq!(&first, &second);

            for pair in first.windows(2) {
                if pair[0].stars() == pair[1].stars() {
                    prop_assert!(pair[0].name < pair[1].name);
                }
            }
        }
    }
}
