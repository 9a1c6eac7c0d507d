use std::fmt::Write;

use crate::error::{Result, SearchError};
use scout_catalog::CatalogEntry;

pub const MIN_COMPARE_ENTRIES: usize = 2;
pub const MAX_COMPARE_ENTRIES: usize = 5;

const NOT_AVAILABLE: &str = "N/A";

pub fn validate_compare_count(count: usize) -> Result<()> {
    if (MIN_COMPARE_ENTRIES..=MAX_COMPARE_ENTRIES).contains(&count) {
        Ok(())
    } else {
        Err(SearchError::InvalidCriteria(format!(
            "provide between {MIN_COMPARE_ENTRIES} and {MAX_COMPARE_ENTRIES} servers to compare"
        )))
    }
}

type Cell = fn(&CatalogEntry) -> String;

fn or_na(value: Option<impl ToString>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

const ROWS: [(&str, Cell); 7] = [
    ("**Version**", |e| {
        if e.version.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            e.version.clone()
        }
    }),
    ("**Stars**", |e| or_na(e.stars())),
    ("**Pulls**", |e| or_na(e.pulls())),
    ("**Tools**", |e| e.tools.len().to_string()),
    ("**Transport**", |e| or_na(e.primary_transport().filter(|t| !t.is_empty()))),
    ("**Tier**", |e| or_na(e.tier.as_deref())),
    ("**Status**", |e| or_na(e.status.as_deref())),
];

/// Markdown side-by-side comparison: attribute table, descriptions, tool lists.
pub fn render_comparison(entries: &[CatalogEntry]) -> Result<String> {
    validate_compare_count(entries.len())?;

    let mut out = String::from("# Server Comparison\n\n");

    out.push_str("| Attribute |");
    for entry in entries {
        let _ = write!(out, " {} |", entry.name);
    }
    out.push_str("\n|-----------|");
    for _ in entries {
        out.push_str("----------|");
    }
    out.push('\n');

    for (label, cell) in ROWS {
        let _ = write!(out, "| {label} |");
        for entry in entries {
            let _ = write!(out, " {} |", cell(entry));
        }
        out.push('\n');
    }
    out.push('\n');

    out.push_str("## Descriptions\n\n");
    for entry in entries {
        let _ = write!(out, "### {}\n{}\n\n", entry.name, entry.description);
    }

    out.push_str("## Available Tools\n\n");
    for entry in entries {
        let _ = writeln!(out, "### {}", entry.name);
        if entry.tools.is_empty() {
            out.push_str("No tool information available\n");
        }
        for tool in &entry.tools {
            let _ = writeln!(out, "- {tool}");
        }
        out.push('\n');
    }

    Ok(out)
}
