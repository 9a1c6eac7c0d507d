use crate::cursor::Cursor;
use crate::decode::decode_server_list;
use crate::error::{CatalogError, Result};
use crate::model::CatalogEntry;
use crate::source::{CatalogSource, Page, PageRequest};
use async_trait::async_trait;

pub const DEFAULT_SNAPSHOT_PAGE_SIZE: usize = 100;

/// In-process, pre-loaded catalog served in fixed-size pages.
#[derive(Debug, Clone)]
pub struct SnapshotCatalog {
    entries: Vec<CatalogEntry>,
    page_size: usize,
}

impl SnapshotCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self::with_page_size(entries, DEFAULT_SNAPSHOT_PAGE_SIZE)
    }

    pub fn with_page_size(entries: Vec<CatalogEntry>, page_size: usize) -> Self {
        Self {
            entries,
            page_size: page_size.max(1),
        }
    }

    /// Build a snapshot from an upstream `/v0/servers` payload.
    pub fn from_registry_json(bytes: &[u8]) -> Result<Self> {
        let page = decode_server_list(bytes)?;
        Ok(Self::new(page.entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    fn offset_of(cursor: &Cursor) -> Result<usize> {
        if cursor.is_empty() {
            return Ok(0);
        }
        cursor
            .as_str()
            .parse::<usize>()
            .map_err(|_| CatalogError::Other(format!("unknown cursor: {}", cursor.as_str())))
    }

    fn matches_hints(entry: &CatalogEntry, request: &PageRequest) -> bool {
        let search_ok = request
            .search_hint
            .as_deref()
            .filter(|s| !s.is_empty())
            .map_or(true, |s| entry.name.to_lowercase().contains(&s.to_lowercase()));
        let version_ok = request
            .version_filter
            .as_deref()
            .filter(|v| !v.is_empty() && *v != "latest")
            .map_or(true, |v| entry.version == v);
        search_ok && version_ok
    }
}

#[async_trait]
impl CatalogSource for SnapshotCatalog {
    async fn list_page(&self, request: &PageRequest) -> Result<Page> {
        let matching: Vec<&CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| Self::matches_hints(e, request))
            .collect();

        let start = Self::offset_of(&request.cursor)?.min(matching.len());
        let end = (start + self.page_size).min(matching.len());
        let next_cursor = if end < matching.len() {
            Cursor::from_token(end.to_string())
        } else {
            Cursor::start()
        };

        Ok(Page {
            entries: matching[start..end].iter().map(|e| (*e).clone()).collect(),
            next_cursor,
        })
    }

    async fn get_entry(&self, name: &str) -> Result<Option<CatalogEntry>> {
        Ok(self.entries.iter().find(|e| e.name == name).cloned())
    }
}
