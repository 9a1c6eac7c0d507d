use crate::cursor::Cursor;
use crate::error::Result;
use crate::model::CatalogEntry;
use async_trait::async_trait;
use std::sync::Arc;

/// Request for a single catalog page.
///
/// `version_filter` and `search_hint` are optional server-side hints; a
/// collaborator may ignore them and callers still filter locally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Cursor,
    pub version_filter: Option<String>,
    pub search_hint: Option<String>,
}

impl PageRequest {
    pub fn at(cursor: Cursor) -> Self {
        Self {
            cursor,
            ..Self::default()
        }
    }

    pub fn with_cursor(&self, cursor: Cursor) -> Self {
        Self {
            cursor,
            version_filter: self.version_filter.clone(),
            search_hint: self.search_hint.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub entries: Vec<CatalogEntry>,
    /// Empty once the catalog is exhausted
    pub next_cursor: Cursor,
}

/// The external paginated catalog.
///
/// Implementations own their concurrency safety; the pipeline issues one
/// page request at a time per request.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn list_page(&self, request: &PageRequest) -> Result<Page>;

    /// `Ok(None)` when no entry carries `name`.
    async fn get_entry(&self, name: &str) -> Result<Option<CatalogEntry>>;
}

#[async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    async fn list_page(&self, request: &PageRequest) -> Result<Page> {
        (**self).list_page(request).await
    }

    async fn get_entry(&self, name: &str) -> Result<Option<CatalogEntry>> {
        (**self).get_entry(name).await
    }
}
