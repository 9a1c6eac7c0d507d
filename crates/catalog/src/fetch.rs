//! Paginated fetch accumulator.
//!
//! Walks the catalog page by page until one of these holds, checked in order:
//!
//! 1. the wall-clock deadline has passed (checked before each page request)
//! 2. the target count is reached (excess tail trimmed, order kept)
//! 3. the catalog returns an empty continuation cursor
//! 4. a page request fails (fatal on the first page, partial result afterwards)
//!
//! The deadline is cooperative: a single slow page can overrun it by that
//! page's latency. There are no retries here; a caller resumes with the
//! returned cursor.

use crate::cursor::Cursor;
use crate::error::Result;
use crate::model::CatalogEntry;
use crate::source::{CatalogSource, PageRequest};
use scout_protocol::{PageMetadata, Truncation};
use std::time::Duration;
use tokio::time::Instant;

/// Hard ceiling on the number of entries a single request may accumulate.
pub const MAX_TARGET_COUNT: usize = 1000;

pub const DEFAULT_FETCH_DEADLINE: Duration = Duration::from_secs(25);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchBudget {
    pub target_count: usize,
    pub deadline: Duration,
    pub ceiling: usize,
}

impl FetchBudget {
    pub fn new(target_count: usize, deadline: Duration) -> Self {
        Self {
            target_count,
            deadline,
            ceiling: MAX_TARGET_COUNT,
        }
    }

    /// Lower the ceiling; it can never be raised above [`MAX_TARGET_COUNT`].
    pub fn ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = ceiling.min(MAX_TARGET_COUNT);
        self
    }

    pub fn effective_target(&self) -> usize {
        self.target_count.clamp(1, self.ceiling.clamp(1, MAX_TARGET_COUNT))
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub entries: Vec<CatalogEntry>,
    /// Empty when the catalog was exhausted
    pub next_cursor: Cursor,
    pub pages_read: usize,
    pub truncated: bool,
    pub truncation: Option<Truncation>,
    pub elapsed: Duration,
}

impl FetchOutcome {
    /// Pagination metadata for a result derived from this fetch.
    pub fn metadata(&self, count: usize) -> PageMetadata {
        PageMetadata {
            count,
            next_cursor: self.next_cursor.clone().into_option(),
            truncated: self.truncated,
            truncation: self.truncation,
            pages_read: self.pages_read,
            elapsed_ms: u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Accumulate up to `budget.target_count` entries starting at `start.cursor`.
///
/// `start`'s hints are forwarded with every page request.
pub async fn fetch_up_to<C>(source: &C, start: &PageRequest, budget: FetchBudget) -> Result<FetchOutcome>
where
    C: CatalogSource + ?Sized,
{
    let started = Instant::now();
    let target = budget.effective_target();

    let mut entries: Vec<CatalogEntry> = Vec::new();
    let mut cursor = start.cursor.clone();
    let mut pages_read = 0usize;
    let mut truncation = None;

    loop {
        if started.elapsed() > budget.deadline {
            log::warn!(
                "Fetch deadline of {:?} exceeded after {} pages, returning partial results",
                budget.deadline,
                pages_read
            );
            truncation = Some(Truncation::Deadline);
            break;
        }

        let page = match source.list_page(&start.with_cursor(cursor.clone())).await {
            Ok(page) => page,
            Err(err) if pages_read == 0 => {
                log::error!("Failed to fetch first catalog page: {err}");
                return Err(err);
            }
            Err(err) => {
                log::warn!(
                    "Failed to fetch page {}, returning partial results: {err}",
                    pages_read + 1
                );
                truncation = Some(Truncation::PageFailure);
                break;
            }
        };

        pages_read += 1;
        entries.extend(page.entries);
        log::debug!(
            "Fetched page {pages_read}: {} entries accumulated (target {target})",
            entries.len()
        );

        if entries.len() >= target {
            entries.truncate(target);
            cursor = page.next_cursor;
            break;
        }

        if page.next_cursor.is_end() {
            cursor = Cursor::start();
            break;
        }
        cursor = page.next_cursor;
    }

    Ok(FetchOutcome {
        entries,
        next_cursor: cursor,
        pages_read,
        truncated: truncation.is_some(),
        truncation,
        elapsed: started.elapsed(),
    })
}
