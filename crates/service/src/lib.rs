//! Catalog discovery service.
//!
//! [`Discovery`] owns one [`CatalogSource`](scout_catalog::CatalogSource) and a
//! [`DiscoveryConfig`], and runs each request through fetch and one of the
//! search stages. Failures surface as [`DiscoveryError`], whose
//! [`user_message`](DiscoveryError::user_message) is safe to show.

mod config;
mod discovery;
mod error;
mod report;

pub use config::{DiscoveryConfig, ResultLimit};
pub use discovery::{render_json, Discovery};
pub use error::{DiscoveryError, Result};
pub use report::{
    AlternativesMetadata, AlternativesReport, AnalyticsReport, FindAlternativesRequest, FindSimilarRequest,
    InsightsReport, OverlapReport, SearchPage, SearchQuery, SimilarMetadata, SimilarReport,
};
