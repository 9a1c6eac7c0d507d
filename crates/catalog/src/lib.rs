//! Catalog entries, the collaborator contract and the paginated fetch accumulator.
//!
//! A [`CatalogSource`] serves one page at a time behind an opaque [`Cursor`].
//! [`fetch_up_to`] walks it under a target count and a cooperative deadline,
//! returning partial results instead of failing once at least one page arrived.

mod cursor;
mod decode;
mod error;
mod fetch;
mod model;
mod registry;
mod snapshot;
mod source;

pub use cursor::Cursor;
pub use decode::{decode_server, decode_server_list};
pub use error::{CatalogError, Result};
pub use fetch::{fetch_up_to, FetchBudget, FetchOutcome, DEFAULT_FETCH_DEADLINE, MAX_TARGET_COUNT};
pub use model::{CatalogEntry, EnvVarSource, EnvVarSpec, Metrics, Package};
pub use registry::{RegistryClient, RegistryClientConfig};
pub use snapshot::{SnapshotCatalog, DEFAULT_SNAPSHOT_PAGE_SIZE};
pub use source::{CatalogSource, Page, PageRequest};
