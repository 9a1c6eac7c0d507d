use scout_catalog::CatalogError;
use scout_protocol::ErrorEnvelope;
use scout_search::SearchError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DiscoveryError>;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Catalog unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Server not found: {0}")]
    EntryNotFound(String),

    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error("Serialization failed: {0}")]
    SerializationFailure(#[from] serde_json::Error),
}

impl From<CatalogError> for DiscoveryError {
    fn from(err: CatalogError) -> Self {
        Self::CollaboratorUnavailable(err.to_string())
    }
}

impl From<SearchError> for DiscoveryError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidCriteria(msg) => Self::InvalidCriteria(msg),
            SearchError::Other(msg) => Self::CollaboratorUnavailable(msg),
        }
    }
}

impl DiscoveryError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::CollaboratorUnavailable(_) => "collaborator_unavailable",
            Self::EntryNotFound(_) => "entry_not_found",
            Self::InvalidCriteria(_) => "invalid_criteria",
            Self::SerializationFailure(_) => "serialization_failure",
        }
    }

    /// Short text safe to show a user; collaborator details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::CollaboratorUnavailable(_) => "failed to fetch servers".to_string(),
            Self::EntryNotFound(name) => format!("server not found: {name}"),
            Self::InvalidCriteria(msg) => msg.clone(),
            Self::SerializationFailure(_) => "failed to serialize result".to_string(),
        }
    }

    pub fn to_envelope(&self) -> ErrorEnvelope {
        let hint = match self {
            Self::CollaboratorUnavailable(_) => Some("retry later; the catalog did not answer".to_string()),
            Self::EntryNotFound(_) => Some("use the fully qualified server name".to_string()),
            Self::InvalidCriteria(_) | Self::SerializationFailure(_) => None,
        };
        ErrorEnvelope {
            code: self.code().to_string(),
            message: self.user_message(),
            details: None,
            hint,
        }
    }
}
