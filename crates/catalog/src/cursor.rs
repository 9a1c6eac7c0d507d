use serde::{Deserialize, Serialize};

/// Opaque continuation token issued by a catalog collaborator.
///
/// The pipeline only forwards it; an empty cursor means "from the beginning"
/// on input and "exhausted" on output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returned cursors are empty once the catalog has no further pages.
    pub fn is_end(&self) -> bool {
        self.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `None` for the empty cursor, for callers that surface "no more pages" as absence.
    pub fn into_option(self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0)
        }
    }
}

impl From<Option<String>> for Cursor {
    fn from(token: Option<String>) -> Self {
        Self(token.unwrap_or_default())
    }
}
