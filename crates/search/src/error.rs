use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error("{0}")]
    Other(String),
}
