use thiserror::Error;

/// Errors returned by a [`ContentSource`](super::ContentSource)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// No post exists for the requested slug
    #[error("post not found: {0}")]
    NotFound(String),

    /// The store was unreachable, rejected the query, or returned garbage
    #[error("content query failed: {0}")]
    QueryFailed(String),
}

impl From<reqwest::Error> for ContentError {
    fn from(err: reqwest::Error) -> Self {
        ContentError::QueryFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ContentError {
    fn from(err: serde_json::Error) -> Self {
        ContentError::QueryFailed(format!("malformed document: {}", err))
    }
}
