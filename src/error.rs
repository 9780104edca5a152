use crate::legality::DenyReason;

#[derive(Debug, thiserror::Error)]
pub enum DeckboardError {
    #[error("placement denied: {0}")]
    Denied(DenyReason),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),
}

impl From<DenyReason> for DeckboardError {
    fn from(reason: DenyReason) -> Self {
        DeckboardError::Denied(reason)
    }
}

pub type Result<T> = std::result::Result<T, DeckboardError>;
