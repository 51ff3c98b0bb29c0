use thiserror::Error;

use super::types::RecordId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrmError {
    #[error("Record store client not initialized")]
    NotInitialized,

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("{0}")]
    Rejected(String),

    #[error("All {failed} {entity} record(s) were rejected")]
    BatchRejected {
        entity: String,
        failed: usize,
        messages: Vec<String>,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CrmError {
    pub fn not_found(entity: &str, id: RecordId) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Message shown to the user for this failure.
    ///
    /// Store rejections are surfaced verbatim; everything else collapses to
    /// the generic `fallback` text supplied by the caller.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected(message) if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, CrmError>;

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for CrmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
