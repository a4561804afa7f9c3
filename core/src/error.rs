use thiserror::Error;

use crate::types::GroupKey;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No tracts in scope, so no mean/stddev exists.
    #[error("Insufficient data: at least one tract is required to compute geography statistics")]
    InsufficientData,

    #[error("Record for {found} does not belong to group {expected}")]
    GroupMismatch { expected: GroupKey, found: GroupKey },

    #[error("Group {key} is stored with scheme '{existing}', refusing to add records encoded as '{incoming}'")]
    SchemeConflict {
        key: GroupKey,
        existing: String,
        incoming: String,
    },

    #[error("Unknown income encoding scheme '{name}'")]
    UnknownScheme { name: String },

    #[error("Invalid record for tract {tract_geoid}: {reason}")]
    InvalidRecord { tract_geoid: String, reason: String },

    #[error("Institution '{institution_id}' has no activity in scope")]
    SubjectNotFound { institution_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ClassifyResult<T> = Result<T, ClassifyError>;
