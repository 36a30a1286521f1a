//! Error types for INSERT generation.

use thiserror::Error;

/// Errors raised while describing a record type or reading its fields.
///
/// Both construction-time variants are fatal: no partial statement is ever
/// produced once one of them is returned.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The record type metadata cannot be used (missing or unregistered type
    /// name, duplicate fields, unknown generation strategy, ...).
    #[error("invalid record type: {0}")]
    InvalidRecordType(String),

    /// A field value could not be read off the given record instance.
    #[error("cannot read field '{field}': {reason}")]
    FieldAccessDenied {
        /// Name of the field that could not be read.
        field: String,
        /// Why the read failed.
        reason: String,
    },

    /// Registry or record JSON could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl PersistError {
    pub(crate) fn invalid_type(reason: impl Into<String>) -> Self {
        Self::InvalidRecordType(reason.into())
    }

    pub(crate) fn access_denied(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FieldAccessDenied {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for INSERT generation.
pub type Result<T> = std::result::Result<T, PersistError>;
