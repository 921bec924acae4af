//! Error types for record mapping.

use graphdoc_schema::FieldErrors;
use std::fmt;
use thiserror::Error;

/// Result type for record operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// The two document shapes a record type can map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Plain document in a document collection.
    Collection,
    /// Graph edge carrying `_from` / `_to`.
    Relation,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Collection => write!(f, "collection"),
            RecordKind::Relation => write!(f, "relation"),
        }
    }
}

/// Errors that can occur while loading or dumping records.
///
/// All of them are fatal: no partially populated record is ever returned.
#[derive(Debug, Error)]
pub enum ModelError {
    /// One or more declared fields failed conversion on load.
    #[error("error loading object of {kind} {type_name} - {errors}")]
    Load {
        kind: RecordKind,
        type_name: String,
        errors: FieldErrors,
    },

    /// One or more declared fields failed conversion on dump.
    #[error("error dumping object of {kind} {type_name} - {errors}")]
    Dump {
        kind: RecordKind,
        type_name: String,
        errors: FieldErrors,
    },

    /// A field or extra key collides with a reserved or member name.
    #[error("{member} is already a member of {type_name} instance and cannot be overwritten")]
    MemberExists { member: String, type_name: String },

    /// Malformed collection configuration.
    #[error("invalid collection config: {0}")]
    Config(#[from] serde_json::Error),
}

impl ModelError {
    /// Per-field errors behind a load or dump failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ModelError::Load { errors, .. } | ModelError::Dump { errors, .. } => Some(errors),
            _ => None,
        }
    }
}
