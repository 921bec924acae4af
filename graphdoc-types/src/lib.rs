//! Core identity types for graphdoc.
//!
//! This crate defines the plumbing every record shape shares:
//! - [`DocumentId`]: a collection-qualified identity (`collection/key`)
//! - The reserved identity attribute names (`_key`, `_id`, `_from`, `_to`)
//! - [`RawDocument`]: the database-native mapping records are loaded from
//!   and dumped to
//!
//! Nothing here knows about schemas or record types; those live in
//! `graphdoc-schema` and `graphdoc-model`.

mod fields;
mod ids;

pub use fields::{
    FROM_FIELD, ID_FIELD, ID_SEPARATOR, KEY_FIELD, RESERVED_PREFIX, TO_FIELD, identity_string,
    is_reserved_name,
};
pub use ids::{DocumentId, collection_of};

/// A raw document as handed to or received from the storage layer.
pub type RawDocument = serde_json::Map<String, serde_json::Value>;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in identity operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid document id '{0}': expected '<collection>/<key>'")]
    InvalidDocumentId(String),
}
