//! Collection-qualified document identifiers.
//!
//! An `_id` is always derived as `collection + "/" + key`; it is never
//! stored independently of the key it was built from.

use crate::{Error, ID_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a document within a database: `collection/key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId {
    collection: String,
    key: String,
}

impl DocumentId {
    /// Builds an identity from its two halves.
    #[must_use]
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Returns the collection half.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the key half.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Parses a strict `collection/key` string.
    ///
    /// Both halves must be non-empty. The key may itself not contain the
    /// separator.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s.split_once(ID_SEPARATOR) {
            Some((collection, key))
                if !collection.is_empty() && !key.is_empty() && !key.contains(ID_SEPARATOR) =>
            {
                Ok(Self::new(collection, key))
            }
            _ => Err(Error::InvalidDocumentId(s.to_string())),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.collection, ID_SEPARATOR, self.key)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.to_string()
    }
}

/// Returns the collection prefix of a raw `_id` string.
///
/// Lenient: an id without a separator is returned whole, matching how
/// loaders treat caller-supplied ids they do not validate.
#[must_use]
pub fn collection_of(id: &str) -> &str {
    id.split(ID_SEPARATOR).next().unwrap_or(id)
}
