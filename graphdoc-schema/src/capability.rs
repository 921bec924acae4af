//! The load/dump capability handed out by a schema.

use crate::{FieldErrors, Schema};
use graphdoc_types::RawDocument;
use serde_json::Value;

/// Anything a schema can read declared attributes from when dumping.
pub trait AttributeSource {
    /// Current value of an attribute, or `None` when the instance lacks it.
    fn attribute(&self, name: &str) -> Option<Value>;
}

impl AttributeSource for RawDocument {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Result of a load or dump: converted values plus any per-field errors.
///
/// `values` holds every field that converted cleanly even when `errors` is
/// non-empty; callers decide whether partial output is usable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Converted {
    pub values: RawDocument,
    pub errors: FieldErrors,
}

impl Converted {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Values on success, the collected errors otherwise.
    pub fn into_result(self) -> Result<RawDocument, FieldErrors> {
        if self.errors.is_empty() {
            Ok(self.values)
        } else {
            Err(self.errors)
        }
    }
}

/// Stateless converter over a borrowed [`Schema`].
///
/// Cheap to create; a new one is taken for every load or dump.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCapability<'a> {
    name: &'a str,
    schema: &'a Schema,
}

impl<'a> SchemaCapability<'a> {
    pub fn new(name: &'a str, schema: &'a Schema) -> Self {
        Self { name, schema }
    }

    /// Name of the record type this converter serves.
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn schema(&self) -> &Schema {
        self.schema
    }

    /// Converts a raw mapping into validated field values.
    ///
    /// Only declared fields appear in the output. Absent fields fall back to
    /// their default or are omitted.
    pub fn load(&self, raw: &RawDocument) -> Converted {
        let mut errors = FieldErrors::new();
        let values = self.schema.load_fields("", raw, &mut errors);
        Converted { values, errors }
    }

    /// Converts an instance's declared attributes into a raw mapping.
    pub fn dump(&self, source: &dyn AttributeSource) -> Converted {
        let mut errors = FieldErrors::new();
        let values = self.schema.dump_fields("", source, &mut errors);
        Converted { values, errors }
    }
}
