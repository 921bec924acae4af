use crate::capability::AttributeSource;
use crate::field::join_path;
use crate::{FieldDescriptor, FieldErrors, SchemaCapability};
use graphdoc_types::RawDocument;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The merged field mapping of a record type.
///
/// Built once when a type is declared (own fields layered over inherited
/// ones) and read-only afterwards, so it can be shared across concurrent
/// loads and dumps without synchronization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: BTreeMap<String, FieldDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a schema from an ancestor's fields.
    pub fn inherit(parent: &Schema) -> Self {
        parent.clone()
    }

    /// Adds a field, replacing any inherited declaration with the same name.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        self.insert(name, field);
        self
    }

    /// Adds a field and returns the declaration it replaced, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        field: FieldDescriptor,
    ) -> Option<FieldDescriptor> {
        self.fields.insert(name.into(), field)
    }

    /// Layers `other` over this schema; `other` wins on name collisions.
    pub fn extend(&mut self, other: &Schema) {
        self.fields
            .extend(other.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared field names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a converter over this schema, named for error reporting.
    pub fn capability<'a>(&'a self, name: &'a str) -> SchemaCapability<'a> {
        SchemaCapability::new(name, self)
    }

    pub(crate) fn load_fields(
        &self,
        prefix: &str,
        raw: &RawDocument,
        errors: &mut FieldErrors,
    ) -> RawDocument {
        let mut out = RawDocument::new();
        for (name, field) in &self.fields {
            let path = join_path(prefix, name);
            if let Some(value) = field.load(&path, raw.get(name), errors) {
                out.insert(name.clone(), value);
            }
        }
        out
    }

    pub(crate) fn dump_fields(
        &self,
        prefix: &str,
        source: &dyn AttributeSource,
        errors: &mut FieldErrors,
    ) -> RawDocument {
        let mut out = RawDocument::new();
        for (name, field) in &self.fields {
            let path = join_path(prefix, name);
            if let Some(value) = field.dump(&path, source.attribute(name), errors) {
                out.insert(name.clone(), value);
            }
        }
        out
    }
}
