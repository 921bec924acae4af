//! Explicit record type declarations.
//!
//! A [`RecordType`] is built once through [`RecordTypeBuilder`] and shared
//! behind an `Arc`. Inheritance is explicit composition: a child copies its
//! parent's schema, member names, config and hooks, then layers its own
//! declarations on top.

use crate::{CollectionConfig, ModelError, ModelResult, PostProcess, PreProcess, RecordKind};
use graphdoc_schema::{FieldDescriptor, Schema, SchemaCapability};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Names a plain record reserves for its own bookkeeping. Loading a value
/// under any of these is a naming conflict.
pub const RECORD_SAFE_LIST: &[&str] = &[
    "__collection__",
    "_safe_list",
    "_relations",
    "_id",
    "_index",
    "_collection_config",
    "_post_process",
    "_pre_process",
    "_fields_info",
    "_fields",
];

/// Callable members every record type exposes.
pub const RECORD_MEMBERS: &[&str] = &["schema", "_load", "_dump"];

/// A declared record type.
pub struct RecordType {
    name: String,
    schema_name: String,
    collection: String,
    kind: RecordKind,
    schema: Schema,
    safe_list: BTreeSet<String>,
    members: BTreeSet<String>,
    config: CollectionConfig,
    pre_process: Option<Arc<dyn PreProcess>>,
    post_process: Option<Arc<dyn PostProcess>>,
}

impl RecordType {
    /// Starts declaring a plain collection record type.
    pub fn builder(name: impl Into<String>, collection: impl Into<String>) -> RecordTypeBuilder {
        RecordTypeBuilder::new(
            name.into(),
            collection.into(),
            RecordKind::Collection,
            RECORD_SAFE_LIST,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection this type is bound to. Individual records may override it.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// The merged field declarations (own + inherited).
    pub fn fields(&self) -> &Schema {
        &self.schema
    }

    /// A fresh load/dump converter over this type's fields.
    pub fn schema(&self) -> SchemaCapability<'_> {
        self.schema.capability(&self.schema_name)
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn allows_extra_fields(&self) -> bool {
        self.config.allow_extra_fields
    }

    pub fn safe_list(&self) -> impl Iterator<Item = &str> {
        self.safe_list.iter().map(String::as_str)
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    /// True when assigning `name` would shadow a reserved or member name.
    pub fn conflicts_with(&self, name: &str) -> bool {
        self.safe_list.contains(name) || self.members.contains(name)
    }

    pub(crate) fn check_name(&self, name: &str) -> ModelResult<()> {
        if self.conflicts_with(name) {
            return Err(ModelError::MemberExists {
                member: name.to_string(),
                type_name: self.name.clone(),
            });
        }
        Ok(())
    }

    pub(crate) fn pre_process_hook(&self) -> Option<&Arc<dyn PreProcess>> {
        self.pre_process.as_ref()
    }

    pub(crate) fn post_process_hook(&self) -> Option<&Arc<dyn PostProcess>> {
        self.post_process.as_ref()
    }

    pub fn has_pre_process(&self) -> bool {
        self.pre_process.is_some()
    }

    pub fn has_post_process(&self) -> bool {
        self.post_process.is_some()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("collection", &self.collection)
            .field("kind", &self.kind)
            .field("fields", &self.schema.names().collect::<Vec<_>>())
            .field("members", &self.members)
            .field("config", &self.config)
            .field("pre_process", &self.pre_process.is_some())
            .field("post_process", &self.post_process.is_some())
            .finish()
    }
}

/// Declares a [`RecordType`].
///
/// Own declarations always win over inherited ones regardless of call order.
pub struct RecordTypeBuilder {
    name: String,
    collection: String,
    kind: RecordKind,
    safe_list: &'static [&'static str],
    inherited: Schema,
    own: Schema,
    members: BTreeSet<String>,
    inherited_config: Option<CollectionConfig>,
    config: Option<CollectionConfig>,
    inherited_pre: Option<Arc<dyn PreProcess>>,
    inherited_post: Option<Arc<dyn PostProcess>>,
    pre_process: Option<Arc<dyn PreProcess>>,
    post_process: Option<Arc<dyn PostProcess>>,
}

impl RecordTypeBuilder {
    pub(crate) fn new(
        name: String,
        collection: String,
        kind: RecordKind,
        safe_list: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            collection,
            kind,
            safe_list,
            inherited: Schema::new(),
            own: Schema::new(),
            members: RECORD_MEMBERS.iter().map(|m| m.to_string()).collect(),
            inherited_config: None,
            config: None,
            inherited_pre: None,
            inherited_post: None,
            pre_process: None,
            post_process: None,
        }
    }

    /// Inherits fields, member names, config and hooks from `parent`.
    ///
    /// With several parents, later ones win over earlier ones.
    pub fn extends(mut self, parent: &RecordType) -> Self {
        self.inherited.extend(&parent.schema);
        self.members.extend(parent.members.iter().cloned());
        self.inherited_config = Some(parent.config.clone());
        if let Some(hook) = &parent.pre_process {
            self.inherited_pre = Some(Arc::clone(hook));
        }
        if let Some(hook) = &parent.post_process {
            self.inherited_post = Some(Arc::clone(hook));
        }
        self
    }

    /// Declares a field.
    pub fn field(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        self.own.insert(name, field);
        self
    }

    /// Declares every field of `schema`.
    pub fn fields(mut self, schema: &Schema) -> Self {
        self.own.extend(schema);
        self
    }

    /// Registers a callable member name that loaded data may not shadow.
    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.members.insert(name.into());
        self
    }

    pub fn config(mut self, config: CollectionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn pre_process(mut self, hook: impl PreProcess + 'static) -> Self {
        self.pre_process = Some(Arc::new(hook));
        self
    }

    pub fn post_process(mut self, hook: impl PostProcess + 'static) -> Self {
        self.post_process = Some(Arc::new(hook));
        self
    }

    pub(crate) fn without_hooks(mut self) -> Self {
        self.inherited_pre = None;
        self.inherited_post = None;
        self.pre_process = None;
        self.post_process = None;
        self
    }

    pub(crate) fn into_record_type(self) -> RecordType {
        let mut schema = self.inherited;
        schema.extend(&self.own);

        RecordType {
            schema_name: format!("{}Schema", self.name),
            name: self.name,
            collection: self.collection,
            kind: self.kind,
            schema,
            safe_list: self.safe_list.iter().map(|s| s.to_string()).collect(),
            members: self.members,
            config: self
                .config
                .or(self.inherited_config)
                .unwrap_or_default(),
            pre_process: self.pre_process.or(self.inherited_pre),
            post_process: self.post_process.or(self.inherited_post),
        }
    }

    pub fn build(self) -> Arc<RecordType> {
        Arc::new(self.into_record_type())
    }
}
