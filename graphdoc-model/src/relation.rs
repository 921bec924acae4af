//! Graph edges: records that also carry `_from` / `_to` endpoints.
//!
//! Endpoints are identity strings taken verbatim from input; they are never
//! declared, derived or validated. Relation types have no pre/post-process
//! hooks.

use crate::record::{Inherited, load_record, merge_over};
use crate::{
    CollectionConfig, DbHandle, ModelResult, Record, RecordKind, RecordType, RecordTypeBuilder,
};
use graphdoc_schema::{FieldDescriptor, Schema, SchemaCapability};
use graphdoc_types::{FROM_FIELD, RawDocument, TO_FIELD, collection_of, identity_string};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Names a relation reserves. Unlike plain records, `_relations` and the
/// hook names are not reserved, while the endpoint bookkeeping is.
pub const RELATION_SAFE_LIST: &[&str] = &[
    "__collection__",
    "_safe_list",
    "_id",
    "_collections_from",
    "_collections_to",
    "_object_from",
    "_object_to",
    "_index",
    "_collection_config",
    "_fields",
];

/// A declared edge type.
#[derive(Debug)]
pub struct RelationType {
    base: Arc<RecordType>,
}

impl RelationType {
    /// Starts declaring an edge type stored in `collection`.
    pub fn builder(name: impl Into<String>, collection: impl Into<String>) -> RelationTypeBuilder {
        RelationTypeBuilder {
            inner: RecordTypeBuilder::new(
                name.into(),
                collection.into(),
                RecordKind::Relation,
                RELATION_SAFE_LIST,
            ),
        }
    }

    /// The underlying record type every relation record is built on.
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.base
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn collection(&self) -> &str {
        self.base.collection()
    }

    pub fn fields(&self) -> &Schema {
        self.base.fields()
    }

    pub fn schema(&self) -> SchemaCapability<'_> {
        self.base.schema()
    }

    /// Creates a relation from a raw edge document.
    ///
    /// Same sequence as [`RecordType::load`] without hooks; `_from` and `_to`
    /// are then copied from the merged input whenever present.
    pub fn load(
        self: &Arc<Self>,
        raw: &RawDocument,
        instance: Option<&Relation>,
        db: Option<&DbHandle>,
    ) -> ModelResult<Relation> {
        let base = instance.map(Relation::dump).transpose()?;
        let merged = merge_over(base, raw);
        let inherited = instance.map(|rel| Inherited::from(&rel.record));
        let record = load_record(&self.base, &merged, inherited, db, false)?;

        let mut relation = Relation::from_record(self, record);
        if let Some(from) = merged.get(FROM_FIELD) {
            relation.from = identity_string(from);
        }
        if let Some(to) = merged.get(TO_FIELD) {
            relation.to = identity_string(to);
        }
        Ok(relation)
    }
}

/// Declares a [`RelationType`]. Same surface as [`RecordTypeBuilder`]
/// minus hooks.
pub struct RelationTypeBuilder {
    inner: RecordTypeBuilder,
}

impl RelationTypeBuilder {
    /// Inherits fields, member names and config from another edge type.
    pub fn extends(mut self, parent: &RelationType) -> Self {
        self.inner = self.inner.extends(&parent.base);
        self
    }

    pub fn field(mut self, name: impl Into<String>, field: FieldDescriptor) -> Self {
        self.inner = self.inner.field(name, field);
        self
    }

    pub fn fields(mut self, schema: &Schema) -> Self {
        self.inner = self.inner.fields(schema);
        self
    }

    pub fn member(mut self, name: impl Into<String>) -> Self {
        self.inner = self.inner.member(name);
        self
    }

    pub fn config(mut self, config: CollectionConfig) -> Self {
        self.inner = self.inner.config(config);
        self
    }

    pub fn build(self) -> Arc<RelationType> {
        Arc::new(RelationType {
            base: Arc::new(self.inner.without_hooks().into_record_type()),
        })
    }
}

/// An edge document.
#[derive(Debug, Clone)]
pub struct Relation {
    ty: Arc<RelationType>,
    record: Record,
    from: Option<String>,
    to: Option<String>,
    collections_from: Option<Vec<String>>,
    collections_to: Option<Vec<String>>,
    object_from: Option<Arc<Record>>,
    object_to: Option<Arc<Record>>,
}

impl Relation {
    /// A bare relation with no endpoints, constraints or cached objects.
    pub fn new(ty: &Arc<RelationType>) -> Self {
        Self::from_record(ty, Record::new(&ty.base))
    }

    fn from_record(ty: &Arc<RelationType>, record: Record) -> Self {
        Self {
            ty: Arc::clone(ty),
            record,
            from: None,
            to: None,
            collections_from: None,
            collections_to: None,
            object_from: None,
            object_to: None,
        }
    }

    /// Builds a relation directly from values, without schema conversion.
    ///
    /// `_from` / `_to` set the endpoints; everything else is handled as in
    /// [`Record::from_values`].
    pub fn from_values(ty: &Arc<RelationType>, mut values: RawDocument) -> ModelResult<Self> {
        let from = values.remove(FROM_FIELD);
        let to = values.remove(TO_FIELD);
        let record = Record::from_values(&ty.base, values)?;

        let mut relation = Self::from_record(ty, record);
        relation.from = from.as_ref().and_then(identity_string);
        relation.to = to.as_ref().and_then(identity_string);
        Ok(relation)
    }

    /// Restricts which collections the source endpoint may live in.
    pub fn with_collections_from<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections_from = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts which collections the target endpoint may live in.
    pub fn with_collections_to<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collections_to = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_endpoints(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self.to = Some(to.into());
        self
    }

    pub fn relation_type(&self) -> &Arc<RelationType> {
        &self.ty
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    pub fn key(&self) -> Option<&str> {
        self.record.key()
    }

    pub fn id(&self) -> Option<String> {
        self.record.id()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ModelResult<()> {
        self.record.set(name, value)
    }

    /// Source endpoint `_id`.
    pub fn from_id(&self) -> Option<&str> {
        self.from.as_deref()
    }

    /// Target endpoint `_id`.
    pub fn to_id(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn set_from(&mut self, from: Option<String>) {
        self.from = from;
    }

    pub fn set_to(&mut self, to: Option<String>) {
        self.to = to;
    }

    pub fn collections_from(&self) -> Option<&[String]> {
        self.collections_from.as_deref()
    }

    pub fn collections_to(&self) -> Option<&[String]> {
        self.collections_to.as_deref()
    }

    /// Whether a source endpoint in `collection` satisfies the constraint.
    /// No constraint allows everything.
    pub fn allows_from(&self, collection: &str) -> bool {
        allows(self.collections_from.as_deref(), collection)
    }

    /// Whether a target endpoint in `collection` satisfies the constraint.
    pub fn allows_to(&self, collection: &str) -> bool {
        allows(self.collections_to.as_deref(), collection)
    }

    /// Checks both set endpoints against the collection constraints.
    /// Loading never does this; callers opt in before writing.
    pub fn endpoints_allowed(&self) -> bool {
        let from_ok = self
            .from
            .as_deref()
            .is_none_or(|id| self.allows_from(collection_of(id)));
        let to_ok = self
            .to
            .as_deref()
            .is_none_or(|id| self.allows_to(collection_of(id)));
        from_ok && to_ok
    }

    /// Caches the source object and points `_from` at its `_id`.
    pub fn attach_from(&mut self, object: Arc<Record>) {
        self.from = object.id();
        self.object_from = Some(object);
    }

    /// Caches the target object and points `_to` at its `_id`.
    pub fn attach_to(&mut self, object: Arc<Record>) {
        self.to = object.id();
        self.object_to = Some(object);
    }

    /// Cached source object; never persisted.
    pub fn object_from(&self) -> Option<&Arc<Record>> {
        self.object_from.as_ref()
    }

    /// Cached target object; never persisted.
    pub fn object_to(&self) -> Option<&Arc<Record>> {
        self.object_to.as_ref()
    }

    /// Loads `raw` on top of this relation's current state.
    pub fn patch(&self, raw: &RawDocument) -> ModelResult<Relation> {
        self.ty.load(raw, Some(self), None)
    }

    /// Serializes the edge: the record dump plus any set endpoints.
    pub fn dump(&self) -> ModelResult<RawDocument> {
        let mut data = self.record.dump()?;
        if let Some(from) = &self.from {
            data.entry(FROM_FIELD)
                .or_insert_with(|| Value::String(from.clone()));
        }
        if let Some(to) = &self.to {
            data.entry(TO_FIELD)
                .or_insert_with(|| Value::String(to.clone()));
        }
        Ok(data)
    }
}

fn allows(constraint: Option<&[String]>, collection: &str) -> bool {
    constraint.is_none_or(|allowed| allowed.iter().any(|c| c == collection))
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.record == other.record && self.from == other.from && self.to == other.to
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(key) = self.record.key() {
            parts.push(format!("_key={key}"));
        }
        if let (Some(from), Some(to)) = (&self.from, &self.to) {
            parts.push(format!("_from={from}, _to={to}"));
        }
        write!(f, "<{}({})>", self.ty.name(), parts.join(", "))
    }
}
