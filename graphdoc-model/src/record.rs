use crate::{ModelError, ModelResult, RecordType};
use graphdoc_schema::{AttributeSource, Converted};
use graphdoc_types::{
    DocumentId, ID_FIELD, ID_SEPARATOR, KEY_FIELD, RawDocument, collection_of, identity_string,
    is_reserved_name,
};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

/// Opaque database/session handle a record can be associated with.
pub type DbHandle = Arc<dyn Any + Send + Sync>;

/// A document of a declared [`RecordType`].
///
/// Declared field values and extra (undeclared) values are kept apart;
/// `_id` is never stored, only derived from the collection and `_key`.
#[derive(Debug, Clone)]
pub struct Record {
    ty: Arc<RecordType>,
    collection: String,
    key: Option<String>,
    fields: RawDocument,
    extras: RawDocument,
    db: Option<Weak<dyn Any + Send + Sync>>,
}

impl Record {
    /// A bare record: every declared field holds its default or `null`.
    pub fn new(ty: &Arc<RecordType>) -> Self {
        let fields = ty
            .fields()
            .iter()
            .filter(|(name, _)| *name != KEY_FIELD)
            .map(|(name, field)| (name.to_string(), field.initial_value()))
            .collect();

        Self {
            ty: Arc::clone(ty),
            collection: ty.collection().to_string(),
            key: None,
            fields,
            extras: RawDocument::new(),
            db: None,
        }
    }

    /// Builds a record directly from values, without schema conversion.
    ///
    /// `_key` sets the key, declared names set fields and anything else is
    /// kept as an extra. Reserved and member names are still rejected.
    pub fn from_values(ty: &Arc<RecordType>, values: RawDocument) -> ModelResult<Self> {
        let mut record = Self::new(ty);
        for (name, value) in values {
            record.set(name, value)?;
        }
        Ok(record)
    }

    /// Overrides the collection this record lives in.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Effective collection, which may differ from the type's own.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn set_collection(&mut self, collection: impl Into<String>) {
        self.collection = collection.into();
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn set_key(&mut self, key: Option<String>) {
        self.key = key;
    }

    /// Derived `collection/key`, absent while the key is unset.
    pub fn id(&self) -> Option<String> {
        self.key
            .as_ref()
            .map(|key| format!("{}{}{}", self.collection, ID_SEPARATOR, key))
    }

    pub fn document_id(&self) -> Option<DocumentId> {
        self.key
            .as_ref()
            .map(|key| DocumentId::new(self.collection.clone(), key.clone()))
    }

    /// Declared field values.
    pub fn fields(&self) -> &RawDocument {
        &self.fields
    }

    /// Undeclared values carried through load and dump unvalidated.
    pub fn extras(&self) -> &RawDocument {
        &self.extras
    }

    /// Looks up a declared field, then an extra.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).or_else(|| self.extras.get(name))
    }

    /// Extract a string value.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Extract an integer value.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Extract a numeric value.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Extract a boolean value.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Assigns a value, refusing names that would shadow reserved or member
    /// names of the type.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> ModelResult<()> {
        let name = name.into();
        self.ty.check_name(&name)?;
        self.assign(name, value.into());
        Ok(())
    }

    /// Removes a declared or extra value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name).or_else(|| self.extras.remove(name))
    }

    /// The database this record was loaded through, if it is still alive.
    pub fn db(&self) -> Option<DbHandle> {
        self.db.as_ref().and_then(Weak::upgrade)
    }

    /// The database handle downcast to a concrete type.
    pub fn db_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.db().and_then(|db| db.downcast::<T>().ok())
    }

    pub fn set_db(&mut self, db: Option<&DbHandle>) {
        self.db = db.map(Arc::downgrade);
    }

    /// Loads `raw` on top of this record's current state.
    pub fn patch(&self, raw: &RawDocument) -> ModelResult<Record> {
        self.ty.load(raw, Some(self), None)
    }

    /// Serializes this record into a raw document for storage.
    ///
    /// Declared fields go through the schema; `_key` is added when set and
    /// never emitted as `null`; extra fields are appended verbatim unless
    /// their name carries the reserved prefix.
    pub fn dump(&self) -> ModelResult<RawDocument> {
        let Converted { mut values, errors } = self.ty.schema().dump(self);
        if !errors.is_empty() {
            warn!(type_name = %self.ty.name(), "dump failed: {}", errors);
            return Err(ModelError::Dump {
                kind: self.ty.kind(),
                type_name: self.ty.name().to_string(),
                errors,
            });
        }

        if !values.contains_key(KEY_FIELD) {
            if let Some(key) = &self.key {
                values.insert(KEY_FIELD.to_string(), Value::String(key.clone()));
            }
        }
        if values.get(KEY_FIELD).is_some_and(Value::is_null) {
            values.remove(KEY_FIELD);
        }

        if self.ty.allows_extra_fields() {
            for (name, value) in &self.extras {
                if values.contains_key(name) || is_reserved_name(name) {
                    continue;
                }
                values.insert(name.clone(), value.clone());
            }
        }

        debug!(
            type_name = %self.ty.name(),
            fields = values.len(),
            "dumped record"
        );
        Ok(values)
    }

    fn assign(&mut self, name: String, value: Value) {
        if name == KEY_FIELD {
            self.key = identity_string(&value);
        } else if self.ty.fields().contains(&name) {
            self.fields.insert(name, value);
        } else {
            self.extras.insert(name, value);
        }
    }

}

impl AttributeSource for Record {
    fn attribute(&self, name: &str) -> Option<Value> {
        if name == KEY_FIELD {
            return Some(self.key.clone().map_or(Value::Null, Value::String));
        }
        self.get(name).cloned()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name()
            && self.collection == other.collection
            && self.key == other.key
            && self.fields == other.fields
            && self.extras == other.extras
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "<{}(_key={})>", self.ty.name(), key),
            None => write!(f, "<{}>", self.ty.name()),
        }
    }
}

impl RecordType {
    /// Creates a record of this type from a raw document.
    ///
    /// With `instance`, the instance's dump is used as a base that `raw`
    /// overlays, so only changed fields need to be supplied. The database
    /// association comes from `db`, else from `instance`; the collection
    /// comes from an `_id` in `raw`, else from `instance`.
    pub fn load(
        self: &Arc<Self>,
        raw: &RawDocument,
        instance: Option<&Record>,
        db: Option<&DbHandle>,
    ) -> ModelResult<Record> {
        let base = instance.map(Record::dump).transpose()?;
        let merged = merge_over(base, raw);
        load_record(self, &merged, instance.map(Inherited::from), db, true)
    }
}

/// State a reload carries over from the instance it patches.
pub(crate) struct Inherited<'a> {
    collection: &'a str,
    db: Option<Weak<dyn Any + Send + Sync>>,
}

impl<'a> From<&'a Record> for Inherited<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            collection: &record.collection,
            db: record.db.clone(),
        }
    }
}

/// Overlays `raw` onto `base`; `raw` wins on shared keys.
pub(crate) fn merge_over(base: Option<RawDocument>, raw: &RawDocument) -> RawDocument {
    match base {
        Some(mut base) => {
            base.extend(raw.iter().map(|(k, v)| (k.clone(), v.clone())));
            base
        }
        None => raw.clone(),
    }
}

/// Shared load sequence for records and relations.
///
/// Relations pass `run_hooks = false` and apply their endpoints afterwards.
pub(crate) fn load_record(
    ty: &Arc<RecordType>,
    raw: &RawDocument,
    inherited: Option<Inherited<'_>>,
    db: Option<&DbHandle>,
    run_hooks: bool,
) -> ModelResult<Record> {
    let Converted { mut values, errors } = ty.schema().load(raw);
    if !errors.is_empty() {
        warn!(type_name = %ty.name(), "load failed: {}", errors);
        return Err(ModelError::Load {
            kind: ty.kind(),
            type_name: ty.name().to_string(),
            errors,
        });
    }

    if ty.allows_extra_fields() {
        for (name, value) in raw {
            if values.contains_key(name) || is_reserved_name(name) {
                continue;
            }
            trace!(type_name = %ty.name(), field = %name, "passing extra field through");
            values.insert(name.clone(), value.clone());
        }
    }

    let mut record = Record::new(ty);
    if let Some(inherited) = inherited {
        record.collection = inherited.collection.to_string();
        record.db = inherited.db;
    }
    if let Some(db) = db {
        record.db = Some(Arc::downgrade(db));
    }

    if run_hooks {
        if let Some(hook) = ty.pre_process_hook() {
            hook.pre_process(&mut record);
        }
    }

    for (name, value) in values {
        if let Err(e) = ty.check_name(&name) {
            warn!(type_name = %ty.name(), field = %name, "naming conflict on load");
            return Err(e);
        }
        record.assign(name, value);
    }

    if record.key.is_none() {
        if let Some(key) = raw.get(KEY_FIELD).and_then(identity_string) {
            record.key = Some(key);
        }
    }

    match raw.get(ID_FIELD) {
        Some(Value::String(id)) => record.collection = collection_of(id).to_string(),
        Some(other) => trace!(type_name = %ty.name(), id = %other, "ignoring non-string _id"),
        None => {}
    }

    if run_hooks {
        if let Some(hook) = ty.post_process_hook() {
            hook.post_process(&mut record);
        }
    }

    debug!(
        type_name = %ty.name(),
        collection = %record.collection,
        fields = record.fields.len(),
        extras = record.extras.len(),
        "loaded record"
    );
    Ok(record)
}
