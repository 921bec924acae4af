//! Record and relation mapping for graphdoc.
//!
//! Maps database-native documents to typed records and back:
//! - [`RecordType`]: an explicitly declared record type (collection, merged
//!   schema, reserved and member names, config, optional hooks)
//! - [`Record`]: a plain collection document holding identity, declared field
//!   values and an open-ended bag of extra fields
//! - [`RelationType`] / [`Relation`]: graph edges, records that also carry
//!   `_from` / `_to` endpoint identifiers
//! - [`PreProcess`] / [`PostProcess`]: optional hooks a record type can run
//!   around loading
//!
//! Every operation here is an in-memory transformation. The database handle
//! attached to a record is stored and forwarded, never called.

mod config;
mod error;
mod hooks;
mod record;
mod record_type;
mod relation;

pub use config::CollectionConfig;
pub use error::{ModelError, ModelResult, RecordKind};
pub use hooks::{PostProcess, PreProcess};
pub use record::{DbHandle, Record};
pub use record_type::{RECORD_MEMBERS, RECORD_SAFE_LIST, RecordType, RecordTypeBuilder};
pub use relation::{RELATION_SAFE_LIST, Relation, RelationType, RelationTypeBuilder};

pub use graphdoc_schema::{FieldDescriptor, FieldErrors, FieldKind, Rule, Schema};
pub use graphdoc_types::{DocumentId, RawDocument};
