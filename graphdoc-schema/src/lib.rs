//! Field schema registry for graphdoc.
//!
//! Record types declare their fields explicitly; this crate holds what those
//! declarations turn into:
//! - [`FieldDescriptor`]: a declared field's kind, default and validation rules
//! - [`Schema`]: the merged name → descriptor mapping of a record type,
//!   own declarations overriding inherited ones
//! - [`SchemaCapability`]: a transient converter borrowed from a schema that
//!   turns raw mappings into validated values and instances back into raw
//!   mappings
//! - [`FieldErrors`]: per-field failures collected during a conversion
//!
//! Conversion never fails fast: every field is visited and every problem is
//! recorded, leaving the caller to decide whether a non-empty error set is
//! fatal.

mod capability;
mod error;
mod field;
mod schema;

pub use capability::{AttributeSource, Converted, SchemaCapability};
pub use error::FieldErrors;
pub use field::{FieldDescriptor, FieldKind, Rule};
pub use schema::Schema;
