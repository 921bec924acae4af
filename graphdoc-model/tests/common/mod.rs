//! Shared fixtures for record and relation tests.

#![allow(dead_code)]

use graphdoc_model::{FieldDescriptor, RawDocument, RecordType, RelationType};
use serde_json::Value;
use std::sync::{Arc, Once};

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Unwraps a `json!({...})` literal into a raw document.
pub fn doc(value: Value) -> RawDocument {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// `users` collection: required name, optional age, active defaulting to true.
pub fn user_type() -> Arc<RecordType> {
    RecordType::builder("User", "users")
        .field("name", FieldDescriptor::string().required())
        .field("age", FieldDescriptor::integer())
        .field("active", FieldDescriptor::boolean().default(true))
        .member("save")
        .build()
}

/// `follows` edge collection with a `since` year.
pub fn follows_type() -> Arc<RelationType> {
    RelationType::builder("Follows", "follows")
        .field("since", FieldDescriptor::integer())
        .build()
}

/// Stand-in for a database session.
#[derive(Debug)]
pub struct FakeDb {
    pub name: &'static str,
}
