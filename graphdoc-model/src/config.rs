use crate::ModelResult;
use graphdoc_types::RawDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-type collection settings.
///
/// `options` is opaque to the mapping layer; it is carried for whoever
/// creates the collection in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Keep undeclared keys on load and emit them on dump.
    pub allow_extra_fields: bool,
    /// Storage-level collection creation options.
    #[serde(skip_serializing_if = "RawDocument::is_empty")]
    pub options: RawDocument,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            allow_extra_fields: true,
            options: RawDocument::new(),
        }
    }
}

impl CollectionConfig {
    /// Config that drops undeclared keys.
    pub fn strict() -> Self {
        Self {
            allow_extra_fields: false,
            ..Self::default()
        }
    }

    /// Parses a config from JSON, filling unspecified settings with defaults.
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}
