use graphdoc_model::{CollectionConfig, ModelError, RecordType};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn default_keeps_extra_fields() {
    let config = CollectionConfig::default();
    assert!(config.allow_extra_fields);
    assert!(config.options.is_empty());
}

#[test]
fn strict_drops_extra_fields() {
    assert!(!CollectionConfig::strict().allow_extra_fields);
}

#[test]
fn from_json_fills_missing_settings() {
    let config = CollectionConfig::from_json_str(r#"{"options": {"waitForSync": true}}"#).unwrap();
    assert!(config.allow_extra_fields);
    assert_eq!(config.options.get("waitForSync"), Some(&json!(true)));

    let empty = CollectionConfig::from_json_str("{}").unwrap();
    assert_eq!(empty, CollectionConfig::default());
}

#[test]
fn from_json_reads_extra_field_switch() {
    let config = CollectionConfig::from_json_str(r#"{"allow_extra_fields": false}"#).unwrap();
    assert_eq!(config, CollectionConfig::strict());
}

#[test]
fn from_json_rejects_malformed_input() {
    let err =
        CollectionConfig::from_json_str(r#"{"allow_extra_fields": "sometimes"}"#).unwrap_err();
    assert!(matches!(err, ModelError::Config(_)));
    assert!(err.to_string().starts_with("invalid collection config"));

    assert!(CollectionConfig::from_json_str("not json").is_err());
}

#[test]
fn options_are_serialized_only_when_set() {
    let bare = serde_json::to_value(CollectionConfig::default()).unwrap();
    assert_eq!(bare, json!({"allow_extra_fields": true}));

    let with_options = CollectionConfig::strict()
        .with_option("type", "edge")
        .with_option("replicationFactor", 2);
    assert_eq!(
        serde_json::to_value(&with_options).unwrap(),
        json!({
            "allow_extra_fields": false,
            "options": {"type": "edge", "replicationFactor": 2}
        })
    );
}

#[test]
fn record_type_carries_config() {
    let ty = RecordType::builder("Log", "logs")
        .config(CollectionConfig::default().with_option("journalSize", 1024))
        .build();
    assert!(ty.allows_extra_fields());
    assert_eq!(ty.config().options["journalSize"], json!(1024));

    let plain = RecordType::builder("Plain", "plain").build();
    assert_eq!(plain.config(), &CollectionConfig::default());
}
