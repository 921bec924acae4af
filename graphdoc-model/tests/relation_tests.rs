mod common;

use common::{FakeDb, doc, follows_type, init_tracing, user_type};
use graphdoc_model::{
    CollectionConfig, DbHandle, FieldDescriptor, ModelError, RELATION_SAFE_LIST, RawDocument,
    Record, RecordKind, Relation, RelationType,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;

// ── Endpoints ────────────────────────────────────────────────────

#[test]
fn endpoints_pass_through_load_and_dump() {
    init_tracing();
    let ty = follows_type();
    let rel = ty
        .load(
            &doc(json!({"_from": "users/1", "_to": "users/2", "since": 2020})),
            None,
            None,
        )
        .unwrap();
    assert_eq!(rel.from_id(), Some("users/1"));
    assert_eq!(rel.to_id(), Some("users/2"));
    assert_eq!(
        rel.dump().unwrap(),
        doc(json!({"_from": "users/1", "_to": "users/2", "since": 2020}))
    );
}

#[test]
fn missing_endpoints_are_not_dumped() {
    let ty = follows_type();
    let rel = ty.load(&RawDocument::new(), None, None).unwrap();
    assert_eq!(rel.from_id(), None);
    assert_eq!(rel.to_id(), None);
    let out = rel.dump().unwrap();
    assert!(!out.contains_key("_from"));
    assert!(!out.contains_key("_to"));
    assert_eq!(out, doc(json!({"since": null})));
}

#[test]
fn endpoints_are_not_validated() {
    let ty = follows_type();
    let rel = ty
        .load(&doc(json!({"_from": "no-separator", "_to": 7})), None, None)
        .unwrap();
    assert_eq!(rel.from_id(), Some("no-separator"));
    assert_eq!(rel.to_id(), Some("7"));
}

#[test]
fn endpoints_never_become_extras() {
    let ty = follows_type();
    let rel = ty
        .load(&doc(json!({"_from": "users/1", "_to": "users/2"})), None, None)
        .unwrap();
    assert!(rel.record().extras().is_empty());
    assert_eq!(rel.get("_from"), None);
}

#[test]
fn key_and_identity_work_like_records() {
    let ty = follows_type();
    let rel = ty
        .load(
            &doc(json!({"_key": "e1", "_from": "users/1", "_to": "users/2"})),
            None,
            None,
        )
        .unwrap();
    assert_eq!(rel.key(), Some("e1"));
    assert_eq!(rel.id(), Some("follows/e1".to_string()));

    let moved = ty
        .load(&doc(json!({"_id": "old_follows/e1", "_key": "e1"})), None, None)
        .unwrap();
    assert_eq!(moved.id(), Some("old_follows/e1".to_string()));
}

#[test]
fn extra_fields_survive_on_edges() {
    let ty = follows_type();
    let rel = ty
        .load(
            &doc(json!({"_from": "users/1", "_to": "users/2", "weight": 0.5})),
            None,
            None,
        )
        .unwrap();
    assert_eq!(rel.dump().unwrap()["weight"], json!(0.5));
}

// ── Errors ───────────────────────────────────────────────────────

#[test]
fn load_error_names_relation_kind() {
    let ty = follows_type();
    let err = ty
        .load(&doc(json!({"_from": "users/1", "since": "long ago"})), None, None)
        .unwrap_err();
    assert!(matches!(
        err,
        ModelError::Load { kind: RecordKind::Relation, ref type_name, .. } if type_name == "Follows"
    ));
    assert_eq!(
        err.to_string(),
        "error loading object of relation Follows - since: Not a valid integer."
    );
}

#[test]
fn relation_reserves_its_own_names() {
    let ty = follows_type();
    for name in RELATION_SAFE_LIST {
        assert!(ty.record_type().conflicts_with(name), "{name} should be reserved");
    }

    let mut rel = Relation::new(&ty);
    assert!(rel.set("_object_from", 1).is_err());
    assert!(rel.set("_collections_to", 1).is_err());
    // Plain records reserve these, edges do not.
    rel.set("_relations", 1).unwrap();
    rel.set("_pre_process", 1).unwrap();

    let mut record = Record::new(&user_type());
    assert!(record.set("_relations", 1).is_err());
}

#[test]
fn relation_types_have_no_hooks() {
    let ty = follows_type();
    assert!(!ty.record_type().has_pre_process());
    assert!(!ty.record_type().has_post_process());
    assert_eq!(ty.record_type().kind(), RecordKind::Relation);
    assert_eq!(ty.schema().name(), "FollowsSchema");
}

// ── from_values ──────────────────────────────────────────────────

#[test]
fn from_values_splits_endpoints() {
    let ty = follows_type();
    let rel = Relation::from_values(
        &ty,
        doc(json!({"_key": "e1", "_from": "users/1", "_to": "users/2", "since": 2001})),
    )
    .unwrap();
    assert_eq!(rel.key(), Some("e1"));
    assert_eq!(rel.from_id(), Some("users/1"));
    assert_eq!(rel.to_id(), Some("users/2"));
    assert_eq!(rel.get("since"), Some(&json!(2001)));
    assert!(rel.record().extras().is_empty());
}

#[test]
fn with_endpoints_sets_both() {
    let ty = follows_type();
    let rel = Relation::new(&ty).with_endpoints("users/1", "groups/9");
    assert_eq!(rel.from_id(), Some("users/1"));
    assert_eq!(rel.to_id(), Some("groups/9"));
}

// ── Patch semantics ──────────────────────────────────────────────

#[test]
fn patch_keeps_endpoints() {
    let ty = follows_type();
    let existing = ty
        .load(
            &doc(json!({"_key": "e1", "_from": "users/1", "_to": "users/2", "since": 2020})),
            None,
            None,
        )
        .unwrap();
    let patched = existing.patch(&doc(json!({"since": 2021}))).unwrap();

    let mut expected = existing.clone();
    expected.set("since", 2021).unwrap();
    assert_eq!(patched, expected);
    assert_eq!(patched.from_id(), Some("users/1"));
    assert_eq!(patched.to_id(), Some("users/2"));
}

#[test]
fn patch_can_move_an_endpoint() {
    let ty = follows_type();
    let existing = ty
        .load(&doc(json!({"_from": "users/1", "_to": "users/2"})), None, None)
        .unwrap();
    let patched = existing.patch(&doc(json!({"_to": "users/3"}))).unwrap();
    assert_eq!(patched.from_id(), Some("users/1"));
    assert_eq!(patched.to_id(), Some("users/3"));
}

#[test]
fn patch_keeps_db_association() {
    let ty = follows_type();
    let db: DbHandle = Arc::new(FakeDb { name: "graph" });
    let existing = ty
        .load(&doc(json!({"_from": "users/1", "_to": "users/2"})), None, Some(&db))
        .unwrap();
    let patched = existing.patch(&doc(json!({"since": 1}))).unwrap();
    assert_eq!(patched.record().db_as::<FakeDb>().unwrap().name, "graph");
}

// ── Collection constraints ───────────────────────────────────────

#[test]
fn unconstrained_relation_allows_anything() {
    let rel = Relation::new(&follows_type()).with_endpoints("a/1", "b/2");
    assert_eq!(rel.collections_from(), None);
    assert!(rel.allows_from("anything"));
    assert!(rel.allows_to("anything"));
    assert!(rel.endpoints_allowed());
}

#[test]
fn constraints_check_endpoint_collections() {
    let rel = Relation::new(&follows_type())
        .with_collections_from(["users"])
        .with_collections_to(vec!["users".to_string(), "groups".to_string()]);

    assert_eq!(rel.collections_from(), Some(&["users".to_string()][..]));
    assert!(rel.allows_from("users"));
    assert!(!rel.allows_from("groups"));
    assert!(rel.allows_to("groups"));

    assert!(rel.clone().with_endpoints("users/1", "groups/2").endpoints_allowed());
    assert!(!rel.clone().with_endpoints("groups/1", "users/2").endpoints_allowed());
    // Unset endpoints are not checked.
    assert!(rel.endpoints_allowed());
}

#[test]
fn constraints_are_not_enforced_on_load() {
    let ty = follows_type();
    let rel = ty
        .load(&doc(json!({"_from": "groups/1", "_to": "users/2"})), None, None)
        .unwrap()
        .with_collections_from(["users"]);
    assert_eq!(rel.from_id(), Some("groups/1"));
    assert!(!rel.endpoints_allowed());
}

// ── Endpoint objects ─────────────────────────────────────────────

#[test]
fn attach_points_endpoints_at_objects() {
    let users = user_type();
    let alice = Arc::new(
        users
            .load(&doc(json!({"_key": "alice", "name": "Alice"})), None, None)
            .unwrap(),
    );
    let bob = Arc::new(
        users
            .load(&doc(json!({"_key": "bob", "name": "Bob"})), None, None)
            .unwrap(),
    );

    let mut rel = Relation::new(&follows_type());
    rel.attach_from(Arc::clone(&alice));
    rel.attach_to(Arc::clone(&bob));

    assert_eq!(rel.from_id(), Some("users/alice"));
    assert_eq!(rel.to_id(), Some("users/bob"));
    assert_eq!(rel.object_from().unwrap().get_str("name"), Some("Alice"));
    assert_eq!(rel.object_to().unwrap().key(), Some("bob"));

    let out = rel.dump().unwrap();
    assert_eq!(out["_from"], json!("users/alice"));
    assert!(!out.contains_key("_object_from"));
}

#[test]
fn attaching_unsaved_object_clears_endpoint() {
    let unsaved = Arc::new(Record::new(&user_type()));
    let mut rel = Relation::new(&follows_type()).with_endpoints("users/1", "users/2");
    rel.attach_from(unsaved);
    assert_eq!(rel.from_id(), None);
    assert!(rel.object_from().is_some());
}

// ── Type declaration ─────────────────────────────────────────────

#[test]
fn relation_type_extends_parent() {
    let base = follows_type();
    let child = RelationType::builder("CloseFollows", "close_follows")
        .extends(&base)
        .field("rank", FieldDescriptor::integer().required())
        .member("promote")
        .config(CollectionConfig::strict())
        .build();

    assert_eq!(child.collection(), "close_follows");
    assert!(child.fields().contains("since"));
    assert!(child.fields().contains("rank"));
    assert!(child.record_type().is_member("promote"));

    let rel = child
        .load(
            &doc(json!({"_from": "users/1", "_to": "users/2", "rank": 1, "note": "x"})),
            None,
            None,
        )
        .unwrap();
    assert!(rel.record().extras().is_empty());
    assert_eq!(
        rel.dump().unwrap(),
        doc(json!({"_from": "users/1", "_to": "users/2", "rank": 1, "since": null}))
    );
}

// ── Display ──────────────────────────────────────────────────────

#[test]
fn display_shows_key_and_endpoints() {
    let ty = follows_type();
    let rel = ty
        .load(
            &doc(json!({"_key": "e1", "_from": "users/1", "_to": "users/2"})),
            None,
            None,
        )
        .unwrap();
    assert_eq!(rel.to_string(), "<Follows(_key=e1, _from=users/1, _to=users/2)>");

    let bare = Relation::new(&ty);
    assert_eq!(bare.to_string(), "<Follows()>");
}

#[test]
fn into_record_drops_endpoints() {
    let ty = follows_type();
    let rel = Relation::new(&ty).with_endpoints("users/1", "users/2");
    let record = rel.into_record();
    assert_eq!(record.type_name(), "Follows");
    assert_eq!(record.dump().unwrap().get("_from"), None::<&Value>);
}
