//! Schema propagation invariants
//!
//! - Subscribing copies every schema column with a matching domain
//! - Columns added to the schema later reach every live subscriber
//! - Columns added to a subscriber never reach the schema or its siblings
//! - A same-named column with a different domain is a conflict

use std::sync::Arc;

use easyindex::{Column, DomainKind, Schema, Slicer, SlicerErrorCode, TypeTag};
use serde_json::json;
use tempfile::TempDir;

fn source() -> Slicer<String> {
    let store = Slicer::new();
    store.add_col("numerical", Column::new(TypeTag::Float)).unwrap();
    store
        .add_col("list_prop", Column::new(DomainKind::enumerated(0..6)))
        .unwrap();
    store
        .add("a".to_string(), [("numerical", json!(1.5)), ("list_prop", json!(3))])
        .unwrap();
    store
}

// =============================================================================
// Export and subscription
// =============================================================================

#[test]
fn test_subscriber_gets_matching_domains() {
    let schema = source().schema();
    let target = Arc::new(Slicer::<String>::new());
    schema.subscribe(&[&target]).unwrap();

    let src = source();
    for name in ["numerical", "list_prop"] {
        let copied = target.get_column(name).unwrap();
        assert_eq!(copied.domain(), src.get_column(name).unwrap().domain());
        assert!(copied.is_empty(), "attributes must not be copied");
    }
}

#[test]
fn test_subscriber_columns_keep_mandatory_flag() {
    let schema = source().schema();
    let target = Arc::new(Slicer::<String>::new());
    schema.subscribe(&[&target]).unwrap();

    let err = target
        .add("b".to_string(), [("list_prop", json!(1))])
        .unwrap_err();
    assert_eq!(err.code(), SlicerErrorCode::PropertyMissing);
    assert_eq!(err.column(), Some("numerical"));
}

#[test]
fn test_subscribe_many_stores_at_once() {
    let schema = source().schema();
    let stores: Vec<Arc<Slicer<String>>> = (0..3).map(|_| Arc::new(Slicer::new())).collect();
    let refs: Vec<&Arc<Slicer<String>>> = stores.iter().collect();
    schema.subscribe(&refs).unwrap();

    for store in &stores {
        assert_eq!(store.column_names(), vec!["list_prop", "numerical"]);
    }
    assert_eq!(schema.subscriber_count(), 3);
}

#[test]
fn test_conflicting_domain_rejected() {
    let schema = source().schema();
    let target = Arc::new(Slicer::<String>::new());
    target
        .add_col("list_prop", Column::new(DomainKind::enumerated(0..3)))
        .unwrap();

    let err = schema.subscribe(&[&target]).unwrap_err();
    assert_eq!(err.code(), SlicerErrorCode::Conflict);
}

// =============================================================================
// Propagation direction
// =============================================================================

#[test]
fn test_late_schema_column_reaches_subscribers() {
    let schema = source().schema();
    let a = Arc::new(Slicer::<String>::new());
    let b = Arc::new(Slicer::<String>::new());
    schema.subscribe(&[&a]).unwrap();

    schema
        .add_col("even", Column::new(TypeTag::Bool).with_null_default())
        .unwrap();
    schema.subscribe(&[&b]).unwrap();

    assert!(a.get_column("even").is_some());
    assert!(b.get_column("even").is_some());
}

#[test]
fn test_subscriber_column_stays_local() {
    let schema = source().schema();
    let a = Arc::new(Slicer::<String>::new());
    let b = Arc::new(Slicer::<String>::new());
    schema.subscribe(&[&a, &b]).unwrap();

    a.add_col("local", Column::unconstrained()).unwrap();

    assert!(!schema.contains("local"));
    assert!(b.get_column("local").is_none());
    assert_eq!(schema.len(), 2);
}

#[test]
fn test_export_is_independent_of_source() {
    let store = source();
    let schema = store.schema();
    store.add_col("after_export", Column::unconstrained()).unwrap();
    assert!(!schema.contains("after_export"));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_saved_schema_subscribes_like_original() {
    let tmp = TempDir::new().unwrap();
    source().schema().save(tmp.path()).unwrap();

    let reopened: Schema<String> = Schema::open(tmp.path()).unwrap();
    let target = Arc::new(Slicer::new());
    reopened.subscribe(&[&target]).unwrap();

    assert_eq!(target.column_names(), vec!["list_prop", "numerical"]);
    // Reopened columns store null when a value is omitted
    let id = target.insert("x".to_string()).unwrap();
    assert_eq!(target.get_obj_meta(id)["numerical"], serde_json::Value::Null);
}
