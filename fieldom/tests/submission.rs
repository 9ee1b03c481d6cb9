//! Submission handler tests over the in-memory stores: validate-then-persist,
//! atomicity of rejection, idempotent resubmission, and the storage
//! conventions the rest of the backend relies on.

use std::collections::BTreeMap;

use fieldom::{
    EngineError, EntityType, FieldDefinition, FieldScope, FieldType, MemoryCatalog,
    MemoryValueStore, SubmissionOutcome, submit, submitted_values,
};

fn scope() -> FieldScope {
    FieldScope::new(EntityType::GroupMembership, "g1")
}

/// The worked example: a required text field and an optional dropdown.
fn example_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();
    catalog.add_field(FieldDefinition::new("f1", &scope(), "Full name", FieldType::Text).required());
    catalog.add_field(
        FieldDefinition::new("f2", &scope(), "Size", FieldType::Dropdown).with_options("A,B,C"),
    );
    catalog
}

fn body(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn rejects_empty_required_field() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();

    let outcome = submit(&mut catalog, &mut store, &scope(), "app1", &body(&[("f1", "")]))
        .await
        .unwrap();

    match outcome {
        SubmissionOutcome::Rejected { errors } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors["f1"], "required");
        }
        SubmissionOutcome::Accepted { .. } => panic!("expected Rejected branch, got Accepted"),
    }
    assert!(store.is_empty(), "a rejected submission must write nothing");
}

#[tokio::test]
async fn rejects_value_outside_dropdown_options() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();

    let outcome = submit(
        &mut catalog,
        &mut store,
        &scope(),
        "app1",
        &body(&[("f1", "Nguyen Van A"), ("f2", "D")]),
    )
    .await
    .unwrap();

    match outcome {
        SubmissionOutcome::Rejected { errors } => {
            assert_eq!(errors["f2"], "invalid option");
            assert!(!errors.contains_key("f1"), "valid fields carry no error entry");
        }
        SubmissionOutcome::Accepted { .. } => panic!("expected Rejected branch, got Accepted"),
    }
    assert!(store.is_empty());
}

#[tokio::test]
async fn accepts_and_round_trips_valid_submission() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();

    let outcome = submit(
        &mut catalog,
        &mut store,
        &scope(),
        "app1",
        &body(&[("f1", "Nguyen Van A"), ("f2", "B")]),
    )
    .await
    .unwrap();
    assert!(outcome.is_accepted());

    let view = submitted_values(&mut catalog, &mut store, &scope(), "app1")
        .await
        .unwrap();
    let by_id: BTreeMap<&str, _> = view
        .untabbed
        .iter()
        .map(|entry| (entry.field.id.as_str(), entry))
        .collect();

    assert_eq!(by_id["f1"].value.as_deref(), Some("Nguyen Van A"));
    assert!(by_id["f1"].has_value);
    assert_eq!(by_id["f2"].value.as_deref(), Some("B"));
    assert!(by_id["f2"].has_value);
}

#[tokio::test]
async fn unsubmitted_optional_field_surfaces_without_value() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();

    submit(&mut catalog, &mut store, &scope(), "app1", &body(&[("f1", "Ana")]))
        .await
        .unwrap();

    let view = submitted_values(&mut catalog, &mut store, &scope(), "app1")
        .await
        .unwrap();
    let f2 = view.untabbed.iter().find(|entry| entry.field.id == "f2").unwrap();
    assert!(!f2.has_value, "configured-but-unsubmitted fields surface, with has_value=false");
    assert_eq!(f2.value, None);
}

#[tokio::test]
async fn resubmission_updates_in_place() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();

    let first = submit(&mut catalog, &mut store, &scope(), "app1", &body(&[("f1", "Ana")]))
        .await
        .unwrap();
    let first_id = match first {
        SubmissionOutcome::Accepted { values } => values[0].id.clone(),
        SubmissionOutcome::Rejected { .. } => panic!("seed submission should pass"),
    };

    let second = submit(&mut catalog, &mut store, &scope(), "app1", &body(&[("f1", "Bao")]))
        .await
        .unwrap();
    match second {
        SubmissionOutcome::Accepted { values } => {
            assert_eq!(values.len(), 1);
            assert_eq!(values[0].id, first_id, "an upsert keeps the existing row id");
            assert_eq!(values[0].field_value, "Bao");
        }
        SubmissionOutcome::Rejected { .. } => panic!("resubmission should pass"),
    }
    assert_eq!(store.len(), 1, "update, not duplicate insert");
}

#[tokio::test]
async fn identical_resubmission_is_idempotent() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();
    let payload = body(&[("f1", "Ana"), ("f2", "C")]);

    submit(&mut catalog, &mut store, &scope(), "app1", &payload).await.unwrap();
    let before = store.clone();
    submit(&mut catalog, &mut store, &scope(), "app1", &payload).await.unwrap();

    let again = submitted_values(&mut catalog, &mut store, &scope(), "app1")
        .await
        .unwrap();
    assert_eq!(store.len(), 2);
    for entry in again.untabbed {
        assert!(entry.has_value);
    }
    // Same payload, same stored state, ids included.
    assert_eq!(before, store);
}

#[tokio::test]
async fn unknown_submitted_key_is_ignored_and_never_stored() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();

    let outcome = submit(
        &mut catalog,
        &mut store,
        &scope(),
        "app1",
        &body(&[("f1", "Ana"), ("removed_field", "stale")]),
    )
    .await
    .unwrap();

    match outcome {
        SubmissionOutcome::Accepted { values } => {
            assert_eq!(values.len(), 1);
            assert_eq!(values[0].custom_field_id, "f1");
        }
        SubmissionOutcome::Rejected { .. } => panic!("stale keys must not fail validation"),
    }
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn submissions_for_different_instances_are_independent() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();

    submit(&mut catalog, &mut store, &scope(), "app1", &body(&[("f1", "Ana")]))
        .await
        .unwrap();
    submit(&mut catalog, &mut store, &scope(), "app2", &body(&[("f1", "Bao")]))
        .await
        .unwrap();

    let app1 = submitted_values(&mut catalog, &mut store, &scope(), "app1").await.unwrap();
    let f1 = app1.untabbed.iter().find(|entry| entry.field.id == "f1").unwrap();
    assert_eq!(f1.value.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn unregistered_scope_is_not_found_not_a_validation_failure() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();
    let elsewhere = FieldScope::new(EntityType::EventRegistration, "missing");

    let err = submit(&mut catalog, &mut store, &elsewhere, "app1", &body(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ScopeNotFound { .. }));
    assert!(store.is_empty());
}

#[tokio::test]
async fn values_are_stored_verbatim_without_normalization() {
    let mut catalog = MemoryCatalog::new();
    catalog.add_field(FieldDefinition::new("flag", &scope(), "Flag", FieldType::Boolean));
    catalog.add_field(FieldDefinition::new("count", &scope(), "Count", FieldType::Integer));
    let mut store = MemoryValueStore::new();

    let outcome = submit(
        &mut catalog,
        &mut store,
        &scope(),
        "app1",
        &body(&[("flag", "TRUE"), ("count", "007")]),
    )
    .await
    .unwrap();

    match outcome {
        SubmissionOutcome::Accepted { values } => {
            let by_id: BTreeMap<&str, &str> = values
                .iter()
                .map(|value| (value.custom_field_id.as_str(), value.field_value.as_str()))
                .collect();
            assert_eq!(by_id["flag"], "TRUE");
            assert_eq!(by_id["count"], "007");
        }
        SubmissionOutcome::Rejected { .. } => panic!("both values are type-valid"),
    }
}

#[tokio::test]
async fn optional_empty_string_is_stored_and_distinguishable_from_unanswered() {
    let mut catalog = example_catalog();
    let mut store = MemoryValueStore::new();

    submit(
        &mut catalog,
        &mut store,
        &scope(),
        "app1",
        &body(&[("f1", "Ana"), ("f2", "")]),
    )
    .await
    .unwrap();

    let view = submitted_values(&mut catalog, &mut store, &scope(), "app1")
        .await
        .unwrap();
    let f2 = view.untabbed.iter().find(|entry| entry.field.id == "f2").unwrap();
    assert!(f2.has_value, "an answered-with-empty-string optional field has a value");
    assert_eq!(f2.value.as_deref(), Some(""));
}
