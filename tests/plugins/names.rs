use chrono::Utc;
use namestore::core::error::NameStoreError;
use namestore::core::store::NameStore;
use namestore::plugins::names::{
    CreateNameInput, GetNameInput, PEDRO, create_name, get_name, get_pedro_singleton,
};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

fn store() -> NameStore {
    NameStore::open_in_memory().expect("open store")
}

#[test]
fn test_create_name_returns_persisted_record() {
    let store = store();
    let before = Utc::now();
    let input = CreateNameInput::new("Alice").unwrap();
    let record = create_name(&store, &input).unwrap();
    let after = Utc::now();

    assert_eq!(record.name, "Alice");
    assert!(record.id > 0);
    assert!(record.created_at >= before, "{} < {}", record.created_at, before);
    assert!(record.created_at <= after, "{} > {}", record.created_at, after);

    let saved = store.find_by_name("Alice").unwrap();
    assert_eq!(saved, vec![record]);
}

#[test]
fn test_create_name_allows_duplicates() {
    let store = store();
    let input = CreateNameInput::new("Alice").unwrap();
    let a = create_name(&store, &input).unwrap();
    let b = create_name(&store, &input).unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(store.find_by_name("Alice").unwrap().len(), 2);
}

#[test]
fn test_create_name_keeps_whitespace_and_unicode() {
    let store = store();
    for name in [" ", "José", "名前", "a very long name with spaces"] {
        let record = create_name(&store, &CreateNameInput::new(name).unwrap()).unwrap();
        assert_eq!(record.name, name);
    }
}

#[test]
fn test_create_name_rejects_empty_before_store_access() {
    let store = store();
    let err = CreateNameInput::new("").unwrap_err();
    assert!(matches!(err, NameStoreError::ValidationError(_)));

    let unchecked = CreateNameInput {
        name: String::new(),
    };
    let err = create_name(&store, &unchecked).unwrap_err();
    assert!(matches!(err, NameStoreError::ValidationError(_)));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_get_name_returns_equal_record() {
    let store = store();
    let created = create_name(&store, &CreateNameInput::new("Bob").unwrap()).unwrap();
    let fetched = get_name(&store, &GetNameInput::new(created.id).unwrap()).unwrap();
    assert_eq!(fetched, Some(created));
}

#[test]
fn test_get_name_unknown_id_is_none() {
    let store = store();
    create_name(&store, &CreateNameInput::new("Bob").unwrap()).unwrap();
    let fetched = get_name(&store, &GetNameInput::new(999).unwrap()).unwrap();
    assert!(fetched.is_none());
}

#[test]
fn test_get_name_rejects_non_positive_ids() {
    assert!(matches!(
        GetNameInput::new(0),
        Err(NameStoreError::ValidationError(_))
    ));
    assert!(matches!(
        GetNameInput::new(-3),
        Err(NameStoreError::ValidationError(_))
    ));
}

#[test]
fn test_get_name_params_parsing() {
    assert_eq!(
        GetNameInput::from_params(&json!({"id": 7})).unwrap().id,
        7
    );
    assert_eq!(
        GetNameInput::from_params(&json!({"id": 7.0})).unwrap().id,
        7
    );
    for bad in [
        json!({"id": 7.5}),
        json!({"id": "7"}),
        json!({"id": 0}),
        json!({"id": -1}),
        json!({"id": null}),
        json!({}),
        json!([7]),
        json!({"id": 18446744073709551615u64}),
        json!({"id": 9223372036854775808.0_f64}),
        json!({"id": 1e300}),
    ] {
        let err = GetNameInput::from_params(&bad).unwrap_err();
        assert!(matches!(err, NameStoreError::ValidationError(_)), "{bad}");
    }
}

#[test]
fn test_create_name_params_parsing() {
    let input = CreateNameInput::from_params(&json!({"name": "Carol", "extra": true})).unwrap();
    assert_eq!(input.name, "Carol");
    for bad in [json!({"name": ""}), json!({"name": 5}), json!({}), json!(null)] {
        let err = CreateNameInput::from_params(&bad).unwrap_err();
        assert!(matches!(err, NameStoreError::ValidationError(_)), "{bad}");
    }
}

#[test]
fn test_pedro_created_when_absent() {
    let store = store();
    assert!(store.find_by_name(PEDRO).unwrap().is_empty());

    let pedro = get_pedro_singleton(&store).unwrap();
    assert_eq!(pedro.name, "Pedro");
    assert!(pedro.id > 0);

    let saved = store.find_by_name(PEDRO).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0], pedro);
}

#[test]
fn test_pedro_existing_is_returned() {
    let store = store();
    let original = store.insert("Pedro").unwrap();

    let pedro = get_pedro_singleton(&store).unwrap();
    assert_eq!(pedro, original);
    assert_eq!(store.find_by_name(PEDRO).unwrap().len(), 1);
}

#[test]
fn test_pedro_sequential_calls_return_same_record() {
    let store = store();
    let first = get_pedro_singleton(&store).unwrap();
    let second = get_pedro_singleton(&store).unwrap();
    assert_eq!(first, second);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_pedro_first_of_duplicates_wins() {
    let store = store();
    let first = store.insert("Pedro").unwrap();
    thread::sleep(std::time::Duration::from_millis(10));
    let second = store.insert("Pedro").unwrap();

    let pedro = get_pedro_singleton(&store).unwrap();
    assert_eq!(pedro, first);
    assert_eq!(store.find_by_name(PEDRO).unwrap(), vec![first, second]);
}

#[test]
fn test_pedro_leaves_other_names_alone() {
    let store = store();
    for name in ["Alice", "Bob", "Charlie"] {
        store.insert(name).unwrap();
    }

    let pedro = get_pedro_singleton(&store).unwrap();
    assert_eq!(pedro.name, "Pedro");

    let mut names: Vec<String> = ["Alice", "Bob", "Charlie", "Pedro"]
        .iter()
        .flat_map(|n| store.find_by_name(n).unwrap())
        .map(|r| r.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["Alice", "Bob", "Charlie", "Pedro"]);
    assert_eq!(store.count().unwrap(), 4);
}

#[test]
fn test_pedro_lookup_is_case_sensitive() {
    let store = store();
    let lower = store.insert("pedro").unwrap();

    let pedro = get_pedro_singleton(&store).unwrap();
    assert_eq!(pedro.name, "Pedro");
    assert_ne!(pedro.id, lower.id);
    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.find_by_name("pedro").unwrap(), vec![lower]);
}

#[test]
fn test_pedro_concurrent_callers_share_one_record() {
    let tmp = tempdir().unwrap();
    let store = Arc::new(NameStore::open(&tmp.path().join("names.db")).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || get_pedro_singleton(&store).unwrap())
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(results.iter().all(|r| r == &results[0]));
    assert_eq!(store.find_by_name(PEDRO).unwrap().len(), 1);
}

#[test]
fn test_pedro_survives_reopen() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("names.db");

    let store = NameStore::open(&path).unwrap();
    let pedro = get_pedro_singleton(&store).unwrap();
    store.close().unwrap();

    let store = NameStore::open(&path).unwrap();
    assert_eq!(get_pedro_singleton(&store).unwrap(), pedro);
    assert_eq!(store.count().unwrap(), 1);
}
