use bson::{Bson, doc};
use criteria_bson::config::{ConverterConfig, ScalarEncoding};
use criteria_bson::criteria::{Criteria, Filters, Order, parse_criteria_json};
use criteria_bson::repository::{CriteriaRepository, DocumentStore, IndexRegistry, MemoryStore};
use criteria_bson::{Converter, CriteriaError};
use std::sync::Arc;

fn people() -> MemoryStore {
    let store = MemoryStore::new("people");
    store.insert_many([
        doc! {"_id": 1, "name": "john smith", "email": "js@example.com", "age": 34, "status": "active"},
        doc! {"_id": 2, "name": "ann", "email": "john.a@example.com", "age": 17, "status": "active"},
        doc! {"_id": 3, "name": "bob", "email": "bob@example.com", "age": 52, "status": "blocked"},
        doc! {"_id": 4, "name": "carol", "email": "carol@example.com", "age": 41, "status": "active"},
        doc! {"_id": 5, "name": "dave", "email": "dave@example.com", "age": 29, "status": "active"},
    ]);
    store
}

fn typed() -> Converter {
    Converter::new(ConverterConfig { scalar_encoding: ScalarEncoding::Typed, ..Default::default() })
}

fn names(items: &[bson::Document]) -> Vec<&str> {
    items.iter().map(|d| d.get_str("name").unwrap()).collect()
}

#[test]
fn search_paginates_newest_first_and_strips_ids() {
    let repo = CriteriaRepository::new(people(), typed());
    let c = Criteria::new(Filters::none(), Order::none(), Some(2), Some(1));
    let page = repo.search(&c).unwrap();
    assert_eq!(names(&page.items), ["dave", "carol"]);
    assert!(page.items.iter().all(|d| !d.contains_key("_id")));
    assert_eq!(page.total, 5);
    assert_eq!(page.current_page, Some(1));
    assert_eq!(page.next_page, Some(2));

    let last = repo.search(&Criteria::new(Filters::none(), Order::none(), Some(2), Some(3))).unwrap();
    assert_eq!(names(&last.items), ["john smith"]);
    assert_eq!(last.next_page, None);
}

#[test]
fn filters_and_order_execute() {
    let repo = CriteriaRepository::new(people(), typed());
    let c = parse_criteria_json(
        r#"{
            "filters": [
                {"field": "status", "operator": "=", "value": "active"},
                {"field": "age", "operator": "BETWEEN", "value": {"from": 18, "to": 45}}
            ],
            "orderBy": "age",
            "orderType": "ASC"
        }"#,
    )
    .unwrap();
    let page = repo.search(&c).unwrap();
    assert_eq!(names(&page.items), ["dave", "john smith", "carol"]);
    assert_eq!(page.total, 3);
    assert_eq!(page.next_page, None);
}

#[test]
fn or_search_across_fields() {
    let repo = CriteriaRepository::new(people(), Converter::default());
    let c = Criteria::new(
        Filters::from_values(&[doc! {
            "field": "q",
            "operator": "OR",
            "value": [
                {"field": "name", "operator": "CONTAINS", "value": "john"},
                {"field": "email", "operator": "CONTAINS", "value": "john"},
            ],
        }])
        .unwrap(),
        Order::asc("id").unwrap(),
        None,
        None,
    );
    let page = repo.search(&c).unwrap();
    assert_eq!(names(&page.items), ["john smith", "ann"]);
}

#[test]
fn not_contains_and_in() {
    let repo = CriteriaRepository::new(people(), typed());
    let c = Criteria::new(
        Filters::from_values(&[
            doc! {"field": "email", "operator": "NOT_CONTAINS", "value": "john"},
            doc! {"field": "status", "operator": "IN", "value": ["active"]},
        ])
        .unwrap(),
        Order::desc("age").unwrap(),
        None,
        None,
    );
    assert_eq!(names(&repo.search(&c).unwrap().items), ["carol", "john smith", "dave"]);
}

#[test]
fn canonical_strings_do_not_match_numeric_fields() {
    // Default encoding emits "18"; numbers and strings never compare.
    let repo = CriteriaRepository::new(people(), Converter::default());
    let c = Criteria::new(
        Filters::from_values(&[doc! {"field": "age", "operator": ">", "value": 18}]).unwrap(),
        Order::none(),
        None,
        None,
    );
    assert_eq!(repo.count(&c).unwrap(), 0);
    let repo = CriteriaRepository::new(people(), typed());
    assert_eq!(repo.count(&c).unwrap(), 4);
}

#[test]
fn indexes_created_once_per_collection() {
    let registry = Arc::new(IndexRegistry::new());
    let a = CriteriaRepository::new(people(), typed())
        .with_registry(Arc::clone(&registry))
        .with_indexes(["status", "age"]);
    assert!(a.ensure_indexes().unwrap());
    a.search(&Criteria::default()).unwrap();
    assert_eq!(a.store().indexes(), ["status", "age"]);

    // Same collection name, shared registry: the second repository skips creation.
    let b = CriteriaRepository::new(people(), typed())
        .with_registry(Arc::clone(&registry))
        .with_indexes(["status"]);
    b.search(&Criteria::default()).unwrap();
    assert!(b.store().indexes().is_empty());
    assert!(registry.is_initialized("people"));
}

#[test]
fn invalid_regex_surfaces_as_domain_error() {
    let repo = CriteriaRepository::new(people(), typed());
    let c = Criteria::new(
        Filters::from_values(&[doc! {"field": "name", "operator": "CONTAINS", "value": "("}]).unwrap(),
        Order::none(),
        None,
        None,
    );
    let e = repo.search(&c).unwrap_err();
    assert!(e.is_domain(), "{e}");
    // Rejected even when no document is scanned.
    let empty = CriteriaRepository::new(MemoryStore::new("empty"), typed());
    assert!(empty.count(&c).unwrap_err().is_domain());
}

#[test]
fn mixed_numeric_field_sorts_in_value_order() {
    let store = MemoryStore::new("scores");
    store.insert_many([
        doc! {"_id": 1, "score": 3_i64},
        doc! {"_id": 2, "score": Bson::Decimal128("1.5".parse().unwrap())},
        doc! {"_id": 3, "score": 2},
        doc! {"_id": 4, "score": 0.5},
        doc! {"_id": 5, "score": Bson::Decimal128("2.5".parse().unwrap())},
    ]);
    let repo = CriteriaRepository::new(store, typed());
    let c = Criteria::new(Filters::none(), Order::asc("score").unwrap(), None, None);
    let ids: Vec<String> = repo
        .store()
        .find(&repo.converter().convert(&c).unwrap())
        .unwrap()
        .iter()
        .map(|d| d.get("_id").unwrap().to_string())
        .collect();
    assert_eq!(ids, ["4", "2", "3", "5", "1"]);
}

#[test]
fn shape_errors_stop_before_the_store() {
    let repo = CriteriaRepository::new(people(), typed());
    let c = Criteria::new(
        Filters::from_values(&[doc! {"field": "x", "operator": "OR", "value": 1}]).unwrap(),
        Order::none(),
        None,
        None,
    );
    assert!(matches!(repo.search(&c), Err(CriteriaError::InvalidShape(_))));
    assert_eq!(repo.store().count(&doc! {}).unwrap(), 5);
}
