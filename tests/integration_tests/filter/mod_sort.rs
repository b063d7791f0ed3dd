use docgate::filter::parse_sort;
use docgate::{Expose, GateError, Order, PropertyRegistry, SortSpec};

fn registry() -> PropertyRegistry {
    PropertyRegistry::builder("file")
        .expose("created_at", Expose::new().filterable().date().alias("createdAt"))
        .expose("filename", Expose::new().filterable())
        .expose("size", Expose::new())
        .build()
        .unwrap()
}

#[test]
fn parses_mixed_directions() {
    let sort = parse_sort("-createdAt;+filename;size", &registry(), 8).unwrap();
    assert_eq!(
        sort,
        vec![SortSpec::desc("created_at"), SortSpec::asc("filename"), SortSpec::asc("size")]
    );
    assert_eq!(sort[0].order, Order::Desc);
}

#[test]
fn unexposed_field_rejected() {
    let err = parse_sort("-owner", &registry(), 8).unwrap_err();
    assert!(matches!(err, GateError::UnsortableProperty(ref f) if f == "owner"));
    assert!(!err.is_validation_failure());
}

#[test]
fn empty_spec_yields_nothing() {
    assert!(parse_sort(" ; ", &registry(), 8).unwrap().is_empty());
}

#[test]
fn too_many_fields_rejected() {
    let err = parse_sort("size;filename;createdAt", &registry(), 2).unwrap_err();
    assert!(matches!(err, GateError::InvalidRequest(_)));
}
