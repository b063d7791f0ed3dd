use bson::{Bson, doc};
use docgate::{Expose, FilterParser, GateConfig, GateError, PropertyRegistry, QueryParams};

fn registry() -> PropertyRegistry {
    PropertyRegistry::builder("user")
        .expose("name", Expose::new().filterable())
        .expose("type_name", Expose::new().filterable().alias("typeName"))
        .build()
        .unwrap()
}

#[test]
fn defaults_when_params_absent() {
    let reg = registry();
    let cfg = GateConfig::default();
    let q = QueryParams::default().into_query(&FilterParser::new(&reg), &cfg).unwrap();
    assert_eq!(q.filter, Some(doc! {}));
    assert_eq!(q.sorter, None);
    assert_eq!((q.page, q.limit), (1, 10));
}

#[test]
fn filter_string_decoded_and_canonicalized() {
    let reg = registry();
    let params = QueryParams {
        filter: Some(r#"{"$or":[{"typeName":"a"},{"name":null}]}"#.into()),
        sort: Some("typeName;-name".into()),
        page: Some(3),
        limit: Some(25),
    };
    let q = params.into_query(&FilterParser::new(&reg), &GateConfig::default()).unwrap();
    assert_eq!(q.filter, Some(doc! { "$or": [ { "type_name": "a" }, { "name": Bson::Null } ] }));
    let sorter = q.sorter.unwrap();
    assert_eq!(sorter[0].field, "type_name");
    assert_eq!(sorter[1].field, "name");
    assert_eq!((q.page, q.limit), (3, 25));
}

#[test]
fn malformed_filter_is_a_decode_error() {
    let reg = registry();
    let params = QueryParams { filter: Some("{\"name\":".into()), ..QueryParams::default() };
    let err = params.into_query(&FilterParser::new(&reg), &GateConfig::default()).unwrap_err();
    assert!(matches!(err, GateError::Decode(_)));
}

#[test]
fn extended_json_dates_are_not_smuggled() {
    let reg = registry();
    let params = QueryParams {
        filter: Some(r#"{"name":{"$date":"2020-01-01"}}"#.into()),
        ..QueryParams::default()
    };
    let err = params.into_query(&FilterParser::new(&reg), &GateConfig::default()).unwrap_err();
    assert!(matches!(err, GateError::DisallowedOperator(ref op) if op == "$date"));
}

#[test]
fn paging_bounds_enforced() {
    let reg = registry();
    let parser = FilterParser::new(&reg);
    let cfg = GateConfig::default();
    for params in [
        QueryParams { page: Some(0), ..QueryParams::default() },
        QueryParams { limit: Some(0), ..QueryParams::default() },
        QueryParams { limit: Some(cfg.max_limit + 1), ..QueryParams::default() },
    ] {
        assert!(matches!(params.into_query(&parser, &cfg), Err(GateError::InvalidRequest(_))));
    }
}

#[test]
fn params_deserialize_from_json() {
    let params: QueryParams =
        serde_json::from_str(r#"{"filter":"{\"name\":\"a\"}","page":2}"#).unwrap();
    assert_eq!(params.page, Some(2));
    assert_eq!(params.limit, None);
}
