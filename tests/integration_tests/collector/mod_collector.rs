use bson::{Document, doc};
use docgate::collector::{
    CollectionQuery, DocumentCollector, FindOptions, Populate, Projection, SortSpec,
};
use docgate::collector::trace::{self, CollectorOp, OpTrace};
use docgate::{GateConfig, GateError};

use crate::integration_tests::_support::{Call, TrackingModel, sample_docs};

fn collector(total: u64) -> DocumentCollector<TrackingModel> {
    DocumentCollector::new(TrackingModel::new(sample_docs(), total))
}

#[tokio::test]
async fn find_returns_data_and_pagination() {
    let c = collector(100);
    let res = c.find(&CollectionQuery::new(), None, None).await.unwrap();
    assert_eq!(res.data, sample_docs());
    assert_eq!(res.pagination.total, 100);
    assert_eq!(res.pagination.page, 1);
    assert_eq!(res.pagination.limit, 10);
    assert_eq!(res.pagination.prev, None);
    assert_eq!(res.pagination.next, Some(2));
}

#[tokio::test]
async fn find_second_page_skips_and_limits() {
    let c = collector(100);
    let q = CollectionQuery::new().filter(doc! { "name": "one" }).page(2).limit(10);
    let res = c.find(&q, None, None).await.unwrap();
    assert_eq!(res.pagination.prev, Some(1));
    assert_eq!(res.pagination.next, Some(3));
    let m = c.model();
    assert!(m.has(&Call::Skip(10)));
    assert!(m.has(&Call::Limit(10)));
    assert!(m.has(&Call::Lean));
    assert!(m.has(&Call::Populate(vec![])));
    assert!(!m.calls().iter().any(|call| matches!(call, Call::Sort(_))));
    assert_eq!(m.find_filter(), Some(doc! { "name": "one" }));
    assert_eq!(m.count_filter(), Some(doc! { "name": "one" }));
}

#[tokio::test]
async fn find_last_page_has_no_next() {
    let c = collector(5);
    let res = c.find(&CollectionQuery::new(), None, None).await.unwrap();
    assert_eq!((res.pagination.prev, res.pagination.next), (None, None));
}

#[tokio::test]
async fn find_appends_identity_tie_break() {
    let c = DocumentCollector::new(TrackingModel::new(sample_docs(), 6)).with_identity_field("id");
    let q = CollectionQuery::new().sorter(vec![SortSpec::desc("name")]);
    c.find(&q, None, Some(&[Populate::from("owner")])).await.unwrap();
    assert!(c.model().has(&Call::Sort(vec![SortSpec::desc("name"), SortSpec::asc("id")])));
    assert!(c.model().has(&Call::Populate(vec![Populate::from("owner")])));
}

#[tokio::test]
async fn find_keeps_sort_that_already_has_identity() {
    let c = collector(6);
    let sort = vec![SortSpec::desc("_id"), SortSpec::asc("name")];
    c.find(&CollectionQuery::new().sorter(sort.clone()), None, None).await.unwrap();
    assert!(c.model().has(&Call::Sort(sort)));
}

#[tokio::test]
async fn identity_field_from_config() {
    let mut cfg = GateConfig::default();
    cfg.identity_field = "uuid".into();
    let c = collector(6).with_config(&cfg);
    c.find_all(doc! {}, None, &FindOptions { sort: Some(vec![]), ..FindOptions::default() })
        .await
        .unwrap();
    assert!(c.model().has(&Call::Sort(vec![SortSpec::asc("uuid")])));
}

#[tokio::test]
async fn find_applies_scope_to_data_and_count() {
    let c = collector(100);
    let q = CollectionQuery::new().filter(doc! { "name": "one" });
    c.find(&q, Some(&doc! { "workspace": "ws-123" }), None).await.unwrap();
    let expected = doc! { "$and": [ { "name": "one" }, { "workspace": "ws-123" } ] };
    assert_eq!(c.model().find_filter(), Some(expected.clone()));
    assert_eq!(c.model().count_filter(), Some(expected));
}

#[tokio::test]
async fn find_with_empty_scope_leaves_filter_alone() {
    let c = collector(100);
    let q = CollectionQuery::new().filter(doc! { "id": 1 });
    c.find(&q, Some(&Document::new()), None).await.unwrap();
    assert_eq!(c.model().find_filter(), Some(doc! { "id": 1 }));
}

#[tokio::test]
async fn find_emits_one_trace_event() {
    let cap = trace::capture();
    let c = collector(100);
    c.find(&CollectionQuery::new().page(3), Some(&doc! { "workspace": "ws-123" }), None).await.unwrap();
    assert_eq!(
        cap.take(),
        vec![OpTrace::new(CollectorOp::Find, true).paged(3, 10).total(100).returned(6)]
    );
}

#[tokio::test]
async fn every_operation_is_traced() {
    let cap = trace::capture();
    let c = collector(4);
    c.count(doc! {}, Some(&Document::new())).await.unwrap();
    c.exists(doc! {}, None).await.unwrap();
    c.find_one(doc! {}, None, &FindOptions::default()).await.unwrap();
    assert_eq!(cap.ops(), vec![CollectorOp::Count, CollectorOp::Exists, CollectorOp::FindAll]);
    let events = cap.take();
    assert!(!events[0].scoped);
    assert_eq!(events[1].total, Some(1));
    assert_eq!(events[2].returned, Some(6));
}

#[tokio::test]
async fn raw_extreme_paging_does_not_panic() {
    let c = collector(1);
    let q = CollectionQuery { filter: None, sorter: None, page: u64::MAX, limit: 0 };
    let res = c.find(&q, None, None).await.unwrap();
    assert_eq!(res.pagination.next, None);
    assert_eq!(res.pagination.prev, Some(u64::MAX - 1));
}

#[tokio::test]
async fn find_all_returns_plain_array_without_options() {
    let c = collector(100);
    let res = c.find_all(doc! {}, None, &FindOptions::default()).await.unwrap();
    assert_eq!(res, sample_docs());
    assert_eq!(c.model().calls(), vec![Call::Find(doc! {}), Call::Lean, Call::Exec]);
}

#[tokio::test]
async fn find_all_applies_each_option() {
    let c = collector(100);
    let opts = FindOptions {
        limit: Some(5),
        skip: Some(1),
        sort: Some(vec![SortSpec::desc("id")]),
        populate: Some(vec![Populate::from("relation")]),
        select: Some(Projection::List(vec!["id".into(), "name".into()])),
    };
    c.find_all(doc! {}, None, &opts).await.unwrap();
    let m = c.model();
    assert!(m.has(&Call::Limit(5)));
    assert!(m.has(&Call::Skip(1)));
    assert!(m.has(&Call::Sort(vec![SortSpec::desc("id"), SortSpec::asc("_id")])));
    assert!(m.has(&Call::Populate(vec![Populate::from("relation")])));
    assert!(m.has(&Call::Select(Projection::List(vec!["id".into(), "name".into()]))));
}

#[tokio::test]
async fn find_all_nested_populate_passes_through() {
    let c = collector(100);
    let nested = vec![Populate::Nested {
        path: "relation1".into(),
        select: Some(vec!["field1".into(), "field2".into()]),
        populate: vec![],
    }];
    let opts = FindOptions { populate: Some(nested.clone()), ..FindOptions::default() };
    c.find_all(doc! {}, None, &opts).await.unwrap();
    assert!(c.model().has(&Call::Populate(nested)));
}

#[tokio::test]
async fn find_all_conjoins_scope() {
    let c = collector(100);
    c.find_all(doc! { "name": "one" }, Some(&doc! { "workspace": "ws-123" }), &FindOptions::default())
        .await
        .unwrap();
    assert_eq!(
        c.model().find_filter(),
        Some(doc! { "$and": [ { "name": "one" }, { "workspace": "ws-123" } ] })
    );
}

#[tokio::test]
async fn find_with_limit_delegates() {
    let c = collector(100);
    let res = c.find_with_limit(doc! {}, 3, None, Some(vec![Populate::from("relation")])).await.unwrap();
    assert_eq!(res.len(), 6);
    assert!(c.model().has(&Call::Limit(3)));
    assert!(c.model().has(&Call::Populate(vec![Populate::from("relation")])));
}

#[tokio::test]
async fn find_one_limits_to_one() {
    let c = collector(100);
    let opts = FindOptions { select: Some(Projection::Fields("id".into())), ..FindOptions::default() };
    let one = c.find_one(doc! { "id": 1 }, None, &opts).await.unwrap();
    assert_eq!(one, Some(doc! { "id": 1, "name": "one" }));
    assert!(c.model().has(&Call::Limit(1)));
    assert!(c.model().has(&Call::Select(Projection::Fields("id".into()))));
}

#[tokio::test]
async fn find_one_returns_none_when_empty() {
    let c = DocumentCollector::new(TrackingModel::new(vec![], 0));
    assert_eq!(c.find_one(doc! { "id": 999 }, None, &FindOptions::default()).await.unwrap(), None);
}

#[tokio::test]
async fn count_uses_scoped_filter() {
    let c = collector(50);
    let n = c.count(doc! { "status": "active" }, Some(&doc! { "workspace": "ws-123" })).await.unwrap();
    assert_eq!(n, 50);
    assert!(c.model().count_filter().unwrap().contains_key("$and"));
    assert!(!c.model().has(&Call::CountLimit(1)));
}

#[tokio::test]
async fn exists_caps_count_at_one() {
    let c = collector(100);
    assert!(c.exists(doc! { "id": 1 }, Some(&doc! { "workspace": "ws-123" })).await.unwrap());
    assert!(c.model().has(&Call::CountLimit(1)));
    assert!(c.model().count_filter().unwrap().contains_key("$and"));

    let empty = collector(0);
    assert!(!empty.exists(doc! { "id": 999 }, None).await.unwrap());
    assert!(empty.model().has(&Call::CountLimit(1)));
}

#[tokio::test]
async fn backend_errors_propagate_unchanged() {
    let c = DocumentCollector::new(TrackingModel::new(sample_docs(), 6).failing("connection reset"));
    let err = c.find_all(doc! {}, None, &FindOptions::default()).await.unwrap_err();
    match err {
        GateError::Backend(inner) => assert_eq!(inner.to_string(), "connection reset"),
        other => panic!("unexpected {other:?}"),
    }
    let err = c.find(&CollectionQuery::new(), None, None).await.unwrap_err();
    assert!(matches!(err, GateError::Backend(_)));
}
