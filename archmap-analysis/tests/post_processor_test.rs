//! REST-event post-processor over synthetic prior results.

use std::collections::BTreeMap;
use std::sync::Arc;

use archmap_analysis::analyzers::post::rest_events;
use archmap_analysis::kernel::AnalyzerServices;
use archmap_core::model::{ApiEndpoint, ApiKind};
use archmap_core::scan::{FileSet, ScanContext, ScanResult};

fn context_with_endpoints(endpoints: Vec<ApiEndpoint>) -> ScanContext {
    let mut result = ScanResult::empty("spring-rest");
    result.endpoints = endpoints;
    let mut previous = BTreeMap::new();
    previous.insert("spring-rest".to_string(), Arc::new(result));
    ScanContext::new("/p", Arc::new(FileSet::new(Vec::new())))
        .with_previous_results(Arc::new(previous))
}

#[test]
fn derives_event_and_crud_flows() {
    let analyzer = rest_events::construct(&AnalyzerServices::default()).unwrap();
    let ctx = context_with_endpoints(vec![
        ApiEndpoint::new("svc", ApiKind::Rest, "POST", "/api/events/order-created")
            .with_request_schema("OrderCreatedEvent"),
        ApiEndpoint::new("svc", ApiKind::Rest, "POST", "/api/products"),
        ApiEndpoint::new("svc", ApiKind::Rest, "GET", "/api/products/{id}"),
    ]);

    assert!(analyzer.applies(&ctx));
    let result = analyzer.scan(&ctx);
    assert!(result.success);
    assert_eq!(result.flows.len(), 2);

    let event = result
        .flows
        .iter()
        .find(|f| f.broker == "rest-event")
        .expect("rest-event flow");
    assert_eq!(event.topic, "/api/events/order-created");
    assert_eq!(event.message_type, "OrderCreatedEvent");
    assert!(event.publisher_component_id.is_none());
    assert_eq!(event.subscriber_component_id.as_deref(), Some("order-service"));

    let crud = result
        .flows
        .iter()
        .find(|f| f.broker == "restful-crud")
        .expect("restful-crud flow");
    assert_eq!(crud.topic, "/api/products");
    assert_eq!(crud.message_type, "ProductEvent");
    assert_eq!(crud.publisher_component_id.as_deref(), Some("api-gateway"));
    assert_eq!(crud.subscriber_component_id.as_deref(), Some("api-gateway"));
}

#[test]
fn does_not_apply_without_rest_endpoints() {
    let analyzer = rest_events::construct(&AnalyzerServices::default()).unwrap();
    let ctx = context_with_endpoints(vec![ApiEndpoint::new(
        "svc",
        ApiKind::GraphqlQuery,
        "QUERY",
        "getUser",
    )]);
    assert!(!analyzer.applies(&ctx));
}

#[test]
fn webhook_paths_without_schema_derive_the_type() {
    let analyzer = rest_events::construct(&AnalyzerServices::default()).unwrap();
    let ctx = context_with_endpoints(vec![ApiEndpoint::new(
        "svc",
        ApiKind::Rest,
        "POST",
        "/webhooks/payment-failed",
    )]);
    let result = analyzer.scan(&ctx);
    assert_eq!(result.flows[0].message_type, "PaymentFailedEvent");
    assert_eq!(
        result.flows[0].subscriber_component_id.as_deref(),
        Some("payment-service")
    );
}
