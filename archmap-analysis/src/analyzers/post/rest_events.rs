//! REST-event post-processor.
//!
//! Infers async-looking flows from REST endpoints discovered by earlier
//! analyzers: event-style POST routes (`/events/`, `/webhooks/`,
//! past-tense segments) become `rest-event` flows, and create/read pairs
//! on one resource become `restful-crud` flows.

use archmap_core::model::{ApiEndpoint, ApiKind, ConfidenceLevel, MessageFlow};
use archmap_core::scan::{ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{priority, Analyzer};
use crate::kernel::AnalyzerServices;
use crate::strategies::{always_apply, Strategy};

pub struct RestEventAnalyzer;

pub fn construct(_services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(RestEventAnalyzer))
}

impl Analyzer for RestEventAnalyzer {
    fn id(&self) -> &'static str {
        "rest-events"
    }

    fn display_name(&self) -> &'static str {
        "REST event inference"
    }

    fn languages(&self) -> &'static [&'static str] {
        &[]
    }

    fn file_globs(&self) -> Vec<String> {
        Vec::new()
    }

    fn priority(&self) -> i32 {
        priority::POST_PROCESS
    }

    fn strategy(&self) -> Strategy {
        always_apply()
    }

    fn applies(&self, ctx: &ScanContext) -> bool {
        ctx.previous_results
            .values()
            .any(|r| r.endpoints.iter().any(|e| e.kind == ApiKind::Rest))
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let mut builder = ScanResultBuilder::new(self.id());

        let endpoints: Vec<&ApiEndpoint> = ctx
            .previous_results
            .values()
            .flat_map(|r| r.endpoints.iter())
            .filter(|e| e.kind == ApiKind::Rest)
            .collect();

        let mut crud_candidates: Vec<&ApiEndpoint> = Vec::new();
        for &endpoint in &endpoints {
            if endpoint.method == "POST" && is_event_path(&endpoint.path) {
                builder.flow(event_flow(endpoint));
            } else {
                crud_candidates.push(endpoint);
            }
        }

        for flow in crud_flows(&crud_candidates) {
            builder.flow(flow);
        }

        builder.build(true)
    }
}

/// `/events/`, `/webhooks/`, or a past-tense last segment
/// (`order-created`, `payment-failed`).
fn is_event_path(path: &str) -> bool {
    let lowered = path.to_lowercase();
    if lowered.contains("/events/") || lowered.contains("/webhooks/") {
        return true;
    }
    last_segment(&lowered)
        .split('-')
        .next_back()
        .is_some_and(|word| word.len() > 3 && word.ends_with("ed"))
}

fn event_flow(endpoint: &ApiEndpoint) -> MessageFlow {
    let segment = last_segment(&endpoint.path);
    let message_type = endpoint
        .request_schema
        .clone()
        .unwrap_or_else(|| format!("{}Event", pascal_case(segment)));

    // `/api/events/order-created` → subscriber `order-service`.
    let entity = segment.split('-').next().unwrap_or(segment);
    let subscriber = format!("{entity}-service");

    MessageFlow::new(&endpoint.path, message_type, "rest-event")
        .with_subscriber(subscriber)
        .with_confidence(ConfidenceLevel::Medium)
}

/// A create (POST /res) paired with a read (GET /res or GET /res/{id})
/// marks a CRUD resource; both sides are pinned to the gateway since the
/// actual peers are unknown.
fn crud_flows(endpoints: &[&ApiEndpoint]) -> Vec<MessageFlow> {
    let mut flows = Vec::new();
    let mut resources: Vec<String> = Vec::new();
    for endpoint in endpoints {
        let resource = resource_path(&endpoint.path);
        if !resources.contains(&resource) {
            resources.push(resource);
        }
    }

    for resource in resources {
        let has_create = endpoints
            .iter()
            .any(|e| e.method == "POST" && resource_path(&e.path) == resource);
        let has_read = endpoints
            .iter()
            .any(|e| e.method == "GET" && resource_path(&e.path) == resource);
        if !(has_create && has_read) {
            continue;
        }

        let entity = singular(last_segment(&resource));
        flows.push(
            MessageFlow::new(&resource, format!("{}Event", pascal_case(&entity)), "restful-crud")
                .with_publisher("api-gateway")
                .with_subscriber("api-gateway")
                .with_confidence(ConfidenceLevel::Low),
        );
    }
    flows
}

/// Strip trailing path parameters: `/api/products/{id}` → `/api/products`.
fn resource_path(path: &str) -> String {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    while let Some(last) = segments.last() {
        if last.starts_with('{') || last.starts_with(':') || last.starts_with('<') {
            segments.pop();
        } else {
            break;
        }
    }
    format!("/{}", segments.join("/"))
}

fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}

fn pascal_case(kebab: &str) -> String {
    kebab
        .split(&['-', '_'][..])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

fn singular(plural: &str) -> String {
    if let Some(stem) = plural.strip_suffix("ies") {
        format!("{stem}y")
    } else if plural.ends_with("ses") || plural.ends_with("xes") {
        plural.trim_end_matches("es").to_string()
    } else {
        plural.trim_end_matches('s').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(method: &str, path: &str) -> ApiEndpoint {
        ApiEndpoint::new("svc", ApiKind::Rest, method, path)
    }

    #[test]
    fn event_posts_become_rest_event_flows() {
        let ep = endpoint("POST", "/api/events/order-created")
            .with_request_schema("OrderCreatedEvent");
        let flow = event_flow(&ep);
        assert_eq!(flow.topic, "/api/events/order-created");
        assert_eq!(flow.message_type, "OrderCreatedEvent");
        assert_eq!(flow.subscriber_component_id.as_deref(), Some("order-service"));
        assert!(flow.publisher_component_id.is_none());
        assert_eq!(flow.broker, "rest-event");
    }

    #[test]
    fn message_type_derived_when_no_schema() {
        let ep = endpoint("POST", "/webhooks/payment-failed");
        let flow = event_flow(&ep);
        assert_eq!(flow.message_type, "PaymentFailedEvent");
        assert_eq!(flow.subscriber_component_id.as_deref(), Some("payment-service"));
    }

    #[test]
    fn past_tense_segments_count_as_events() {
        assert!(is_event_path("/api/events/order-created"));
        assert!(is_event_path("/api/order-shipped"));
        assert!(!is_event_path("/api/products"));
        assert!(!is_event_path("/api/red"));
    }

    #[test]
    fn crud_pairs_become_restful_crud_flows() {
        let create = endpoint("POST", "/api/products");
        let read = endpoint("GET", "/api/products/{id}");
        let lonely = endpoint("GET", "/api/health");
        let flows = crud_flows(&[&create, &read, &lonely]);
        assert_eq!(flows.len(), 1);
        let flow = &flows[0];
        assert_eq!(flow.topic, "/api/products");
        assert_eq!(flow.message_type, "ProductEvent");
        assert_eq!(flow.publisher_component_id.as_deref(), Some("api-gateway"));
        assert_eq!(flow.subscriber_component_id.as_deref(), Some("api-gateway"));
        assert_eq!(flow.broker, "restful-crud");
    }

    #[test]
    fn singulars() {
        assert_eq!(singular("products"), "product");
        assert_eq!(singular("categories"), "category");
        assert_eq!(singular("statuses"), "status");
    }
}
