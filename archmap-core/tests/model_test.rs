//! Model-level invariants: id stability, semantic keys, canonical
//! serialization.

use archmap_core::model::{
    ApiEndpoint, ApiKind, ArchitectureModel, Component, ComponentType, DataEntity, Dependency,
    MessageFlow, Relationship, RelationshipKind,
};
use archmap_core::model::ids::component_id;

// ─── Helpers ───────────────────────────────────────────────────────────────

fn sample_model() -> ArchitectureModel {
    let mut model = ArchitectureModel::new("shop", "1.0.0");
    let svc = Component::new("shop-backend", ComponentType::Service);
    let component = svc.id.clone();
    model.components.push(svc);
    model
        .dependencies
        .push(Dependency::new(&component, "org.springframework.boot", "spring-boot-starter-web", "3.2.0"));
    model
        .endpoints
        .push(ApiEndpoint::new(&component, ApiKind::Rest, "GET", "/api/users"));
    model.flows.push(
        MessageFlow::new("orders", "OrderCreated", "kafka").with_subscriber(&component),
    );
    model
        .entities
        .push(DataEntity::new(&component, "users", "table"));
    model.relationships.push(Relationship::new(
        component_id("User"),
        component_id("Order"),
        RelationshipKind::DependsOn,
    ));
    model
}

// ═══════════════════════════════════════════════════════════════════════════
// SEMANTIC KEYS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn dependency_key_covers_all_coordinates() {
    let a = Dependency::new("c", "g", "a", "1.0");
    let mut b = a.clone();
    assert_eq!(a.semantic_key(), b.semantic_key());
    b.version = "2.0".to_string();
    assert_ne!(a.semantic_key(), b.semantic_key());
}

#[test]
fn endpoint_key_is_component_method_path() {
    let get = ApiEndpoint::new("c", ApiKind::Rest, "GET", "/api/users");
    let post = ApiEndpoint::new("c", ApiKind::Rest, "POST", "/api/users");
    assert_ne!(get.semantic_key(), post.semantic_key());

    let other_component = ApiEndpoint::new("d", ApiKind::Rest, "GET", "/api/users");
    assert_ne!(get.semantic_key(), other_component.semantic_key());
}

#[test]
fn flow_key_distinguishes_directions() {
    let consume = MessageFlow::new("orders", "Order", "kafka").with_subscriber("a");
    let produce = MessageFlow::new("orders", "Order", "kafka").with_publisher("a");
    assert_ne!(consume.semantic_key(), produce.semantic_key());
}

// ═══════════════════════════════════════════════════════════════════════════
// DETERMINISM
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn component_ids_stable_across_instances() {
    for name in ["a", "user-service", "shop-backend", "Ünïcode"] {
        assert_eq!(component_id(name), component_id(name));
        assert_eq!(component_id(name).len(), 16);
    }
}

#[test]
fn canonical_json_is_identical_across_clones() {
    let model = sample_model();
    let first = model.to_canonical_json().unwrap();
    let second = model.clone().to_canonical_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn canonical_json_ignores_insertion_order() {
    let mut forward = sample_model();
    let mut reversed = sample_model();
    reversed.dependencies.reverse();
    reversed.endpoints.reverse();

    forward.dependencies.push(Dependency::new("c", "g2", "a2", "1.0"));
    reversed.dependencies.insert(0, Dependency::new("c", "g2", "a2", "1.0"));

    assert_eq!(
        forward.to_canonical_json().unwrap(),
        reversed.to_canonical_json().unwrap()
    );
}

#[test]
fn finding_count_sums_all_collections() {
    let model = sample_model();
    assert_eq!(model.finding_count(), 6);
}
