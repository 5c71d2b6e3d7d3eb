//! REST / RPC API analyzers: route declarations → ApiEndpoints.

pub mod aspnet;
pub mod django;
pub mod express;
pub mod fastapi;
pub mod flask;
pub mod grpc;
pub mod jaxrs;
pub mod rails;
pub mod spring;

/// Strip a generic wrapper commonly used around response bodies
/// (`ResponseEntity<User>` → `User`, `Task<User>` → `User`).
pub(crate) fn unwrap_response_type(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "void" || trimmed == "None" {
        return None;
    }
    for wrapper in ["ResponseEntity", "Task", "ActionResult", "IActionResult", "Mono", "Flux"] {
        if let Some(rest) = trimmed.strip_prefix(wrapper) {
            let inner = rest.trim_start_matches('<').trim_end_matches('>').trim();
            if inner.is_empty() {
                return None;
            }
            return Some(inner.to_string());
        }
    }
    Some(trimmed.to_string())
}
