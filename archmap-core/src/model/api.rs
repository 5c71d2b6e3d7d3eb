//! Public API operations.

use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceLevel;

/// Protocol family of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiKind {
    Rest,
    GraphqlQuery,
    GraphqlMutation,
    GraphqlSubscription,
    Grpc,
}

/// One public operation exposed by a component.
///
/// For REST, `path` is the normalized route (leading `/`, class-level and
/// method-level templates concatenated) and `method` the HTTP verb. For
/// GraphQL, `path` is the operation name and `method` is
/// QUERY/MUTATION/SUBSCRIPTION. For gRPC, `path` is `Service/Rpc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    pub component_id: String,
    pub kind: ApiKind,
    pub path: String,
    pub method: String,
    /// Handler label (class.method or function name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    /// Parameter descriptors labelled by source: `Route:id`, `Query:page`,
    /// `Body:CreateUserRequest`, `Header:X-Tenant`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
}

impl ApiEndpoint {
    pub fn new(
        component_id: impl Into<String>,
        kind: ApiKind,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            kind,
            path: normalize_path(kind, path.into()),
            method: method.into(),
            handler: None,
            parameters: Vec::new(),
            request_schema: None,
            response_schema: None,
            auth: None,
            confidence: ConfidenceLevel::High,
        }
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn with_request_schema(mut self, schema: impl Into<String>) -> Self {
        self.request_schema = Some(schema.into());
        self
    }

    pub fn with_response_schema(mut self, schema: impl Into<String>) -> Self {
        self.response_schema = Some(schema.into());
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    /// Deduplication key: component + method + path.
    pub fn semantic_key(&self) -> String {
        format!("{}|{}|{}", self.component_id, self.method, self.path)
    }
}

/// REST paths always carry a leading slash; other kinds keep the raw name.
fn normalize_path(kind: ApiKind, path: String) -> String {
    match kind {
        ApiKind::Rest => {
            if path.is_empty() {
                "/".to_string()
            } else if path.starts_with('/') {
                path
            } else {
                format!("/{path}")
            }
        }
        _ => path,
    }
}

/// Join a class-level path template with a method-level one.
pub fn join_paths(base: &str, suffix: &str) -> String {
    let base = base.trim_end_matches('/');
    let suffix = suffix.trim_start_matches('/');
    match (base.is_empty(), suffix.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{suffix}"),
        (false, true) => base.to_string(),
        (false, false) => format!("{base}/{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_paths_get_leading_slash() {
        let ep = ApiEndpoint::new("c", ApiKind::Rest, "GET", "api/users");
        assert_eq!(ep.path, "/api/users");
    }

    #[test]
    fn graphql_paths_stay_raw() {
        let ep = ApiEndpoint::new("c", ApiKind::GraphqlQuery, "QUERY", "getUser");
        assert_eq!(ep.path, "getUser");
    }

    #[test]
    fn join_handles_slash_boundaries() {
        assert_eq!(join_paths("/api/users", "/{id}"), "/api/users/{id}");
        assert_eq!(join_paths("/api/users", ""), "/api/users");
        assert_eq!(join_paths("", "users"), "/users");
        assert_eq!(join_paths("", ""), "/");
    }
}
