//! Logical architecture components.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceLevel;
use super::ids::component_id;

/// What kind of logical unit a component is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    Service,
    Library,
    Database,
    Queue,
    Cache,
    Gateway,
    Frontend,
    Unknown,
}

impl ComponentType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Service => "SERVICE",
            Self::Library => "LIBRARY",
            Self::Database => "DATABASE",
            Self::Queue => "QUEUE",
            Self::Cache => "CACHE",
            Self::Gateway => "GATEWAY",
            Self::Frontend => "FRONTEND",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// A logical unit of architecture (a service, a library, a database, …).
///
/// The id is derived from the name via [`component_id`], so two analyzers
/// that discover the same component by name agree on its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    pub component_type: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Technology tag, e.g. "spring-boot", "fastapi", "postgres".
    #[serde(default)]
    pub technology: String,
    /// Where the component was discovered (manifest or directory path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
}

impl Component {
    /// Create a component; the id is computed from the name.
    pub fn new(name: impl Into<String>, component_type: ComponentType) -> Self {
        let name = name.into();
        Self {
            id: component_id(&name),
            name,
            component_type,
            description: None,
            technology: String::new(),
            source_location: None,
            metadata: BTreeMap::new(),
            confidence: ConfidenceLevel::High,
        }
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = technology.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source_location(mut self, location: impl Into<String>) -> Self {
        self.source_location = Some(location.into());
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    /// Deduplication key within an [`super::ArchitectureModel`].
    pub fn semantic_key(&self) -> String {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_derived_from_name() {
        let a = Component::new("billing", ComponentType::Service);
        let b = Component::new("billing", ComponentType::Library);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, component_id("billing"));
    }
}
