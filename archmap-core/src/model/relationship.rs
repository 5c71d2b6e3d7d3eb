//! Generic directed edges between model entities.

use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceLevel;

/// Kind of a directed relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    DependsOn,
    PublishesTo,
    SubscribesTo,
    Owns,
    Uses,
}

impl RelationshipKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::DependsOn => "DEPENDS_ON",
            Self::PublishesTo => "PUBLISHES_TO",
            Self::SubscribesTo => "SUBSCRIBES_TO",
            Self::Owns => "OWNS",
            Self::Uses => "USES",
        }
    }
}

/// A directed edge between two entities, keyed by string ids.
///
/// The model stays a flat edge list; cycles are legal and cycle detection
/// is the consumer's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source_id: String,
    pub target_id: String,
    pub kind: RelationshipKind,
    #[serde(default)]
    pub description: String,
    /// Id of the analyzer that emitted the edge.
    #[serde(default)]
    pub source_analyzer: String,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
}

impl Relationship {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        kind: RelationshipKind,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            kind,
            description: String::new(),
            source_analyzer: String::new(),
            confidence: ConfidenceLevel::High,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_source_analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.source_analyzer = analyzer.into();
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    /// Deduplication key: source + target + kind.
    pub fn semantic_key(&self) -> String {
        format!("{}|{}|{}", self.source_id, self.target_id, self.kind.name())
    }
}
