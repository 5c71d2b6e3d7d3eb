//! Asynchronous message edges.

use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceLevel;

/// One async message edge between components via a topic or queue.
///
/// Either side may be unknown: a consumer-only scan knows the subscriber
/// but not who publishes, and vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageFlow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_component_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_component_id: Option<String>,
    /// Topic or queue name.
    pub topic: String,
    pub message_type: String,
    /// Broker tag: "kafka", "sidekiq", "celery", "rest-event", …
    pub broker: String,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
}

impl MessageFlow {
    pub fn new(
        topic: impl Into<String>,
        message_type: impl Into<String>,
        broker: impl Into<String>,
    ) -> Self {
        Self {
            publisher_component_id: None,
            subscriber_component_id: None,
            topic: topic.into(),
            message_type: message_type.into(),
            broker: broker.into(),
            confidence: ConfidenceLevel::High,
        }
    }

    pub fn with_publisher(mut self, id: impl Into<String>) -> Self {
        self.publisher_component_id = Some(id.into());
        self
    }

    pub fn with_subscriber(mut self, id: impl Into<String>) -> Self {
        self.subscriber_component_id = Some(id.into());
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    /// Deduplication key: topic + publisher + subscriber.
    pub fn semantic_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.topic,
            self.publisher_component_id.as_deref().unwrap_or(""),
            self.subscriber_component_id.as_deref().unwrap_or("")
        )
    }
}
