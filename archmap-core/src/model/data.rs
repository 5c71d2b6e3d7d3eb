//! Persistent and wire data shapes.

use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceLevel;

/// One field of a [`DataEntity`], in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityField {
    pub name: String,
    pub field_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl EntityField {
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            nullable: false,
            default_value: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A persistent or wire data shape: a table, a GraphQL type, an Avro record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataEntity {
    pub component_id: String,
    pub name: String,
    /// Physical table or collection name, when distinct from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Entity kind tag: "table", "graphql-type", "graphql-input",
    /// "avro-record", "jpa-entity", …
    pub entity_kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EntityField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
}

impl DataEntity {
    pub fn new(
        component_id: impl Into<String>,
        name: impl Into<String>,
        entity_kind: impl Into<String>,
    ) -> Self {
        Self {
            component_id: component_id.into(),
            name: name.into(),
            table_name: None,
            entity_kind: entity_kind.into(),
            fields: Vec::new(),
            primary_key: None,
            description: None,
            confidence: ConfidenceLevel::High,
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn with_fields(mut self, fields: Vec<EntityField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_key = Some(key.into());
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    /// Deduplication key: component + name.
    pub fn semantic_key(&self) -> String {
        format!("{}|{}", self.component_id, self.name)
    }
}
