//! The canonical architecture model.
//!
//! All entities are immutable values: mandatory fields are validated at
//! construction, optional fields default to empty collections. Analyzers
//! create them during `scan`; the aggregator re-owns them into the
//! [`ArchitectureModel`] without mutation.

pub mod api;
pub mod architecture;
pub mod component;
pub mod confidence;
pub mod data;
pub mod dependency;
pub mod ids;
pub mod messaging;
pub mod relationship;

pub use api::{ApiEndpoint, ApiKind};
pub use architecture::{ArchitectureModel, ConfidenceHistogram, QualityReport};
pub use component::{Component, ComponentType};
pub use confidence::ConfidenceLevel;
pub use data::{DataEntity, EntityField};
pub use dependency::{Dependency, DependencyScope};
pub use messaging::MessageFlow;
pub use relationship::{Relationship, RelationshipKind};
