//! Per-file findings produced by an extractor before confidence
//! stamping.

use archmap_core::model::{
    ApiEndpoint, Component, ConfidenceLevel, DataEntity, Dependency, MessageFlow, Relationship,
};
use archmap_core::scan::ScanResultBuilder;

/// Findings from one file, owned by the kernel until the tier decision
/// stamped them and committed them to the result builder.
#[derive(Debug, Default)]
pub struct Findings {
    pub components: Vec<Component>,
    pub dependencies: Vec<Dependency>,
    pub endpoints: Vec<ApiEndpoint>,
    pub flows: Vec<MessageFlow>,
    pub entities: Vec<DataEntity>,
    pub relationships: Vec<Relationship>,
    pub warnings: Vec<String>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
            && self.dependencies.is_empty()
            && self.endpoints.is_empty()
            && self.flows.is_empty()
            && self.entities.is_empty()
            && self.relationships.is_empty()
    }

    pub fn count(&self) -> usize {
        self.components.len()
            + self.dependencies.len()
            + self.endpoints.len()
            + self.flows.len()
            + self.entities.len()
            + self.relationships.len()
    }

    /// Cap every finding's confidence at `level`.
    ///
    /// Capping (rather than overwriting) keeps confidence monotone: a
    /// tier-2 pass can never upgrade what an extractor stamped, and an
    /// extractor that deliberately emitted `Low` keeps it through tier 1.
    pub fn cap_confidence(&mut self, level: ConfidenceLevel) {
        for c in &mut self.components {
            c.confidence = c.confidence.min(level);
        }
        for d in &mut self.dependencies {
            d.confidence = d.confidence.min(level);
        }
        for e in &mut self.endpoints {
            e.confidence = e.confidence.min(level);
        }
        for f in &mut self.flows {
            f.confidence = f.confidence.min(level);
        }
        for e in &mut self.entities {
            e.confidence = e.confidence.min(level);
        }
        for r in &mut self.relationships {
            r.confidence = r.confidence.min(level);
        }
    }

    /// Move everything into the result builder.
    pub fn commit(self, builder: &mut ScanResultBuilder) {
        for c in self.components {
            builder.component(c);
        }
        for d in self.dependencies {
            builder.dependency(d);
        }
        for e in self.endpoints {
            builder.endpoint(e);
        }
        for f in self.flows {
            builder.flow(f);
        }
        for e in self.entities {
            builder.entity(e);
        }
        for r in self.relationships {
            builder.relationship(r);
        }
        for w in self.warnings {
            builder.warning(w);
        }
    }
}

#[cfg(test)]
mod tests {
    use archmap_core::model::{ApiKind, ConfidenceLevel};

    use super::*;

    #[test]
    fn cap_never_upgrades() {
        let mut findings = Findings::new();
        findings.endpoints.push(
            ApiEndpoint::new("c", ApiKind::Rest, "GET", "/x")
                .with_confidence(ConfidenceLevel::Low),
        );
        findings.cap_confidence(ConfidenceLevel::High);
        assert_eq!(findings.endpoints[0].confidence, ConfidenceLevel::Low);

        findings.endpoints.push(ApiEndpoint::new("c", ApiKind::Rest, "GET", "/y"));
        findings.cap_confidence(ConfidenceLevel::Medium);
        assert_eq!(findings.endpoints[1].confidence, ConfidenceLevel::Medium);
    }
}
