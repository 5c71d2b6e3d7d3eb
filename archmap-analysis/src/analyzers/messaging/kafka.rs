//! Kafka analyzer: `@KafkaListener` consumers and `KafkaTemplate.send`
//! producers in Java sources.

use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::MessageFlow;
use archmap_core::scan::{DiscoveredFile, ScanContext, ScanResult, ScanResultBuilder};

use crate::analyzers::{claim_project_component, finish_scan_with, priority, Analyzer};
use crate::kernel::{AnalyzerKernel, AnalyzerServices, Findings, PreFilter};
use crate::parsers::ParserManager;
use crate::scanner::language::Language;
use crate::strategies::{has_java, Strategy};

pub struct KafkaAnalyzer {
    kernel: AnalyzerKernel,
    parsers: Arc<ParserManager>,
}

pub fn construct(services: &AnalyzerServices) -> Result<Box<dyn Analyzer>, String> {
    Ok(Box::new(KafkaAnalyzer {
        kernel: AnalyzerKernel::new("kafka-flows", services),
        parsers: Arc::clone(&services.parsers),
    }))
}

impl Analyzer for KafkaAnalyzer {
    fn id(&self) -> &'static str {
        "kafka-flows"
    }

    fn display_name(&self) -> &'static str {
        "Kafka message flows"
    }

    fn languages(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn file_globs(&self) -> Vec<String> {
        vec!["**/*.java".into(), "*.java".into()]
    }

    fn priority(&self) -> i32 {
        priority::API
    }

    fn strategy(&self) -> Strategy {
        has_java()
    }

    fn scan(&self, ctx: &ScanContext) -> ScanResult {
        let (component_id, fallback) = claim_project_component(ctx);
        let mut builder = ScanResultBuilder::new(self.id());
        let prefilter = PreFilter::new().with_markers(&["@KafkaListener", "KafkaTemplate"]);
        let parsers = Arc::clone(&self.parsers);
        let timed_out = self.kernel.process_files(
            ctx,
            &self.file_globs(),
            &prefilter,
            &|file, text| extract_flows(&parsers, &component_id, file, text),
            None,
            &mut builder,
        );
        finish_scan_with(builder, fallback, timed_out)
    }
}

fn extract_flows(
    parsers: &ParserManager,
    component_id: &str,
    file: &DiscoveredFile,
    text: &str,
) -> Result<Findings, ParseError> {
    let unit = parsers.parse(text, &file.path, Language::Java)?;
    if unit.has_errors {
        return Err(ParseError::Syntax {
            path: file.path.clone(),
            message: format!("{} syntax errors in tree", unit.error_count),
        });
    }

    let mut findings = Findings::new();

    // Consumers: @KafkaListener(topics = "orders") on handler methods.
    for class in &unit.classes {
        for method in &class.methods {
            let Some(annotation) = method
                .annotations
                .iter()
                .find(|a| a.name == "KafkaListener")
            else {
                continue;
            };
            let topic = annotation
                .named_arg("topics")
                .or_else(|| annotation.first_positional())
                .unwrap_or("default");
            let message_type = method
                .params
                .first()
                .and_then(|p| p.type_annotation.clone())
                .unwrap_or_else(|| "Unknown".to_string());

            findings.flows.push(
                MessageFlow::new(topic, message_type, "kafka")
                    .with_subscriber(component_id),
            );
        }
    }

    // Producers: kafkaTemplate.send("topic", payload).
    for call in &unit.calls {
        let is_template = call
            .receiver
            .as_deref()
            .is_some_and(|r| r.to_lowercase().contains("kafkatemplate") || r == "template");
        if !is_template || call.name != "send" {
            continue;
        }
        let Some(topic) = call.first_string_arg() else {
            continue;
        };
        let message_type = call
            .args
            .iter()
            .filter(|a| a.name.is_none())
            .nth(1)
            .map(|a| a.value.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        findings.flows.push(
            MessageFlow::new(topic, message_type, "kafka").with_publisher(component_id),
        );
    }

    Ok(findings)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn listener_and_producer_flows() {
        let source = r#"
import org.springframework.kafka.annotation.KafkaListener;

public class OrderEvents {
    @KafkaListener(topics = "order-created")
    public void onOrderCreated(OrderCreatedEvent event) { }

    public void publish(OrderShippedEvent event) {
        kafkaTemplate.send("order-shipped", event);
    }
}
"#;
        let file = DiscoveredFile {
            path: PathBuf::from("/p/OrderEvents.java"),
            relative: "src/OrderEvents.java".to_string(),
            size_bytes: 1,
        };
        let parsers = ParserManager::new();
        let findings = extract_flows(&parsers, "svc", &file, source).unwrap();

        assert_eq!(findings.flows.len(), 2);
        let consumer = &findings.flows[0];
        assert_eq!(consumer.topic, "order-created");
        assert_eq!(consumer.message_type, "OrderCreatedEvent");
        assert_eq!(consumer.subscriber_component_id.as_deref(), Some("svc"));

        let producer = &findings.flows[1];
        assert_eq!(producer.topic, "order-shipped");
        assert_eq!(producer.publisher_component_id.as_deref(), Some("svc"));
    }
}
