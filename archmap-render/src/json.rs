//! JSON generator: the canonical machine-readable model dump.

use archmap_core::model::ArchitectureModel;

use crate::{Generator, RenderError, RenderedFile};

pub struct JsonGenerator;

impl Generator for JsonGenerator {
    fn id(&self) -> &'static str {
        "json"
    }

    fn display_name(&self) -> &'static str {
        "JSON model dump"
    }

    fn generate(&self, model: &ArchitectureModel) -> Result<Vec<RenderedFile>, RenderError> {
        let content = model.to_canonical_json()?;
        Ok(vec![RenderedFile {
            relative_path: "architecture.json".to_string(),
            content,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_is_canonical() {
        let model = ArchitectureModel::new("shop", "1.0");
        let first = JsonGenerator.generate(&model).unwrap();
        let second = JsonGenerator.generate(&model).unwrap();
        assert_eq!(first[0].content, second[0].content);
    }
}
