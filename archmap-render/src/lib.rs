//! # archmap-render
//!
//! Documentation generators. Each generator consumes the aggregated
//! [`ArchitectureModel`] and returns rendered files; writing to disk is
//! the caller's job (the CLI), keeping the core file-system read-only.

pub mod json;
pub mod markdown;
pub mod mermaid;

use archmap_core::model::ArchitectureModel;

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path relative to the output directory.
    pub relative_path: String,
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A documentation generator over the architecture model.
pub trait Generator: Send + Sync {
    fn id(&self) -> &'static str;
    fn display_name(&self) -> &'static str;
    fn generate(&self, model: &ArchitectureModel) -> Result<Vec<RenderedFile>, RenderError>;
}

/// Registry of built-in generators.
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn with_builtins() -> Self {
        Self {
            generators: vec![
                Box::new(markdown::MarkdownGenerator),
                Box::new(mermaid::MermaidGenerator),
                Box::new(json::JsonGenerator),
            ],
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.generators.iter().map(|g| g.id())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Generator> {
        self.generators
            .iter()
            .find(|g| g.id() == id)
            .map(|g| g.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Generator> {
        self.generators.iter().map(|g| g.as_ref())
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
