//! Language detection from file extensions.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source dialects with a registered tree-sitter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Python,
    CSharp,
    Ruby,
    Go,
    JavaScript,
    TypeScript,
}

impl Language {
    /// Detect the language from a file extension (no leading dot).
    pub fn from_extension(ext: Option<&str>) -> Option<Self> {
        match ext?.to_ascii_lowercase().as_str() {
            "java" => Some(Self::Java),
            "py" | "pyi" => Some(Self::Python),
            "cs" => Some(Self::CSharp),
            "rb" | "rake" => Some(Self::Ruby),
            "go" => Some(Self::Go),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        Self::from_extension(path.extension().and_then(|e| e.to_str()))
    }

    /// Canonical lowercase tag (matches analyzer language tags and the
    /// GROUPS-mode group names).
    pub fn name(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Python => "python",
            Self::CSharp => "csharp",
            Self::Ruby => "ruby",
            Self::Go => "go",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
        }
    }

    /// The tree-sitter grammar for this language.
    pub fn grammar(self) -> tree_sitter::Language {
        match self {
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
            Self::Ruby => tree_sitter_ruby::LANGUAGE.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_all_registered_extensions() {
        assert_eq!(Language::from_extension(Some("java")), Some(Language::Java));
        assert_eq!(Language::from_extension(Some("py")), Some(Language::Python));
        assert_eq!(Language::from_extension(Some("cs")), Some(Language::CSharp));
        assert_eq!(Language::from_extension(Some("rb")), Some(Language::Ruby));
        assert_eq!(Language::from_extension(Some("go")), Some(Language::Go));
        assert_eq!(Language::from_extension(Some("jsx")), Some(Language::JavaScript));
        assert_eq!(Language::from_extension(Some("tsx")), Some(Language::TypeScript));
        assert_eq!(Language::from_extension(Some("txt")), None);
        assert_eq!(Language::from_extension(None), None);
    }

    #[test]
    fn grammars_load_for_every_language() {
        for lang in [
            Language::Java,
            Language::Python,
            Language::CSharp,
            Language::Ruby,
            Language::Go,
            Language::JavaScript,
            Language::TypeScript,
        ] {
            let mut parser = tree_sitter::Parser::new();
            assert!(parser.set_language(&lang.grammar()).is_ok(), "{:?}", lang);
        }
    }
}
