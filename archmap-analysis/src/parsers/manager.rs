//! ParserManager — routes files to the correct language grammar and
//! caches parse results.
//!
//! Several analyzers read the same dialect (the Spring, JPA, and Kafka
//! analyzers all parse Java), so parse results are cached by content
//! hash + language and shared across the whole run.

use std::path::Path;
use std::sync::Arc;

use archmap_core::errors::ParseError;
use archmap_core::model::ids::hash_content;
use moka::sync::Cache;

use super::extract::parse_source;
use super::source_unit::SourceUnit;
use crate::scanner::language::Language;

const DEFAULT_CACHE_CAPACITY: u64 = 2_048;

/// Routes source text to the right grammar and caches the extraction.
pub struct ParserManager {
    cache: Cache<(u64, Language), Arc<SourceUnit>>,
}

impl ParserManager {
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: u64) -> Self {
        Self {
            cache: Cache::new(capacity),
        }
    }

    /// Detect the language for a path.
    pub fn detect_language(&self, path: &Path) -> Option<Language> {
        Language::from_path(path)
    }

    /// Parse a file, using the cache when the content was seen before.
    pub fn parse(
        &self,
        source: &str,
        path: &Path,
        language: Language,
    ) -> Result<Arc<SourceUnit>, ParseError> {
        let key = (hash_content(source.as_bytes()), language);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let file = path.to_string_lossy().to_string();
        let unit = Arc::new(parse_source(source, &file, language)?);
        self.cache.insert(key, Arc::clone(&unit));
        Ok(unit)
    }

    /// Parse, detecting the language from the file extension.
    pub fn parse_detecting(
        &self,
        source: &str,
        path: &Path,
    ) -> Result<Arc<SourceUnit>, ParseError> {
        let language =
            self.detect_language(path)
                .ok_or_else(|| ParseError::GrammarNotFound {
                    language: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                })?;
        self.parse(source, path, language)
    }

    pub fn cache_entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl Default for ParserManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_hits_the_cache() {
        let manager = ParserManager::new();
        let source = "class A:\n    pass\n";
        let first = manager
            .parse(source, Path::new("a.py"), Language::Python)
            .unwrap();
        let second = manager
            .parse(source, Path::new("b.py"), Language::Python)
            .unwrap();
        // Cache key is content+language, so the second parse reuses the
        // first unit (including its recorded file name).
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.cache_entry_count(), 1);
    }

    #[test]
    fn unknown_extension_has_no_grammar() {
        let manager = ParserManager::new();
        let result = manager.parse_detecting("x", Path::new("file.xyz"));
        assert!(matches!(result, Err(ParseError::GrammarNotFound { .. })));
    }
}
