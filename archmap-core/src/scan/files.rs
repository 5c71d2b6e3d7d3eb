//! The in-memory file set handed to analyzers.
//!
//! The walker discovers files once per run; analyzers and applicability
//! strategies query the sorted set with globs instead of re-walking the
//! tree.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the scan root, with `/` separators.
    pub relative: String,
    pub size_bytes: u64,
}

/// Immutable, sorted collection of discovered files.
///
/// Glob matching: `**` spans directories, `*` stays within a segment,
/// matching is case-sensitive and runs against the root-relative path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSet {
    files: Vec<DiscoveredFile>,
}

impl FileSet {
    /// Build a file set; files are sorted by relative path for
    /// deterministic iteration.
    pub fn new(mut files: Vec<DiscoveredFile>) -> Self {
        files.sort_by(|a, b| a.relative.cmp(&b.relative));
        files.dedup_by(|a, b| a.relative == b.relative);
        Self { files }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiscoveredFile> {
        self.files.iter()
    }

    /// Lazily yield files whose relative path matches the glob.
    pub fn find(&self, pattern: &str) -> impl Iterator<Item = &DiscoveredFile> + '_ {
        let compiled = glob::Pattern::new(pattern).ok();
        let options = match_options();
        self.files.iter().filter(move |f| {
            compiled
                .as_ref()
                .is_some_and(|p| p.matches_with(&f.relative, options))
        })
    }

    /// Lazily yield files matching any of the globs (deduplicated by the
    /// sorted order of the underlying set).
    pub fn find_any<'a>(
        &'a self,
        patterns: &'a [String],
    ) -> impl Iterator<Item = &'a DiscoveredFile> + 'a {
        let compiled: Vec<glob::Pattern> = patterns
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect();
        let options = match_options();
        self.files.iter().filter(move |f| {
            compiled
                .iter()
                .any(|p| p.matches_with(&f.relative, options))
        })
    }

    /// True iff any file matches any of the globs.
    pub fn has_match(&self, patterns: &[&str]) -> bool {
        let options = match_options();
        patterns.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| self.files.iter().any(|f| p.matches_with(&f.relative, options)))
                .unwrap_or(false)
        })
    }

    /// Relativize an absolute path against a root the way the walker does.
    pub fn relativize(root: &Path, path: &Path) -> String {
        path.strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// `*` must not cross `/`; `**` handles multi-segment matching.
fn match_options() -> glob::MatchOptions {
    glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(rel: &str) -> DiscoveredFile {
        DiscoveredFile {
            path: PathBuf::from(format!("/project/{rel}")),
            relative: rel.to_string(),
            size_bytes: 1,
        }
    }

    fn sample() -> FileSet {
        FileSet::new(vec![
            file("pom.xml"),
            file("src/main/java/App.java"),
            file("src/main/java/api/UserController.java"),
            file("app/main.py"),
            file("Gemfile"),
        ])
    }

    #[test]
    fn double_star_spans_directories() {
        let set = sample();
        let hits: Vec<_> = set.find("**/*.java").map(|f| f.relative.clone()).collect();
        assert_eq!(
            hits,
            vec![
                "src/main/java/App.java".to_string(),
                "src/main/java/api/UserController.java".to_string(),
            ]
        );
    }

    #[test]
    fn single_star_stays_in_segment() {
        let set = sample();
        assert_eq!(set.find("src/*.java").count(), 0);
        assert_eq!(set.find("*.xml").count(), 1);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let set = sample();
        assert!(set.has_match(&["Gemfile"]));
        assert!(!set.has_match(&["gemfile"]));
    }

    #[test]
    fn iteration_is_sorted() {
        let set = FileSet::new(vec![file("b.txt"), file("a.txt")]);
        let order: Vec<_> = set.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(order, vec!["a.txt".to_string(), "b.txt".to_string()]);
    }
}
