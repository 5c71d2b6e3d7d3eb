//! Per-file pre-filter: filename conventions, path hints, content
//! evidence. Ordered fast-to-slow; the content stage runs only after the
//! kernel already read the file.

use aho_corasick::AhoCorasick;
use archmap_core::scan::DiscoveredFile;

/// Outcome of the I/O-free stages of the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameDecision {
    /// Reject without reading the file.
    Skip,
    /// Accept without reading further evidence.
    Pass,
    /// Read the file and require a content marker.
    NeedContent,
}

/// Cheap per-file gate evaluated inside `scan` for every candidate.
#[derive(Debug, Default)]
pub struct PreFilter {
    name_patterns: Vec<glob::Pattern>,
    markers: Option<AhoCorasick>,
}

impl PreFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filename conventions (e.g. `*Controller.cs`, `pom.xml`). Matched
    /// against the file name and the root-relative path.
    pub fn with_name_patterns(mut self, patterns: &[&str]) -> Self {
        self.name_patterns = patterns
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect();
        self
    }

    /// Content evidence markers (imports, annotations, decorators).
    /// Substring search, not regex — this stage runs on every candidate.
    pub fn with_markers(mut self, markers: &[&str]) -> Self {
        self.markers = AhoCorasick::new(markers).ok();
        self
    }

    /// Stage 1 + 2: filename convention and path hints, no I/O.
    pub fn name_stage(&self, file: &DiscoveredFile) -> NameDecision {
        let file_name = file
            .relative
            .rsplit('/')
            .next()
            .unwrap_or(file.relative.as_str());

        // A convention hit accepts outright; a miss can still be rescued
        // by content evidence when the analyzer declared markers. With no
        // conventions at all, markers are the only gate.
        let convention_hit = if self.name_patterns.is_empty() {
            None
        } else {
            Some(
                self.name_patterns
                    .iter()
                    .any(|p| p.matches(file_name) || p.matches(&file.relative)),
            )
        };

        if is_test_path(&file.relative) {
            return if self.markers.is_some() {
                NameDecision::NeedContent
            } else {
                NameDecision::Skip
            };
        }

        match (convention_hit, self.markers.is_some()) {
            (Some(true), _) => NameDecision::Pass,
            (Some(false), true) | (None, true) => NameDecision::NeedContent,
            (Some(false), false) => NameDecision::Skip,
            (None, false) => NameDecision::Pass,
        }
    }

    /// Stage 3: content evidence over the already-read text.
    pub fn content_stage(&self, text: &str) -> bool {
        match &self.markers {
            Some(markers) => markers.is_match(text),
            None => true,
        }
    }
}

/// Test directories get the strict treatment.
fn is_test_path(relative: &str) -> bool {
    let lowered = relative.to_ascii_lowercase();
    lowered.split('/').any(|segment| {
        segment == "test" || segment == "tests" || segment == "spec" || segment == "__tests__"
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn file(rel: &str) -> DiscoveredFile {
        DiscoveredFile {
            path: PathBuf::from(format!("/p/{rel}")),
            relative: rel.to_string(),
            size_bytes: 10,
        }
    }

    #[test]
    fn convention_match_passes_without_content() {
        let filter = PreFilter::new()
            .with_name_patterns(&["*Controller.java"])
            .with_markers(&["@RestController"]);
        assert_eq!(
            filter.name_stage(&file("src/main/java/UserController.java")),
            NameDecision::Pass
        );
    }

    #[test]
    fn miss_falls_back_to_content_evidence() {
        let filter = PreFilter::new()
            .with_name_patterns(&["*Controller.java"])
            .with_markers(&["@RestController"]);
        assert_eq!(
            filter.name_stage(&file("src/main/java/Routes.java")),
            NameDecision::NeedContent
        );
        assert!(filter.content_stage("@RestController public class Routes {}"));
        assert!(!filter.content_stage("public class Routes {}"));
    }

    #[test]
    fn miss_without_markers_skips() {
        let filter = PreFilter::new().with_name_patterns(&["pom.xml"]);
        assert_eq!(filter.name_stage(&file("build.gradle")), NameDecision::Skip);
        assert_eq!(filter.name_stage(&file("pom.xml")), NameDecision::Pass);
    }

    #[test]
    fn test_paths_require_content_evidence() {
        let filter = PreFilter::new()
            .with_name_patterns(&["*Controller.java"])
            .with_markers(&["@RestController"]);
        assert_eq!(
            filter.name_stage(&file("src/test/java/UserController.java")),
            NameDecision::NeedContent
        );

        let no_markers = PreFilter::new().with_name_patterns(&["*Controller.java"]);
        assert_eq!(
            no_markers.name_stage(&file("src/test/java/UserController.java")),
            NameDecision::Skip
        );
    }
}
