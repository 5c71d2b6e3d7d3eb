//! The per-run file index: glob queries over the walked set plus capped
//! file reads.

use std::sync::Arc;

use archmap_core::errors::ScanError;
use archmap_core::scan::{DiscoveredFile, FileSet};

/// Read-only view over one scan root's files.
///
/// The underlying set was walked once by the driver; `find_files` is a
/// pure in-memory glob match and `read_text` enforces the configured
/// size cap so no analyzer can pull an unbounded file into memory.
#[derive(Clone)]
pub struct FileIndex {
    files: Arc<FileSet>,
    max_file_size: u64,
}

impl FileIndex {
    pub fn new(files: Arc<FileSet>, max_file_size: u64) -> Self {
        Self {
            files,
            max_file_size,
        }
    }

    pub fn file_set(&self) -> &FileSet {
        &self.files
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Lazily yield files matching the glob, in sorted path order.
    pub fn find_files<'a>(&'a self, pattern: &str) -> impl Iterator<Item = &'a DiscoveredFile> + 'a {
        let pattern = pattern.to_string();
        self.files
            .iter()
            .filter(move |f| matches_glob(&pattern, &f.relative))
    }

    /// Lazily yield files matching any of the globs.
    pub fn find_files_any<'a>(
        &'a self,
        patterns: &'a [String],
    ) -> impl Iterator<Item = &'a DiscoveredFile> + 'a {
        self.files.find_any(patterns)
    }

    /// Read a file as UTF-8 text, enforcing the size cap.
    ///
    /// Oversized files surface as [`ScanError::SizeLimit`] — the kernel
    /// records them as skipped, never streamed. Invalid UTF-8 is replaced
    /// lossily; source manifests are overwhelmingly UTF-8 in practice.
    pub fn read_text(&self, file: &DiscoveredFile) -> Result<String, ScanError> {
        if file.size_bytes > self.max_file_size {
            return Err(ScanError::SizeLimit {
                path: file.path.clone(),
                size: file.size_bytes,
                limit: self.max_file_size,
            });
        }
        let bytes = std::fs::read(&file.path).map_err(|source| ScanError::Read {
            path: file.path.clone(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Read a file and yield its lines.
    pub fn read_lines(&self, file: &DiscoveredFile) -> Result<Vec<String>, ScanError> {
        Ok(self.read_text(file)?.lines().map(String::from).collect())
    }
}

fn matches_glob(pattern: &str, relative: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|p| {
            p.matches_with(
                relative,
                glob::MatchOptions {
                    case_sensitive: true,
                    require_literal_separator: true,
                    require_literal_leading_dot: false,
                },
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn index_for(dir: &Path, files: &[(&str, &str)], cap: u64) -> FileIndex {
        let mut discovered = Vec::new();
        for (rel, content) in files {
            let path = dir.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&path, content).unwrap();
            discovered.push(DiscoveredFile {
                path,
                relative: rel.to_string(),
                size_bytes: content.len() as u64,
            });
        }
        FileIndex::new(Arc::new(FileSet::new(discovered)), cap)
    }

    #[test]
    fn read_text_returns_content() {
        let dir = tempfile::tempdir().unwrap();
        let index = index_for(dir.path(), &[("a.txt", "hello")], 1024);
        let file = index.find_files("a.txt").next().unwrap().clone();
        assert_eq!(index.read_text(&file).unwrap(), "hello");
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let index = index_for(dir.path(), &[("big.sql", "0123456789")], 4);
        let file = index.find_files("big.sql").next().unwrap().clone();
        assert!(matches!(
            index.read_text(&file),
            Err(ScanError::SizeLimit { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let index = FileIndex::new(Arc::new(FileSet::new(vec![DiscoveredFile {
            path: PathBuf::from("/nonexistent/x.txt"),
            relative: "x.txt".to_string(),
            size_bytes: 1,
        }])), 1024);
        let file = index.find_files("x.txt").next().unwrap().clone();
        assert!(matches!(index.read_text(&file), Err(ScanError::Read { .. })));
    }
}
