//! Parallel file walker using the `ignore` crate's `WalkParallel`.
//!
//! Supports `.archmapignore` (gitignore syntax, hierarchical) and a
//! default ignore set covering common build and dependency directories.

use std::collections::HashSet;
use std::path::Path;

use archmap_core::config::ScannersConfig;
use archmap_core::errors::ScanError;
use archmap_core::scan::{DiscoveredFile, FileSet};
use crossbeam_channel as channel;

/// Default ignore patterns applied to every scan.
pub const DEFAULT_IGNORES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "target",
    ".next",
    "__pycache__",
    ".pytest_cache",
    "coverage",
    ".nyc_output",
    "vendor",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
    "bin",
    "obj",
    ".idea",
];

/// Walk a directory tree in parallel, collecting discovered files.
///
/// Respects `.gitignore`, `.archmapignore`, and the default ignore set.
/// Symlinks are followed only when configured; the (device, inode) guard
/// below drops files reached twice through links. The returned set is
/// sorted by relative path for deterministic downstream iteration.
pub fn walk_directory(root: &Path, config: &ScannersConfig) -> Result<FileSet, ScanError> {
    if !root.exists() {
        return Err(ScanError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let (tx, rx) = channel::unbounded();

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .add_custom_ignore_filename(".archmapignore")
        .follow_links(config.effective_follow_symlinks());

    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in DEFAULT_IGNORES {
        let _ = overrides.add(&format!("!{pattern}/**"));
        let _ = overrides.add(&format!("!{pattern}"));
    }
    for pattern in &config.extra_ignore {
        let _ = overrides.add(&format!("!{pattern}"));
    }
    if let Ok(built) = overrides.build() {
        builder.overrides(built);
    }

    let walker = builder.build_parallel();
    walker.run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => return ignore::WalkState::Continue,
            };

            match entry.file_type() {
                Some(ft) if ft.is_file() => {}
                _ => return ignore::WalkState::Continue,
            }

            let path = entry.path().to_path_buf();
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(_) => return ignore::WalkState::Continue,
            };

            let _ = tx.send((path, metadata.len(), file_identity(&entry)));
            ignore::WalkState::Continue
        })
    });
    drop(tx);

    let mut seen_identities: HashSet<(u64, u64)> = HashSet::new();
    let mut files = Vec::new();
    for (path, size_bytes, identity) in rx.into_iter() {
        if let Some(identity) = identity {
            if !seen_identities.insert(identity) {
                continue;
            }
        }
        let relative = FileSet::relativize(root, &path);
        files.push(DiscoveredFile {
            path,
            relative,
            size_bytes,
        });
    }

    Ok(FileSet::new(files))
}

/// (device, inode) on unix; None elsewhere, where path dedup suffices.
#[cfg(unix)]
fn file_identity(entry: &ignore::DirEntry) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    entry.metadata().ok().map(|m| (m.dev(), m.ino()))
}

#[cfg(not(unix))]
fn file_identity(_entry: &ignore::DirEntry) -> Option<(u64, u64)> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walk_finds_files_and_sorts_them() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/b.py"), "x = 1\n").unwrap();
        fs::write(dir.path().join("a.txt"), "hello\n").unwrap();

        let set = walk_directory(dir.path(), &ScannersConfig::default()).unwrap();
        let relative: Vec<_> = set.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(relative, vec!["a.txt".to_string(), "src/b.py".to_string()]);
    }

    #[test]
    fn default_ignores_exclude_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(dir.path().join("app.js"), "x").unwrap();

        let set = walk_directory(dir.path(), &ScannersConfig::default()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().relative, "app.js");
    }

    #[test]
    fn missing_root_is_an_error() {
        let result = walk_directory(Path::new("/nonexistent/archmap-root"), &ScannersConfig::default());
        assert!(matches!(result, Err(ScanError::RootNotFound { .. })));
    }
}
