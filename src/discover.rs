//! Input file discovery.

use crate::error::DiscoverError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct DiscoveredFiles {
    pub root: PathBuf,
    /// Absolute paths, sorted.
    pub files: Vec<PathBuf>,
}

impl DiscoveredFiles {
    pub fn total(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Recursively collects every file under `root` whose extension is
/// `extension` (without the leading dot).
pub fn discover_files<P: AsRef<Path>>(
    root: P,
    extension: &str,
) -> Result<DiscoveredFiles, DiscoverError> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(DiscoverError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DiscoverError::NotADirectory(root.to_path_buf()));
    }
    let root = root.canonicalize().map_err(|source| DiscoverError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry under {:?}: {}", root, err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension() == Some(OsStr::new(extension)) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    Ok(DiscoveredFiles { root, files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn finds_nested_files_with_extension() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("A/B/C")).unwrap();
        fs::create_dir_all(dir.path().join("A/A/B")).unwrap();
        fs::write(dir.path().join("A/B/C/TRABCEI128F424C983.json"), "{}").unwrap();
        fs::write(dir.path().join("A/A/B/TRAABJL12903CDCF1A.json"), "{}").unwrap();
        fs::write(dir.path().join("top.json"), "{}").unwrap();
        fs::write(dir.path().join("A/notes.txt"), "").unwrap();
        fs::write(dir.path().join("A/B/archive.json.bak"), "").unwrap();

        let found = discover_files(dir.path(), "json").unwrap();

        assert_eq!(found.total(), 3);
        for path in &found.files {
            assert!(path.is_absolute());
            assert!(path.exists());
            assert_eq!(path.extension(), Some(OsStr::new("json")));
        }
    }

    #[test]
    fn empty_root_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("2018/11")).unwrap();

        let found = discover_files(dir.path(), "json").unwrap();

        assert!(found.is_empty());
        assert_eq!(found.total(), 0);
    }

    #[test]
    fn missing_root_is_path_not_found() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("log_data");

        let result = discover_files(&missing, "json");

        assert!(matches!(result, Err(DiscoverError::PathNotFound(p)) if p == missing));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("events.json");
        fs::write(&file, "{}").unwrap();

        let result = discover_files(&file, "json");

        assert!(matches!(result, Err(DiscoverError::NotADirectory(p)) if p == file));
    }

    #[test]
    fn dot_segments_in_root_are_normalized() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        let dotted = dir.path().join(".").join("..").join(dir.path().file_name().unwrap());

        let found = discover_files(&dotted, "json").unwrap();

        assert_eq!(found.total(), 1);
        assert!(found.root.is_absolute());
        assert!(!found.files[0].to_string_lossy().contains(".."));
    }
}
