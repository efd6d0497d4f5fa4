//! Model-folder enumeration.

use std::path::{Path, PathBuf};

use crate::error::ViewError;

/// File extension of the model documents this viewer browses.
pub const MODEL_EXTENSION: &str = "g3dj";

/// One entry from a folder enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Bare file name, e.g. `robot.g3dj`.
    pub name: String,
    /// Absolute (or folder-relative) path to the file.
    pub full_path: PathBuf,
    /// Whether the entry is hidden (dot-prefixed name).
    pub is_hidden: bool,
}

/// Enumerate the model files of `folder`, sorted by name.
///
/// Hidden entries are included with `is_hidden` set; filtering them is the
/// caller's policy. A missing or unreadable folder maps to
/// [`ViewError::NotFound`] so the caller can keep its prior listing.
pub fn enumerate_models(folder: &Path) -> Result<Vec<FileEntry>, ViewError> {
    let read = std::fs::read_dir(folder)
        .map_err(|_| ViewError::NotFound(folder.to_path_buf()))?;

    let mut entries = Vec::new();
    for entry in read {
        let entry = entry.map_err(ViewError::Io)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(MODEL_EXTENSION));
        if !matches {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        entries.push(FileEntry {
            name: name.to_owned(),
            is_hidden: name.starts_with('.'),
            full_path: path.clone(),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"{}").unwrap();
    }

    #[test]
    fn lists_matching_files_sorted() {
        let tmp = tempfile::TempDir::new().unwrap();
        touch(tmp.path(), "zebra.g3dj");
        touch(tmp.path(), "ant.g3dj");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "upper.G3DJ");
        std::fs::create_dir(tmp.path().join("sub.g3dj")).unwrap();

        let entries = enumerate_models(tmp.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ant.g3dj", "upper.G3DJ", "zebra.g3dj"]);
    }

    #[test]
    fn flags_hidden_entries() {
        let tmp = tempfile::TempDir::new().unwrap();
        touch(tmp.path(), ".secret.g3dj");
        touch(tmp.path(), "plain.g3dj");

        let entries = enumerate_models(tmp.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_hidden);
        assert!(!entries[1].is_hidden);
    }

    #[test]
    fn missing_folder_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let gone = tmp.path().join("nope");
        match enumerate_models(&gone) {
            Err(ViewError::NotFound(path)) => assert_eq!(path, gone),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
