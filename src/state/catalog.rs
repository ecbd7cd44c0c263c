//! The image catalog: filenames discovered in the open images directory.
//!
//! Scanned once when a folder is opened and immutable for the session.
//! Ordering is filesystem discovery order; it is not guaranteed to be
//! stable across runs.

use crate::config;
use crate::error::Result;
use crate::state::pagination;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The set of image filenames in the source folder.
#[derive(Debug)]
pub struct Catalog {
    dir: PathBuf,
    files: Vec<String>,
}

impl Catalog {
    /// Scan `dir` (non-recursively) for image files.
    ///
    /// Non-image entries, subdirectories, and the settings sidecar are
    /// skipped by the extension filter.
    pub fn scan(dir: &Path) -> Result<Self> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if config::is_image_file(&name) {
                files.push(name);
            }
        }

        log::info!("scanned {}: {} images", dir.display(), files.len());

        Ok(Self {
            dir: dir.to_path_buf(),
            files,
        })
    }

    /// The directory this catalog was scanned from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All filenames, in discovery order.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Absolute path of a catalog file.
    pub fn path_of(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Number of pages at the fixed page size.
    pub fn page_count(&self) -> usize {
        pagination::page_count(self.files.len(), config::PAGE_SIZE)
    }

    /// The slice of filenames visible on `page`.
    pub fn visible_slice(&self, page: usize) -> &[String] {
        &self.files[pagination::visible_range(self.files.len(), config::PAGE_SIZE, page)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_filters_to_image_extensions() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.jpg"), b"x").unwrap();
        fs::write(tmp.path().join("b.PNG"), b"x").unwrap();
        fs::write(tmp.path().join("categorised.json"), b"{}").unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested").join("c.jpg"), b"x").unwrap();

        let catalog = Catalog::scan(tmp.path()).unwrap();
        let mut files = catalog.files().to_vec();
        files.sort();

        assert_eq!(files, vec!["a.jpg".to_string(), "b.PNG".to_string()]);
    }

    #[test]
    fn test_scan_missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(Catalog::scan(&missing).is_err());
    }

    #[test]
    fn test_visible_slice_and_page_count() {
        let tmp = tempfile::tempdir().unwrap();
        for i in 0..20 {
            fs::write(tmp.path().join(format!("img{i:02}.jpg")), b"x").unwrap();
        }

        let catalog = Catalog::scan(tmp.path()).unwrap();
        assert_eq!(catalog.len(), 20);
        assert_eq!(catalog.page_count(), 2);
        assert_eq!(catalog.visible_slice(0).len(), 16);
        assert_eq!(catalog.visible_slice(1).len(), 4);
    }
}
