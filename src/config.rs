//! Application constants and well-known paths.

use std::path::{Path, PathBuf};

/// Name of the settings sidecar stored inside the images directory.
pub const SETTINGS_FILE: &str = "categorised.json";

/// Name of the export directory, created next to the images directory.
pub const EXPORT_DIR: &str = "tf_dataset";

/// Subfolder of the export tree holding the balanced uncategorized sample.
pub const NOT_CATEGORIZED_DIR: &str = "notCategorized";

/// Reserved category whose members are dropped from the export entirely.
pub const EXCLUDE_CATEGORY: &str = "exclude";

/// Category present in a freshly created session.
pub const DEFAULT_CATEGORY: &str = "cat1";

/// Images directory tried at startup before the user picks one.
pub const DEFAULT_IMAGES_DIR: &str = "images";

/// Number of images shown per page.
pub const PAGE_SIZE: usize = 16;

/// Longest edge of grid thumbnails, in pixels.
pub const THUMBNAIL_EDGE: u32 = 256;

/// Supported image file extensions for scanning directories.
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Path of the settings sidecar for a given images directory.
pub fn settings_path(images_dir: &Path) -> PathBuf {
    images_dir.join(SETTINGS_FILE)
}

/// Path of the export tree for a given images directory (sibling directory).
pub fn export_dir(images_dir: &Path) -> PathBuf {
    match images_dir.parent() {
        Some(parent) => parent.join(EXPORT_DIR),
        None => PathBuf::from(EXPORT_DIR),
    }
}

/// Whether a filename carries one of the supported image extensions.
pub fn is_image_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
