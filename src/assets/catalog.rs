use std::path::{Path, PathBuf};

/// Extensions the catalog will list
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["ply", "splat", "glb"];

/// Lists loadable asset files in `dir`, sorted by name.
///
/// A missing or unreadable directory means "no assets", not an error.
pub fn list_assets(dir: impl AsRef<Path>) -> Vec<PathBuf> {
    let dir = dir.as_ref();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read asset directory {:?}: {}", dir, e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_allowed(path))
        .collect();
    files.sort();

    log::info!("Found {} assets in {:?}", files.len(), dir);
    files
}

fn is_allowed(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}
