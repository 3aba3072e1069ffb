//! Loader Module for Lamina Compiler
//!
//! Reads persisted `.json` layer and material files from disk.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::hooks::HookRegistry;
use crate::serialize::{import_str, Imported};
use crate::validate::Result;

pub const FILE_EXTENSION: &str = "json";

pub fn load_file(path: &Path, registry: &HookRegistry) -> Result<Imported> {
    let source = fs::read_to_string(path)?;
    import_str(&source, registry)
}

/// Recursively find all `.json` files under `dir`, sorted by path.
pub fn discover_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().is_some_and(|ext| ext == FILE_EXTENSION))
        .collect();
    files.sort();
    files
}

/// Load every file under `dir`. Files that fail to load are reported and
/// skipped.
pub fn load_directory(dir: &Path, registry: &HookRegistry) -> Vec<(PathBuf, Imported)> {
    if !dir.exists() {
        log::warn!("[Lamina] Directory {:?} does not exist", dir);
        return Vec::new();
    }

    let mut loaded = Vec::new();
    for path in discover_files(dir) {
        match load_file(&path, registry) {
            Ok(imported) => loaded.push((path, imported)),
            Err(e) => {
                log::warn!("[Lamina] Failed to load {:?} ({}): {}", path, e.code(), e);
            }
        }
    }
    log::info!("[Lamina] Loaded {} files from {:?}", loaded.len(), dir);
    loaded
}
