//! Scratch directories and artifact helpers for filesystem tests.

use std::fs;
use std::path::{Path, PathBuf};

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes a file of exactly `size` bytes, creating parent directories.
pub fn write_file_of_size(path: &Path, size: u64) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    fs::write(path, vec![0u8; size as usize]).expect("Failed to write test file");
    path.to_path_buf()
}

/// Lists every `.png` file under `root`, relative to it, sorted.
pub fn list_tiles(root: &Path) -> Vec<String> {
    let mut found = Vec::new();
    collect_tiles(root, root, &mut found);
    found.sort();
    found
}

fn collect_tiles(root: &Path, dir: &Path, found: &mut Vec<String>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tiles(root, &path, found);
        } else if path.extension().map_or(false, |ext| ext == "png") {
            if let Ok(relative) = path.strip_prefix(root) {
                found.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }
}
