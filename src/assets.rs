//! Game asset handling: tree copies and resolution variant stripping

use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Language files named `<lang>@Default.json` look like resolution variants
const DEFAULT_LANGUAGE_SUFFIX: &str = "@Default.json";

/// Resolution suffix of an asset: the part of the file stem after the last `@`
///
/// `sprite@HD.png` -> `Some("HD")`, `sprite.png` -> `None`
pub fn resolution_suffix(path: &Path) -> Option<&str> {
    let stem = path.file_stem()?.to_str()?;
    stem.rfind('@').map(|pos| &stem[pos + 1..])
}

/// Delete every file under `root` whose resolution suffix is not listed in
/// `resolutions`. Returns the removed paths.
pub fn strip_unused_resolutions(root: &Path, resolutions: &[String]) -> Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name.ends_with(DEFAULT_LANGUAGE_SUFFIX) {
            continue;
        }

        if let Some(suffix) = resolution_suffix(entry.path()) {
            if !resolutions.iter().any(|r| r == suffix) {
                candidates.push(entry.path().to_path_buf());
            }
        }
    }

    for path in &candidates {
        debug!(path = %path.display(), "Removing unused resolution");
        fs::remove_file(path)?;
    }

    info!(removed = candidates.len(), "Stripped unused resolutions");
    Ok(candidates)
}

/// Recursively copy `source` into `destination`
pub fn copy_tree(source: &Path, destination: &Path) -> Result<usize> {
    let mut copied = 0;
    fs::create_dir_all(destination)?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| crate::DeployError::Validation(e.to_string()))?;
        let target = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Remove a directory tree, treating a missing directory as already removed
pub fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
